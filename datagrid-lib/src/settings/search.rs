//! Search settings

use serde::Deserialize;
use serde::Serialize;

use crate::query::FilterOperator;

/// Search configuration.
///
/// An empty `fields` list searches every column that allows searching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchSettings {
    /// Default: true
    pub enabled: bool,
    pub value: String,
    pub fields: Vec<String>,
    /// Default: [`FilterOperator::Contains`]
    pub operator: FilterOperator,
    /// Default: true
    pub ignore_case: bool,
    pub ignore_accent: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            value: String::new(),
            fields: Vec::new(),
            operator: FilterOperator::Contains,
            ignore_case: true,
            ignore_accent: false,
        }
    }
}

impl SearchSettings {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_operator(mut self, operator: FilterOperator) -> Self {
        self.operator = operator;
        self
    }

    pub fn with_ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    pub fn with_ignore_accent(mut self, ignore_accent: bool) -> Self {
        self.ignore_accent = ignore_accent;
        self
    }

    /// Whether a search stage applies to queries.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.value.is_empty()
    }

    pub fn resolve(&self) -> Self {
        let mut resolved = self.clone();
        if !resolved.enabled {
            resolved.value.clear();
        }
        resolved
    }
}
