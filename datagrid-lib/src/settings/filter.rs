//! Filter settings

use serde::Deserialize;
use serde::Serialize;

use crate::model::Value;
use crate::query::FilterOperator;
use crate::query::Linkage;

/// One filter condition on a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDescriptor {
    pub field: String,
    pub operator: FilterOperator,
    #[serde(default)]
    pub value: Value,
    /// How this descriptor joins earlier descriptors on the same field.
    #[serde(default)]
    pub predicate: Linkage,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub ignore_accent: bool,
}

impl FilterDescriptor {
    /// A case-insensitive `and`-linked descriptor.
    pub fn new(field: impl Into<String>, operator: FilterOperator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
            predicate: Linkage::And,
            case_sensitive: false,
            ignore_accent: false,
        }
    }

    pub fn with_predicate(mut self, predicate: Linkage) -> Self {
        self.predicate = predicate;
        self
    }

    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn with_ignore_accent(mut self, ignore_accent: bool) -> Self {
        self.ignore_accent = ignore_accent;
        self
    }
}

/// Filter configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FilterSettings {
    /// Default: true
    pub enabled: bool,
    pub columns: Vec<FilterDescriptor>,
}

impl Default for FilterSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            columns: Vec::new(),
        }
    }
}

impl FilterSettings {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_column(mut self, descriptor: FilterDescriptor) -> Self {
        self.columns.push(descriptor);
        self
    }

    /// Descriptors on `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FilterDescriptor> + 'a {
        self.columns.iter().filter(move |d| d.field == field)
    }

    /// Drops every descriptor on `field`; returns how many were removed.
    pub fn remove_field(&mut self, field: &str) -> usize {
        let before = self.columns.len();
        self.columns.retain(|d| d.field != field);
        before - self.columns.len()
    }

    /// Replaces the descriptors on the field of `descriptor` with it.
    pub fn replace_field(&mut self, descriptor: FilterDescriptor) {
        self.remove_field(&descriptor.field);
        self.columns.push(descriptor);
    }

    pub fn resolve(&self) -> Self {
        let mut resolved = self.clone();
        if !resolved.enabled {
            resolved.columns.clear();
        }
        resolved
    }
}
