//! Aggregate settings

use serde::Deserialize;
use serde::Serialize;

use crate::query::AggregateKind;

/// Aggregates requested for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateColumn {
    pub field: String,
    #[serde(default)]
    pub types: Vec<AggregateKind>,
}

impl AggregateColumn {
    pub fn new(field: impl Into<String>, types: impl IntoIterator<Item = AggregateKind>) -> Self {
        Self {
            field: field.into(),
            types: types.into_iter().collect(),
        }
    }
}

/// One footer row of aggregates.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregateRow {
    pub columns: Vec<AggregateColumn>,
}

impl AggregateRow {
    pub fn new(columns: impl IntoIterator<Item = AggregateColumn>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }
}

/// Aggregate configuration. Each row becomes one aggregate row in the
/// navigation matrices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AggregateSettings {
    /// Default: true
    pub enabled: bool,
    pub rows: Vec<AggregateRow>,
}

impl Default for AggregateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            rows: Vec::new(),
        }
    }
}

impl AggregateSettings {
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_row(mut self, row: AggregateRow) -> Self {
        self.rows.push(row);
        self
    }

    /// Rows that take part in navigation.
    pub fn row_count(&self) -> usize {
        if self.enabled { self.rows.len() } else { 0 }
    }

    pub fn resolve(&self) -> Self {
        let mut resolved = self.clone();
        if !resolved.enabled {
            resolved.rows.clear();
        }
        resolved
    }
}
