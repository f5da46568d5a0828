//! Dynamic row record

use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;

use super::Value;
use crate::error::SourceError;

/// One row of grid data.
///
/// Holds field values as a `HashMap<String, Value>`. A missing field reads as
/// [`Value::Null`].
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Record;
///
/// let order = Record::new()
///     .set("OrderID", 10248)
///     .set("ShipCountry", "France");
///
/// assert_eq!(order.get_str("ShipCountry"), Some("France"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    /// Creates a new empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a JSON object into a record.
    pub fn from_json(json: serde_json::Value) -> Result<Self, SourceError> {
        match json {
            serde_json::Value::Object(map) => Ok(Self {
                fields: map
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v)))
                    .collect(),
            }),
            other => Err(SourceError::parse_with_body(
                "expected a JSON object for a record",
                other.to_string(),
            )),
        }
    }

    /// Parses a JSON array of objects into records.
    pub fn many_from_json(json: serde_json::Value) -> Result<Vec<Self>, SourceError> {
        match json {
            serde_json::Value::Array(items) => items.into_iter().map(Self::from_json).collect(),
            other => Err(SourceError::parse_with_body(
                "expected a JSON array of records",
                other.to_string(),
            )),
        }
    }

    /// Serializes the record as a JSON object.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.fields
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }

    /// Sets a field value (builder style).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// Sets a field value in place, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.fields.remove(field)
    }

    /// Returns the field value, or `Null` when absent.
    pub fn get(&self, field: &str) -> &Value {
        static NULL: Value = Value::Null;
        self.fields.get(field).unwrap_or(&NULL)
    }

    pub fn get_str(&self, field: &str) -> Option<&str> {
        self.get(field).as_str()
    }

    pub fn get_i64(&self, field: &str) -> Option<i64> {
        self.get(field).as_i64()
    }

    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.get(field).as_f64()
    }

    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.get(field).as_bool()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn fields(&self) -> &HashMap<String, Value> {
        &self.fields
    }

    /// Field names in sorted order.
    pub fn field_names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.fields.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Applies a partial update: every field of `patch` overwrites this record's.
    pub fn merge(&mut self, patch: &Record) {
        for (field, value) in &patch.fields {
            self.fields.insert(field.clone(), value.clone());
        }
    }

    /// Whether `field` holds a value equal to `key`.
    pub fn key_matches(&self, field: &str, key: &Value) -> bool {
        self.get(field).compare(key).is_eq()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}
