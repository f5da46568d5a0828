//! Aggregate computations over a record set.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

use crate::model::Record;
use crate::model::Value;

/// Kind of summary computed for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AggregateKind {
    Sum,
    Average,
    Min,
    Max,
    Count,
    TrueCount,
    FalseCount,
}

impl AggregateKind {
    /// Lowercase name used in result keys.
    pub fn as_str(self) -> &'static str {
        match self {
            AggregateKind::Sum => "sum",
            AggregateKind::Average => "average",
            AggregateKind::Min => "min",
            AggregateKind::Max => "max",
            AggregateKind::Count => "count",
            AggregateKind::TrueCount => "truecount",
            AggregateKind::FalseCount => "falsecount",
        }
    }

    /// Result key for `field`, e.g. `Freight - sum`.
    pub fn key(self, field: &str) -> String {
        format!("{} - {}", field, self.as_str())
    }

    /// Computes this aggregate over `field` of `records`.
    ///
    /// Numeric aggregates skip non-numeric values. `Sum` stays an integer
    /// while every input is one. Empty inputs yield `Null` except for counts.
    pub fn compute(self, field: &str, records: &[Record]) -> Value {
        let values = records.iter().map(|r| r.get(field));
        match self {
            AggregateKind::Count => Value::from(records.len()),
            AggregateKind::TrueCount => {
                Value::from(values.filter(|v| v.as_bool() == Some(true)).count())
            }
            AggregateKind::FalseCount => {
                Value::from(values.filter(|v| v.as_bool() == Some(false)).count())
            }
            AggregateKind::Min => values
                .filter(|v| !v.is_null())
                .min_by(|a, b| a.compare(b))
                .cloned()
                .unwrap_or(Value::Null),
            AggregateKind::Max => values
                .filter(|v| !v.is_null())
                .max_by(|a, b| a.compare(b))
                .cloned()
                .unwrap_or(Value::Null),
            AggregateKind::Sum => {
                let numbers: Vec<&Value> = values.filter(|v| v.as_f64().is_some()).collect();
                if numbers.is_empty() {
                    return Value::Null;
                }
                if numbers.iter().all(|v| v.as_i64().is_some()) {
                    Value::Int(numbers.iter().filter_map(|v| v.as_i64()).sum())
                } else {
                    Value::Float(numbers.iter().filter_map(|v| v.as_f64()).sum())
                }
            }
            AggregateKind::Average => {
                let numbers: Vec<f64> = values.filter_map(Value::as_f64).collect();
                if numbers.is_empty() {
                    Value::Null
                } else {
                    Value::Float(numbers.iter().sum::<f64>() / numbers.len() as f64)
                }
            }
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
