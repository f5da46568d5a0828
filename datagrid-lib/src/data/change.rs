//! Write descriptions and operation outcomes

use crate::model::Record;
use crate::model::Value;
use crate::source::Changes;

use super::RequestType;

/// Result of an operation that may be declined without being an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T = ()> {
    Completed(T),
    /// A begin event or the consumer declined the operation.
    Cancelled,
    /// Nothing to do; state was already as requested.
    Unchanged,
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, Outcome::Unchanged)
    }

    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Cancelled => Outcome::Cancelled,
            Outcome::Unchanged => Outcome::Unchanged,
        }
    }
}

/// One logical write.
#[derive(Debug, Clone, PartialEq)]
pub enum DataChange {
    Insert {
        record: Record,
        index: usize,
    },
    /// Full or partial record; `record[key_field]` identifies the target.
    Update {
        key_field: String,
        record: Record,
    },
    Remove {
        key_field: String,
        key: Value,
    },
    Batch {
        key_field: String,
        changes: Changes,
    },
}

impl DataChange {
    pub fn request_type(&self) -> RequestType {
        match self {
            DataChange::Insert { .. } => RequestType::Insert,
            DataChange::Update { .. } => RequestType::Update,
            DataChange::Remove { .. } => RequestType::Remove,
            DataChange::Batch { .. } => RequestType::BatchSave,
        }
    }

    /// The inserted or updated record.
    pub fn record(&self) -> Option<&Record> {
        match self {
            DataChange::Insert { record, .. } | DataChange::Update { record, .. } => Some(record),
            _ => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            DataChange::Insert { record, .. } | DataChange::Update { record, .. } => Some(record),
            _ => None,
        }
    }
}
