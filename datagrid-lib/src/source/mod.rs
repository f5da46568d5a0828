//! Data sources.
//!
//! A [`DataSource`] executes composed queries and applies record mutations.
//! [`InMemorySource`] evaluates locally; [`ODataSource`] talks to a remote
//! OData v3 or v4 service.

mod memory;
pub mod odata;

pub use memory::InMemorySource;
pub use odata::ODataSource;

use async_trait::async_trait;

use crate::error::SourceError;
use crate::model::Record;
use crate::model::Value;
use crate::query::DataResult;
use crate::query::Query;

/// Query protocol spoken by a data source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    /// In-process evaluation.
    #[default]
    Local,
    /// OData v3.
    OData,
    /// OData v4.
    ODataV4,
}

impl Protocol {
    pub fn is_local(self) -> bool {
        self == Protocol::Local
    }

    pub fn is_remote(self) -> bool {
        !self.is_local()
    }
}

/// Record buckets for a batch save.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Changes {
    pub added: Vec<Record>,
    pub changed: Vec<Record>,
    pub deleted: Vec<Record>,
}

impl Changes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only deletions.
    pub fn deleting(records: Vec<Record>) -> Self {
        Self {
            deleted: records,
            ..Self::default()
        }
    }

    pub fn with_added(mut self, record: Record) -> Self {
        self.added.push(record);
        self
    }

    pub fn with_changed(mut self, record: Record) -> Self {
        self.changed.push(record);
        self
    }

    pub fn with_deleted(mut self, record: Record) -> Self {
        self.deleted.push(record);
        self
    }

    /// Total number of records across buckets.
    pub fn len(&self) -> usize {
        self.added.len() + self.changed.len() + self.deleted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A queryable, writable record store.
///
/// Table references are `None` for sources that hold a single collection.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Protocol used for query composition.
    fn protocol(&self) -> Protocol;

    /// Resolves once the source can serve requests.
    async fn ready(&self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Runs `query`. Aggregates cover every record that passes the filters,
    /// not just the returned page.
    async fn execute_query(&self, query: &Query) -> Result<DataResult, SourceError>;

    /// Inserts `record` at `index` (appended when past the end). Returns the
    /// stored record.
    async fn insert(&self, record: Record, index: usize, table: Option<&str>) -> Result<Record, SourceError>;

    /// Merges `record` into the record whose `key_field` matches. Returns the
    /// merged record.
    async fn update(&self, key_field: &str, record: Record, table: Option<&str>) -> Result<Record, SourceError>;

    async fn remove(&self, key_field: &str, key: &Value, table: Option<&str>) -> Result<(), SourceError>;

    /// Applies every bucket as one unit.
    async fn save_changes(&self, changes: Changes, key_field: &str, table: Option<&str>) -> Result<Changes, SourceError>;
}
