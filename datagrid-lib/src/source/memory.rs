//! In-memory data source

use std::sync::Arc;
use std::sync::PoisonError;
use std::sync::RwLock;
use std::sync::RwLockReadGuard;
use std::sync::RwLockWriteGuard;

use async_trait::async_trait;

use super::Changes;
use super::DataSource;
use super::Protocol;
use crate::error::SourceError;
use crate::model::Record;
use crate::model::Value;
use crate::query::DataResult;
use crate::query::Query;

/// Records held in process and queried with [`Query::execute_local`].
///
/// Cheap to clone; clones share the same rows.
///
/// # Example
///
/// ```
/// use datagrid_lib::model::Record;
/// use datagrid_lib::source::InMemorySource;
///
/// let source = InMemorySource::new(vec![
///     Record::new().set("OrderID", 10248).set("ShipCountry", "France"),
/// ]);
/// assert_eq!(source.len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    rows: Arc<RwLock<Vec<Record>>>,
}

impl InMemorySource {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            rows: Arc::new(RwLock::new(records)),
        }
    }

    /// Builds a source from a JSON array of objects.
    pub fn from_json(json: serde_json::Value) -> Result<Self, SourceError> {
        Ok(Self::new(Record::many_from_json(json)?))
    }

    /// Snapshot of the current rows.
    pub fn records(&self) -> Vec<Record> {
        self.read().clone()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // A panic while holding the lock leaves plain data behind; keep serving it.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Record>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Record>> {
        self.rows.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn position(rows: &[Record], key_field: &str, key: &Value) -> Result<usize, SourceError> {
    rows.iter()
        .position(|r| r.key_matches(key_field, key))
        .ok_or_else(|| SourceError::not_found(key_field, key))
}

#[async_trait]
impl DataSource for InMemorySource {
    fn protocol(&self) -> Protocol {
        Protocol::Local
    }

    async fn execute_query(&self, query: &Query) -> Result<DataResult, SourceError> {
        Ok(query.execute_local(&self.read()))
    }

    async fn insert(&self, record: Record, index: usize, _table: Option<&str>) -> Result<Record, SourceError> {
        let mut rows = self.write();
        let index = index.min(rows.len());
        rows.insert(index, record.clone());
        log::debug!("[memory] inserted record at {}", index);
        Ok(record)
    }

    async fn update(&self, key_field: &str, record: Record, _table: Option<&str>) -> Result<Record, SourceError> {
        let mut rows = self.write();
        let i = position(&rows, key_field, record.get(key_field))?;
        rows[i].merge(&record);
        Ok(rows[i].clone())
    }

    async fn remove(&self, key_field: &str, key: &Value, _table: Option<&str>) -> Result<(), SourceError> {
        let mut rows = self.write();
        let i = position(&rows, key_field, key)?;
        rows.remove(i);
        log::debug!("[memory] removed {} = {}", key_field, key);
        Ok(())
    }

    async fn save_changes(&self, changes: Changes, key_field: &str, _table: Option<&str>) -> Result<Changes, SourceError> {
        let mut rows = self.write();

        // Nothing is applied unless every changed and deleted key exists.
        for record in changes.changed.iter().chain(&changes.deleted) {
            position(&rows, key_field, record.get(key_field))?;
        }

        for record in &changes.deleted {
            let i = position(&rows, key_field, record.get(key_field))?;
            rows.remove(i);
        }
        let mut changed = Vec::with_capacity(changes.changed.len());
        for record in &changes.changed {
            let i = position(&rows, key_field, record.get(key_field))?;
            rows[i].merge(record);
            changed.push(rows[i].clone());
        }
        rows.extend(changes.added.iter().cloned());

        log::debug!(
            "[memory] saved changes: {} added, {} changed, {} deleted",
            changes.added.len(),
            changed.len(),
            changes.deleted.len()
        );
        Ok(Changes {
            added: changes.added,
            changed,
            deleted: changes.deleted,
        })
    }
}
