//! Query execution and record writes against a binding.

use std::sync::Arc;

use super::ConfirmationToken;
use super::DataChange;
use super::DataChangeRequestArgs;
use super::DataRequestArgs;
use super::Handshake;
use super::Outcome;
use super::PendingState;
use super::RequestType;
use super::request::await_response;
use crate::error::Error;
use crate::error::SourceError;
use crate::model::Record;
use crate::query::DataResult;
use crate::query::Query;
use crate::source::Changes;
use crate::source::DataSource;
use crate::source::InMemorySource;
use crate::source::Protocol;

/// Where a grid gets its records from.
#[derive(Clone)]
pub enum DataBinding {
    /// A live source; queries execute against it.
    Source(Arc<dyn DataSource>),
    /// A pre-materialized result. Reads and writes go through the
    /// `on_data_request` bridge when a handler is registered.
    Result(DataResult),
}

impl DataBinding {
    pub fn source(source: impl DataSource + 'static) -> Self {
        Self::Source(Arc::new(source))
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            DataBinding::Source(source) => source.protocol(),
            DataBinding::Result(_) => Protocol::Local,
        }
    }
}

impl std::fmt::Debug for DataBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataBinding::Source(source) => write!(f, "Source({:?})", source.protocol()),
            DataBinding::Result(result) => write!(f, "Result({} of {})", result.len(), result.count),
        }
    }
}

impl From<DataResult> for DataBinding {
    fn from(result: DataResult) -> Self {
        Self::Result(result)
    }
}

/// Plain rows are queried locally through an [`InMemorySource`].
impl From<Vec<Record>> for DataBinding {
    fn from(records: Vec<Record>) -> Self {
        Self::source(InMemorySource::new(records))
    }
}

pub type DataRequestHandler = Box<dyn FnMut(DataRequestArgs) + Send>;
pub type DataChangeRequestHandler = Box<dyn FnMut(DataChangeRequestArgs) + Send>;
pub type ErrorHandler = Box<dyn FnMut(&Error) + Send>;

/// Reads and writes for one grid.
///
/// Every failure is passed to the `on_error` handler and then returned to
/// the caller.
///
/// # Example
///
/// ```
/// use datagrid_lib::data::{DataBinding, DataOperations};
/// use datagrid_lib::model::Record;
/// use datagrid_lib::query::Query;
/// use datagrid_lib::source::InMemorySource;
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let source = InMemorySource::new(vec![Record::new().set("OrderID", 10248)]);
/// let mut data = DataOperations::new(DataBinding::source(source));
/// let result = data.get_data(&Query::new()).await.unwrap();
/// assert_eq!(result.count, 1);
/// # });
/// ```
pub struct DataOperations {
    binding: DataBinding,
    table: Option<String>,
    on_data_request: Option<DataRequestHandler>,
    on_data_change_request: Option<DataChangeRequestHandler>,
    on_error: Option<ErrorHandler>,
    handshake: Handshake,
    pending: PendingState,
}

impl std::fmt::Debug for DataOperations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataOperations")
            .field("binding", &self.binding)
            .field("table", &self.table)
            .field("pending", &self.pending)
            .field("proposals", &self.handshake.len())
            .finish()
    }
}

impl DataOperations {
    pub fn new(binding: impl Into<DataBinding>) -> Self {
        Self {
            binding: binding.into(),
            table: None,
            on_data_request: None,
            on_data_change_request: None,
            on_error: None,
            handshake: Handshake::new(),
            pending: PendingState::default(),
        }
    }

    /// Table reference passed to source writes.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    pub fn binding(&self) -> &DataBinding {
        &self.binding
    }

    pub fn set_binding(&mut self, binding: impl Into<DataBinding>) {
        self.binding = binding.into();
    }

    pub fn protocol(&self) -> Protocol {
        self.binding.protocol()
    }

    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    pub fn on_data_request(&mut self, handler: impl FnMut(DataRequestArgs) + Send + 'static) {
        self.on_data_request = Some(Box::new(handler));
    }

    pub fn on_data_change_request(&mut self, handler: impl FnMut(DataChangeRequestArgs) + Send + 'static) {
        self.on_data_change_request = Some(Box::new(handler));
    }

    pub fn on_error(&mut self, handler: impl FnMut(&Error) + Send + 'static) {
        self.on_error = Some(Box::new(handler));
    }

    /// Reports `error` to the error handler and hands it back.
    pub fn report(&mut self, error: Error) -> Error {
        log::warn!("[data] operation failed: {}", error);
        if let Some(handler) = self.on_error.as_mut() {
            handler(&error);
        }
        error
    }

    // =========================================================================
    // Read
    // =========================================================================

    /// Executes `query` against the binding.
    ///
    /// Sources are awaited for readiness first. Result bindings raise
    /// `on_data_request` and wait for the consumer's answer, or return the
    /// bound result unchanged when no handler is registered.
    pub async fn get_data(&mut self, query: &Query) -> Result<DataResult, Error> {
        self.pending = PendingState::start(RequestType::Read);
        let result = self.read(query).await;
        self.pending.clear();
        result.map_err(|e| self.report(e.into()))
    }

    async fn read(&mut self, query: &Query) -> Result<DataResult, SourceError> {
        match &self.binding {
            DataBinding::Source(source) => {
                let source = Arc::clone(source);
                source.ready().await?;
                source.execute_query(query).await
            }
            DataBinding::Result(current) => {
                let current = current.clone();
                match self.on_data_request.as_mut() {
                    Some(handler) => {
                        let (args, rx) =
                            DataRequestArgs::new(RequestType::Read, Some(query.clone()), None, current);
                        handler(args);
                        await_response(rx).await
                    }
                    None => Ok(current),
                }
            }
        }
    }

    // =========================================================================
    // Write handshake
    // =========================================================================

    /// Phase one of a write.
    pub fn propose(&mut self, change: DataChange) -> ConfirmationToken {
        self.handshake.propose(change)
    }

    /// Phase two: persists the proposed change and returns it as stored.
    pub async fn commit(&mut self, token: ConfirmationToken) -> Result<DataChange, Error> {
        let change = match self.handshake.commit(token) {
            Ok(change) => change,
            Err(e) => return Err(self.report(e.into())),
        };
        let request_type = change.request_type();
        self.pending = PendingState::start(request_type);
        let result = self.persist(change).await;
        self.pending.clear();
        result.map_err(|e| self.report(e.into()))
    }

    /// Drops a proposed change.
    pub fn abort(&mut self, token: ConfirmationToken) -> Result<DataChange, Error> {
        self.handshake.abort(token).map_err(|e| self.report(e.into()))
    }

    /// Runs the full handshake for `change`.
    ///
    /// Raises `on_data_change_request` and waits for save or cancel; with no
    /// handler registered the change is saved. A dropped confirmation counts
    /// as cancel.
    pub async fn write(&mut self, change: DataChange) -> Result<Outcome<DataChange>, Error> {
        let token = self.propose(change.clone());

        let confirmed = match self.on_data_change_request.as_mut() {
            Some(handler) => {
                let (args, rx) = DataChangeRequestArgs::new(change, token);
                handler(args);
                rx.await.unwrap_or_else(|_| {
                    log::warn!("[data] change confirmation {} dropped, cancelling", token);
                    false
                })
            }
            None => true,
        };

        if !confirmed {
            self.abort(token)?;
            return Ok(Outcome::Cancelled);
        }
        self.commit(token).await.map(Outcome::Completed)
    }

    async fn persist(&mut self, change: DataChange) -> Result<DataChange, SourceError> {
        match &mut self.binding {
            DataBinding::Source(source) => {
                let source = Arc::clone(source);
                apply(source.as_ref(), change, self.table.as_deref()).await
            }
            DataBinding::Result(current) => match self.on_data_request.as_mut() {
                Some(handler) => {
                    let (args, rx) = DataRequestArgs::new(
                        change.request_type(),
                        None,
                        Some(change.clone()),
                        current.clone(),
                    );
                    handler(args);
                    *current = await_response(rx).await?;
                    Ok(change)
                }
                None => {
                    // Apply to the bound rows as an in-memory source would.
                    let source = InMemorySource::new(std::mem::take(&mut current.result));
                    let before = source.len();
                    let applied = apply(&source, change, None).await;
                    current.result = source.records();
                    current.count = (current.count + current.result.len()).saturating_sub(before);
                    applied
                }
            },
        }
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Inserts `record` at `index`.
    pub async fn insert(&mut self, record: Record, index: usize) -> Result<Outcome<Record>, Error> {
        let outcome = self.write(DataChange::Insert { record, index }).await?;
        Ok(outcome.map(|change| change.into_record().unwrap_or_default()))
    }

    /// Updates the record identified by `record[key_field]` with the fields of
    /// `record`.
    pub async fn update(&mut self, key_field: &str, record: Record) -> Result<Outcome<Record>, Error> {
        let change = DataChange::Update {
            key_field: key_field.to_string(),
            record,
        };
        let outcome = self.write(change).await?;
        Ok(outcome.map(|change| change.into_record().unwrap_or_default()))
    }

    /// Deletes `records`: one record with a single remove, several with a
    /// batch save. Returns how many were deleted.
    pub async fn remove(&mut self, key_field: &str, mut records: Vec<Record>) -> Result<Outcome<usize>, Error> {
        let count = records.len();
        let change = match count {
            0 => return Ok(Outcome::Unchanged),
            1 => {
                let record = records.remove(0);
                DataChange::Remove {
                    key_field: key_field.to_string(),
                    key: record.get(key_field).clone(),
                }
            }
            _ => DataChange::Batch {
                key_field: key_field.to_string(),
                changes: Changes::deleting(records),
            },
        };
        Ok(self.write(change).await?.map(|_| count))
    }

    /// Saves added, changed and deleted buckets as one batch.
    pub async fn save_changes(&mut self, key_field: &str, changes: Changes) -> Result<Outcome<Changes>, Error> {
        if changes.is_empty() {
            return Ok(Outcome::Unchanged);
        }
        let change = DataChange::Batch {
            key_field: key_field.to_string(),
            changes,
        };
        Ok(self.write(change).await?.map(|change| match change {
            DataChange::Batch { changes, .. } => changes,
            _ => Changes::default(),
        }))
    }
}

/// Persists `change` through the matching source primitive.
async fn apply(source: &dyn DataSource, change: DataChange, table: Option<&str>) -> Result<DataChange, SourceError> {
    match change {
        DataChange::Insert { record, index } => {
            let record = source.insert(record, index, table).await?;
            Ok(DataChange::Insert { record, index })
        }
        DataChange::Update { key_field, record } => {
            let record = source.update(&key_field, record, table).await?;
            Ok(DataChange::Update { key_field, record })
        }
        DataChange::Remove { key_field, key } => {
            source.remove(&key_field, &key, table).await?;
            Ok(DataChange::Remove { key_field, key })
        }
        DataChange::Batch { key_field, changes } => {
            let changes = source.save_changes(changes, &key_field, table).await?;
            Ok(DataChange::Batch { key_field, changes })
        }
    }
}
