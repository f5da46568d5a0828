//! Request bridge for result bindings

use tokio::sync::oneshot;

use super::DataChange;
use crate::error::SourceError;
use crate::query::DataResult;
use crate::query::Query;

/// Why a data request was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestType {
    Read,
    Insert,
    Update,
    Remove,
    BatchSave,
}

impl RequestType {
    pub fn is_write(self) -> bool {
        self != RequestType::Read
    }
}

/// Resolves one data request, possibly from another task.
///
/// Dropping it unanswered fails the request with
/// [`SourceError::RequestDropped`].
#[derive(Debug)]
pub struct DataResponder {
    tx: oneshot::Sender<Result<DataResult, String>>,
}

impl DataResponder {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<Result<DataResult, String>>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Completes the request with `result`.
    pub fn resolve(self, result: DataResult) {
        if self.tx.send(Ok(result)).is_err() {
            log::warn!("[data] request resolved after the caller went away");
        }
    }

    /// Fails the request.
    pub fn reject(self, reason: impl Into<String>) {
        if self.tx.send(Err(reason.into())).is_err() {
            log::warn!("[data] request rejected after the caller went away");
        }
    }
}

/// Payload of the `on_data_request` event.
#[derive(Debug)]
pub struct DataRequestArgs {
    pub request_type: RequestType,
    /// The composed query for reads.
    pub query: Option<Query>,
    /// The write being persisted.
    pub change: Option<DataChange>,
    /// The currently bound result.
    pub current: DataResult,
    responder: DataResponder,
}

impl DataRequestArgs {
    pub(crate) fn new(
        request_type: RequestType,
        query: Option<Query>,
        change: Option<DataChange>,
        current: DataResult,
    ) -> (Self, oneshot::Receiver<Result<DataResult, String>>) {
        let (responder, rx) = DataResponder::channel();
        let args = Self {
            request_type,
            query,
            change,
            current,
            responder,
        };
        (args, rx)
    }

    pub fn resolve(self, result: DataResult) {
        self.responder.resolve(result);
    }

    pub fn reject(self, reason: impl Into<String>) {
        self.responder.reject(reason);
    }

    /// Splits off the responder so it can be answered later.
    pub fn into_responder(self) -> DataResponder {
        self.responder
    }
}

/// Waits for the consumer's answer.
pub(crate) async fn await_response(
    rx: oneshot::Receiver<Result<DataResult, String>>,
) -> Result<DataResult, SourceError> {
    match rx.await {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(reason)) => Err(SourceError::Rejected(reason)),
        Err(_) => {
            log::warn!("[data] data request responder dropped");
            Err(SourceError::RequestDropped)
        }
    }
}
