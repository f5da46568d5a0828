//! In-flight request tracking

use super::RequestType;

/// State of the round trip currently awaited, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PendingState {
    pub is_pending: bool,
    pub request_type: Option<RequestType>,
    /// Whether the round trip persists an edit.
    pub is_edit: bool,
}

impl PendingState {
    pub(crate) fn start(request_type: RequestType) -> Self {
        Self {
            is_pending: true,
            request_type: Some(request_type),
            is_edit: request_type.is_write(),
        }
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}
