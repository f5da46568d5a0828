//! Two-phase write handshake

use std::collections::HashMap;
use std::fmt;

use tokio::sync::oneshot;
use uuid::Uuid;

use super::DataChange;
use crate::error::HandshakeError;

/// Identifies one proposed change until it is committed or aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConfirmationToken(Uuid);

impl ConfirmationToken {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ConfirmationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Proposed changes awaiting a decision.
#[derive(Debug, Default)]
pub struct Handshake {
    proposals: HashMap<ConfirmationToken, DataChange>,
}

impl Handshake {
    pub fn new() -> Self {
        Self::default()
    }

    /// Phase one: registers `change` and returns its token.
    pub fn propose(&mut self, change: DataChange) -> ConfirmationToken {
        let token = ConfirmationToken::new();
        log::debug!("[handshake] proposed {:?} as {}", change.request_type(), token);
        self.proposals.insert(token, change);
        token
    }

    /// Phase two: releases the change for persistence.
    pub fn commit(&mut self, token: ConfirmationToken) -> Result<DataChange, HandshakeError> {
        self.proposals
            .remove(&token)
            .ok_or(HandshakeError::UnknownToken(token))
    }

    /// Drops the change.
    pub fn abort(&mut self, token: ConfirmationToken) -> Result<DataChange, HandshakeError> {
        let change = self
            .proposals
            .remove(&token)
            .ok_or(HandshakeError::UnknownToken(token))?;
        log::debug!("[handshake] aborted {}", token);
        Ok(change)
    }

    pub fn proposed(&self, token: ConfirmationToken) -> Option<&DataChange> {
        self.proposals.get(&token)
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

/// The consumer's save/cancel decision for one proposed change.
///
/// Dropping it without deciding cancels the change.
#[derive(Debug)]
pub struct ChangeConfirmation {
    tx: oneshot::Sender<bool>,
}

impl ChangeConfirmation {
    pub(crate) fn channel() -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Proceed with the write.
    pub fn save(self) {
        let _ = self.tx.send(true);
    }

    /// Abandon the write.
    pub fn cancel(self) {
        let _ = self.tx.send(false);
    }
}

/// Payload of the `on_data_change_request` event.
#[derive(Debug)]
pub struct DataChangeRequestArgs {
    pub change: DataChange,
    pub token: ConfirmationToken,
    confirmation: ChangeConfirmation,
}

impl DataChangeRequestArgs {
    pub(crate) fn new(change: DataChange, token: ConfirmationToken) -> (Self, oneshot::Receiver<bool>) {
        let (confirmation, rx) = ChangeConfirmation::channel();
        (
            Self {
                change,
                token,
                confirmation,
            },
            rx,
        )
    }

    pub fn save(self) {
        self.confirmation.save();
    }

    pub fn cancel(self) {
        self.confirmation.cancel();
    }

    /// Splits off the confirmation so the decision can be made later.
    pub fn into_confirmation(self) -> ChangeConfirmation {
        self.confirmation
    }
}
