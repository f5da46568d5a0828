//! Write handshake error types

use crate::data::ConfirmationToken;

/// Errors from driving the two-phase write handshake.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HandshakeError {
    /// The token was never issued, or was already committed or aborted.
    #[error("Unknown confirmation token: {0}")]
    UnknownToken(ConfirmationToken),
}
