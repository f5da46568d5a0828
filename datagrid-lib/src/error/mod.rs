//! Error types

mod config;
mod handshake;
mod source;

pub use config::*;
pub use handshake::*;
pub use source::*;

/// Top-level error for grid and data operations.
///
/// Focus navigation never produces an error; cancellation is reported as
/// [`Outcome::Cancelled`](crate::data::Outcome::Cancelled), not through this type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid settings, columns or bindings.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A data round trip failed.
    #[error(transparent)]
    Source(#[from] SourceError),

    /// The write handshake was driven out of order.
    #[error(transparent)]
    Handshake(#[from] HandshakeError),
}

impl Error {
    /// Returns `true` if this is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns `true` if this is a data source error.
    pub fn is_source(&self) -> bool {
        matches!(self, Self::Source(_))
    }

    /// Returns the HTTP status code if a remote source answered with an error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Source(e) => e.status_code(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::Source(SourceError::Network(e))
    }
}
