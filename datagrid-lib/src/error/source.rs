//! Data source error types

/// Errors that can occur during a data round trip.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// HTTP error response from a remote source.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// Network error during the request.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse a response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },

    /// No record matches the key.
    #[error("Record not found: {key_field} = {key}")]
    RecordNotFound {
        /// The primary key field.
        key_field: String,
        /// The key value, rendered.
        key: String,
    },

    /// The consumer dropped a request responder without answering.
    #[error("Data request dropped without a response")]
    RequestDropped,

    /// The consumer rejected a data request.
    #[error("Data request rejected: {0}")]
    Rejected(String),

    /// The source failed its readiness check.
    #[error("Data source not ready: {0}")]
    NotReady(String),

    /// A remote request needs a table reference and none was given.
    #[error("No table reference for remote request")]
    NoTable,

    /// A filter has no equivalent in the remote query language.
    #[error("Filter cannot be expressed remotely: {0}")]
    UnsupportedFilter(String),
}

impl SourceError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Creates a record-not-found error.
    pub fn not_found(key_field: impl Into<String>, key: impl std::fmt::Display) -> Self {
        Self::RecordNotFound {
            key_field: key_field.into(),
            key: key.to_string(),
        }
    }

    /// Returns the HTTP status code if this is an HTTP error.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns `true` if re-invoking the operation may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            Self::Network(_) => true,
            Self::NotReady(_) => true,
            _ => false,
        }
    }
}
