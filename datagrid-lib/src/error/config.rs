//! Configuration error types

/// Errors caused by invalid settings or wiring. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No column is bound to this field.
    #[error("Unknown column field: {0}")]
    UnknownField(String),

    /// No column carries this uid.
    #[error("Unknown column uid: {0}")]
    UnknownUid(String),

    /// An operation needs a primary key column but none is declared.
    #[error("No primary key column declared")]
    MissingPrimaryKey,

    /// The feature is turned off in the settings.
    #[error("{0} is disabled")]
    FeatureDisabled(&'static str),

    /// The column does not allow the requested action.
    #[error("Column {field} does not allow {action}")]
    ColumnNotAllowed {
        /// The column field.
        field: String,
        /// The rejected action (sorting, filtering, ...).
        action: &'static str,
    },

    /// A filter operator name was not recognized.
    #[error("Unknown filter operator: {0}")]
    UnknownOperator(String),

    /// The binding cannot serve the request.
    #[error("Unregistered binding: {0}")]
    UnregisteredBinding(String),

    /// Invalid data source URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    /// Settings JSON could not be parsed.
    #[error("Settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
