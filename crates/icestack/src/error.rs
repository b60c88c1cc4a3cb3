//! Error types for the icestack library.

use thiserror::Error;

/// Main error type for icestack operations.
#[derive(Debug, Error)]
pub enum IceStackError {
    /// A profile failed validation at construction.
    #[error("Malformed profile '{variable}' in core '{core}': {reason}")]
    MalformedProfile {
        core: String,
        variable: String,
        reason: String,
    },

    /// No usable data for the requested variable across the requested cores.
    #[error("No data: {0}")]
    NoData(String),

    /// An explicit target coordinate is not usable.
    #[error("Invalid target coordinate: {0}")]
    InvalidCoordinate(String),

    /// Configuration or request parameter out of its valid domain.
    #[error("Configuration error: {0}")]
    InvalidConfig(String),

    /// The same core id was supplied twice to one request.
    #[error("Duplicate core id: {0}")]
    DuplicateCore(String),

    /// A core already holds a profile for this variable.
    #[error("Core '{core}' already has a profile for '{variable}'")]
    DuplicateVariable { core: String, variable: String },

    /// A core id is not part of the stack.
    #[error("Unknown core id: {0}")]
    UnknownCore(String),

    /// A profile was attached to a core with a different id.
    #[error("Profile belongs to core '{found}', not '{expected}'")]
    CoreMismatch { expected: String, found: String },

    /// Error from the CSV writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error writing to the output sink.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IceStackError {
    pub(crate) fn malformed(
        core: impl Into<String>,
        variable: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::MalformedProfile {
            core: core.into(),
            variable: variable.into(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for icestack operations.
pub type Result<T> = std::result::Result<T, IceStackError>;
