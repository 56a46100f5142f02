//! Error types for AuditDesk

use thiserror::Error;

/// Result type alias for AuditDesk operations
pub type Result<T> = std::result::Result<T, AuditDeskError>;

/// Main error type shared across the workspace
#[derive(Error, Debug)]
pub enum AuditDeskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid {kind} value: '{value}'")]
    InvalidEnum { kind: &'static str, value: String },

    #[error("Unknown department: '{0}'")]
    UnknownDepartment(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AuditDeskError {
    /// Create an error for a string that does not name any variant of `kind`
    pub fn invalid_enum(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidEnum {
            kind,
            value: value.into(),
        }
    }
}
