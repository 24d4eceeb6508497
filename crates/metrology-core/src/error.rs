//! Shared error type across metrology crates.

use thiserror::Error;

/// Stable error codes (used in log fields and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Key already occupied on unconditional add.
    Duplicate,
    /// Key holds an instrument of another type.
    TypeMismatch,
    /// Key was never registered (or the registry was cleared).
    NotFound,
    /// No process-wide default registry installed.
    NotInitialized,
    /// Invalid configuration.
    BadConfig,
    /// Internal error.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Duplicate => "DUPLICATE",
            ErrorCode::TypeMismatch => "TYPE_MISMATCH",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::NotInitialized => "NOT_INITIALIZED",
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetrologyError>;

/// Unified error type used by core and registry.
#[derive(Debug, Error)]
pub enum MetrologyError {
    #[error("{key} already present in the registry")]
    DuplicateRegistration { key: String },
    #[error("{key} is not of type {expected} (found {found})")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("{key} not found in the registry")]
    NotFound { key: String },
    #[error("default registry not initialized")]
    NotInitialized,
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MetrologyError {
    /// Map the error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetrologyError::DuplicateRegistration { .. } => ErrorCode::Duplicate,
            MetrologyError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            MetrologyError::NotFound { .. } => ErrorCode::NotFound,
            MetrologyError::NotInitialized => ErrorCode::NotInitialized,
            MetrologyError::BadConfig(_) => ErrorCode::BadConfig,
            MetrologyError::Internal(_) => ErrorCode::Internal,
        }
    }
}
