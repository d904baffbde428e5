//! Error types for the Mend engine.

use thiserror::Error;

/// A transient storage fault.
///
/// Operations that fail with a store error are never recorded in the
/// idempotency ledger and never acknowledged, so resubmitting them
/// verbatim is always safe.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("store failure: {0}")]
pub struct StoreError(String);

impl StoreError {
    /// Create a store error from any displayable cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// All possible errors from the Mend engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    // Validation errors
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("operation payload is required")]
    MissingPayload,

    #[error("unsupported operation type: {0}")]
    UnknownOpKind(String),

    // Infrastructure errors
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl Error {
    /// True when the operation itself is malformed and must be corrected
    /// before resubmission, as opposed to a transient fault worth retrying.
    pub fn is_validation(&self) -> bool {
        !matches!(self, Error::Store(_))
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::MissingField("title");
        assert_eq!(err.to_string(), "missing required field: title");

        let err = Error::UnknownOpKind("UPSERT".into());
        assert_eq!(err.to_string(), "unsupported operation type: UPSERT");

        let err = Error::Store(StoreError::new("connection reset"));
        assert_eq!(err.to_string(), "store failure: connection reset");
    }

    #[test]
    fn validation_classification() {
        assert!(Error::MissingPayload.is_validation());
        assert!(Error::MissingField("title").is_validation());
        assert!(Error::UnknownOpKind("PATCH".into()).is_validation());
        assert!(!Error::Store(StoreError::new("timeout")).is_validation());
    }
}
