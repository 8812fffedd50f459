//! Error types for the gastro-grid kernel.
//!
//! Every write path returns `GridResult<T>`. Persistence failures are surfaced
//! to the caller and never swallowed; a failed audit write must be
//! distinguishable from "nothing happened".

use thiserror::Error;

/// The unified error type for the gastro-grid crates.
#[derive(Debug, Error)]
pub enum GridError {
    /// A HACCP rule rejected the operation. The denial has already been audited
    /// when this error comes out of the `Gatekeeper`.
    #[error("rule {rule_id} violated: {reason}")]
    RuleViolated { rule_id: String, reason: String },

    /// The audit trail could not persist an entry.
    ///
    /// Fatal for the operation: an action that cannot be audited must not proceed.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// The audit trail could not be read back.
    #[error("audit read failed: {reason}")]
    AuditReadFailed { reason: String },

    /// The SOP store failed to load or save documents.
    #[error("sop store failed: {reason}")]
    SopStoreFailed { reason: String },

    /// The key-value store failed to load or save a value.
    #[error("key-value store failed: {reason}")]
    KeyValueFailed { reason: String },

    /// A value could not be serialized or deserialized.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// A requested record does not exist.
    #[error("not found: {what}")]
    NotFound { what: String },
}

impl From<serde_json::Error> for GridError {
    fn from(e: serde_json::Error) -> Self {
        GridError::Serialization {
            reason: e.to_string(),
        }
    }
}

/// Convenience alias used throughout the gastro-grid crates.
pub type GridResult<T> = Result<T, GridError>;
