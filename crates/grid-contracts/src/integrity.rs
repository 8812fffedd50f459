//! Integrity check and export result types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of one integrity walk over the audit chain.
///
/// Persisted outside the chain so the last result can be shown after a
/// restart without re-running the check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrityCheckResult {
    pub timestamp: DateTime<Utc>,
    pub is_valid: bool,
    pub details: String,
    /// First entry whose recomputed hash diverges from the stored one.
    pub failed_event_id: Option<Uuid>,
    pub audit_entry_count: usize,
}

/// A sealed export of the audit trail.
///
/// `seal` is the hex SHA-256 of `payload`'s bytes; a downstream tool can
/// detect post-export tampering by recomputing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    pub exported_at: DateTime<Utc>,
    pub entry_count: usize,
    /// Chain head at export time. Empty when the trail was empty.
    pub terminal_hash: String,
    /// Compact JSON array of the exported entries.
    pub payload: String,
    pub seal: String,
}
