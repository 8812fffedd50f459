//! Store traits for the gastro-grid kernel.
//!
//! Components never reach for ambient global state. Each one is handed the
//! stores it needs at construction time:
//!
//! - `AuditTrail`: append-only, hash-chained log of audited actions
//! - `SopStore`: persistence for the SOP document set
//! - `KeyValueStore`: small local state outside the chain (last integrity result)

use grid_contracts::{
    audit::{AuditDraft, AuditLogEntry},
    error::GridResult,
    sop::SopDocument,
};

/// The audit trail: an append-only sequence of hash-chained entries.
///
/// Appends must be strictly serialized because every entry's hash depends on
/// its predecessor. Implementations hold a single writer lock for the whole
/// compute-hash-then-store step.
pub trait AuditTrail: Send + Sync {
    /// Stamp `draft` with sequence, id, timestamp and chain hash, persist it,
    /// and return the stored entry.
    ///
    /// A failed write returns `GridError::AuditWriteFailed` and leaves the
    /// chain head unchanged.
    fn append(&self, draft: AuditDraft) -> GridResult<AuditLogEntry>;

    /// All entries, oldest first.
    fn fetch_all_entries(&self) -> GridResult<Vec<AuditLogEntry>>;

    /// Number of stored entries. Cached, does not walk the log.
    fn entry_count(&self) -> GridResult<usize>;

    /// Chain hash of the newest entry, or the genesis hash when empty.
    fn last_hash(&self) -> GridResult<String>;
}

/// Persistence for the full set of SOP documents.
///
/// The registry always saves the complete document set in one call, so an
/// implementation only has to make `save` all-or-nothing.
pub trait SopStore: Send + Sync {
    fn load(&self) -> GridResult<Vec<SopDocument>>;
    fn save(&self, documents: &[SopDocument]) -> GridResult<()>;
}

/// Local string key-value storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> GridResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> GridResult<()>;
}
