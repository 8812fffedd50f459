//! In-memory implementation of `AuditTrail`.
//!
//! `InMemoryAuditTrail` keeps all entries in a `Vec` behind a `Mutex`. It is
//! the reference implementation used by tests and by short-lived tools that
//! export their trail before exiting.

use std::sync::{Arc, Mutex, MutexGuard};

use tracing::info;

use grid_contracts::{
    audit::{AuditDraft, AuditLogEntry},
    error::{GridError, GridResult},
};
use grid_core::traits::AuditTrail;

use crate::chain::{verify_chain, ChainState, ChainVerdict};

/// An in-memory, append-only audit trail backed by a SHA-256 hash chain.
///
/// # Thread safety
///
/// `append()` holds the internal `Mutex` while computing the hash and
/// pushing the entry, so concurrent appends are serialized.
#[derive(Clone)]
pub struct InMemoryAuditTrail {
    pub(crate) state: Arc<Mutex<ChainState>>,
}

impl InMemoryAuditTrail {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(ChainState::new())),
        }
    }

    fn lock(&self) -> GridResult<MutexGuard<'_, ChainState>> {
        self.state.lock().map_err(|e| GridError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }

    /// Verify that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> GridResult<ChainVerdict> {
        let state = self.lock()?;
        verify_chain(&state.entries)
    }
}

impl Default for InMemoryAuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditTrail for InMemoryAuditTrail {
    fn append(&self, draft: AuditDraft) -> GridResult<AuditLogEntry> {
        let mut state = self.lock()?;
        let entry = state.next(draft)?;

        info!(
            sequence = entry.sequence,
            action = %entry.action,
            chain_hash = %entry.chain_hash,
            "audit entry appended"
        );

        state.commit(entry.clone());
        Ok(entry)
    }

    fn fetch_all_entries(&self) -> GridResult<Vec<AuditLogEntry>> {
        Ok(self.lock()?.entries.clone())
    }

    fn entry_count(&self) -> GridResult<usize> {
        Ok(self.lock()?.entries.len())
    }

    fn last_hash(&self) -> GridResult<String> {
        Ok(self.lock()?.last_hash.clone())
    }
}
