//! Integrity verifier: recompute the chain and persist the outcome.
//!
//! The walk itself is `chain::verify_chain`. This module adds what an
//! operator needs around it: a result record persisted in a key-value store
//! (so it survives restarts), an `INTEGRITY_CHECK` audit entry for every run,
//! and a way to run the walk off the calling thread.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
};

use chrono::Utc;
use tracing::{info, warn};

use grid_contracts::{
    audit::{AuditAction, AuditDraft, AuditResult},
    error::{GridError, GridResult},
    integrity::IntegrityCheckResult,
};
use grid_core::traits::{AuditTrail, KeyValueStore};

use crate::chain::verify_chain;

/// Key under which the last `IntegrityCheckResult` is stored.
pub const LAST_CHECK_KEY: &str = "integrity.last_check";

#[derive(Clone)]
pub struct IntegrityVerifier {
    trail: Arc<dyn AuditTrail>,
    kv: Arc<dyn KeyValueStore>,
}

impl IntegrityVerifier {
    pub fn new(trail: Arc<dyn AuditTrail>, kv: Arc<dyn KeyValueStore>) -> Self {
        Self { trail, kv }
    }

    /// Walk the whole chain, persist the result, and audit the check.
    ///
    /// A broken chain is a normal outcome (`is_valid == false`), not an
    /// error. Errors are reserved for store failures.
    pub fn run_check(&self) -> GridResult<IntegrityCheckResult> {
        let entries = self.trail.fetch_all_entries()?;
        let verdict = verify_chain(&entries)?;

        let details = match verdict.failed_event_id {
            None => format!("Chain intact: {} entries verified", entries.len()),
            Some(id) => format!("Deviation found at entry {}", id),
        };

        let result = IntegrityCheckResult {
            timestamp: Utc::now(),
            is_valid: verdict.is_valid,
            details,
            failed_event_id: verdict.failed_event_id,
            audit_entry_count: entries.len(),
        };

        if result.is_valid {
            info!(entries = result.audit_entry_count, "audit chain intact");
        } else {
            warn!(
                entries = result.audit_entry_count,
                verified = verdict.checked,
                failed_event_id = ?result.failed_event_id,
                "audit chain deviation found"
            );
        }

        self.kv.set(LAST_CHECK_KEY, &serde_json::to_string(&result)?)?;

        let outcome = if result.is_valid {
            AuditResult::Ok
        } else {
            AuditResult::Fail
        };
        self.trail.append(
            AuditDraft::system(AuditAction::IntegrityCheck)
                .with_result(outcome)
                .with_reason(result.details.clone()),
        )?;

        Ok(result)
    }

    /// The most recently persisted result, if a check has ever run.
    pub fn last_result(&self) -> GridResult<Option<IntegrityCheckResult>> {
        match self.kv.get(LAST_CHECK_KEY)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Run `run_check` on a background thread.
    ///
    /// The walk is linear in the chain length, so interactive callers should
    /// use this and join (or poll) the handle.
    pub fn spawn_check(&self) -> GridResult<JoinHandle<GridResult<IntegrityCheckResult>>> {
        let verifier = self.clone();
        thread::Builder::new()
            .name("integrity-check".to_string())
            .spawn(move || verifier.run_check())
            .map_err(|e| GridError::AuditReadFailed {
                reason: format!("failed to spawn integrity check: {}", e),
            })
    }
}
