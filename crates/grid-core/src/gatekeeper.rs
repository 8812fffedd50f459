//! The gatekeeper: routes validation outcomes into the audit trail.
//!
//!   Validator result → Gatekeeper::guard → AuditTrail::append
//!
//! The invariant is that no validation failure leaves the kernel without an
//! audit entry. A denial is written as `SAVE_DENIED` before the caller sees
//! `GridError::RuleViolated`; an accepted operation is written with result `OK`.

use std::sync::Arc;

use tracing::{debug, warn};

use grid_contracts::{
    audit::{AuditDraft, AuditLogEntry, AuditResult},
    error::{GridError, GridResult},
    violation::RuleViolation,
};

use crate::traits::AuditTrail;

/// Wraps an `AuditTrail` so every guarded operation leaves exactly one entry.
#[derive(Clone)]
pub struct Gatekeeper {
    trail: Arc<dyn AuditTrail>,
}

impl Gatekeeper {
    pub fn new(trail: Arc<dyn AuditTrail>) -> Self {
        Self { trail }
    }

    /// The trail this gatekeeper writes to.
    pub fn trail(&self) -> &Arc<dyn AuditTrail> {
        &self.trail
    }

    /// Audit the outcome of `check` for the operation described by `draft`.
    ///
    /// - `Ok(())`: appends `draft` (result defaults to `OK`) and returns the entry.
    /// - `Err(violation)`: appends a `SAVE_DENIED` entry carrying the rule id and
    ///   reason, then returns `GridError::RuleViolated`.
    ///
    /// # Errors
    ///
    /// An audit write failure is returned as-is and takes precedence over the
    /// rule outcome: an operation that cannot be audited is not accepted.
    pub fn guard(
        &self,
        draft: AuditDraft,
        check: Result<(), RuleViolation>,
    ) -> GridResult<AuditLogEntry> {
        match check {
            Ok(()) => {
                let draft = if draft.result.is_none() {
                    draft.with_result(AuditResult::Ok)
                } else {
                    draft
                };
                let entry = self.trail.append(draft)?;
                debug!(
                    sequence = entry.sequence,
                    action = %entry.action,
                    "guarded operation accepted"
                );
                Ok(entry)
            }
            Err(violation) => {
                self.record_violation(draft, &violation)?;
                Err(GridError::RuleViolated {
                    rule_id: violation.rule_id,
                    reason: violation.reason,
                })
            }
        }
    }

    /// Append the `SAVE_DENIED` entry for `violation` without turning it into an error.
    pub fn record_violation(
        &self,
        draft: AuditDraft,
        violation: &RuleViolation,
    ) -> GridResult<AuditLogEntry> {
        warn!(
            rule_id = %violation.rule_id,
            reason = %violation.reason,
            key = draft.object_key.as_deref().unwrap_or("-"),
            "operation denied by rule"
        );
        self.trail.append(draft.denied(violation))
    }
}
