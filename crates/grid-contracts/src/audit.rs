//! Audit log entry types.
//!
//! `AuditDraft` is what callers hand to an `AuditTrail`; the trail stamps it
//! with a sequence number, id, timestamp and chain hash and returns the
//! resulting `AuditLogEntry`. Entries are immutable once written.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::violation::RuleViolation;

/// Who triggered an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActorType {
    System,
    User,
}

/// The audited action. Serialized as SCREAMING_SNAKE_CASE, e.g. `SAVE_DENIED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    SaveAccepted,
    SaveDenied,
    TaskCompleted,
    IntegrityCheck,
    ExportCreated,
    SopVersionCreated,
    SopArchived,
}

impl AuditAction {
    pub const ALL: [AuditAction; 7] = [
        AuditAction::SaveAccepted,
        AuditAction::SaveDenied,
        AuditAction::TaskCompleted,
        AuditAction::IntegrityCheck,
        AuditAction::ExportCreated,
        AuditAction::SopVersionCreated,
        AuditAction::SopArchived,
    ];

    /// The wire name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::SaveAccepted => "SAVE_ACCEPTED",
            AuditAction::SaveDenied => "SAVE_DENIED",
            AuditAction::TaskCompleted => "TASK_COMPLETED",
            AuditAction::IntegrityCheck => "INTEGRITY_CHECK",
            AuditAction::ExportCreated => "EXPORT_CREATED",
            AuditAction::SopVersionCreated => "SOP_VERSION_CREATED",
            AuditAction::SopArchived => "SOP_ARCHIVED",
        }
    }

    /// Parse a wire name. Returns `None` for unknown names.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.as_str() == s)
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome attached to an audited action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditResult {
    Ok,
    Denied,
    Fail,
}

/// Caller-supplied content of an audit entry, before the trail assigns
/// sequence, id, timestamp and chain hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDraft {
    pub actor_type: ActorType,
    pub actor_id: Option<String>,
    pub action: AuditAction,
    pub result: Option<AuditResult>,
    pub reason: Option<String>,
    pub object_key: Option<String>,
    pub rule_id: Option<String>,
    pub sop_id: Option<String>,
    pub sop_version: Option<String>,
}

impl AuditDraft {
    /// A draft attributed to the system itself.
    pub fn system(action: AuditAction) -> Self {
        Self {
            actor_type: ActorType::System,
            actor_id: None,
            action,
            result: None,
            reason: None,
            object_key: None,
            rule_id: None,
            sop_id: None,
            sop_version: None,
        }
    }

    /// A draft attributed to the given user.
    pub fn user(actor_id: impl Into<String>, action: AuditAction) -> Self {
        Self {
            actor_type: ActorType::User,
            actor_id: Some(actor_id.into()),
            ..Self::system(action)
        }
    }

    pub fn with_result(mut self, result: AuditResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.object_key = Some(key.into());
        self
    }

    pub fn with_rule(mut self, rule_id: impl Into<String>) -> Self {
        self.rule_id = Some(rule_id.into());
        self
    }

    pub fn with_sop(mut self, sop_id: impl Into<String>, version: impl Into<String>) -> Self {
        self.sop_id = Some(sop_id.into());
        self.sop_version = Some(version.into());
        self
    }

    /// Turn this draft into the `SAVE_DENIED` record for `violation`,
    /// keeping actor and object reference.
    pub fn denied(self, violation: &RuleViolation) -> Self {
        Self {
            action: AuditAction::SaveDenied,
            result: Some(AuditResult::Denied),
            reason: Some(violation.reason.clone()),
            rule_id: Some(violation.rule_id.clone()),
            ..self
        }
    }
}

/// A single, immutable entry in the hash-chained audit trail.
///
/// Modifying any field invalidates `chain_hash` and is detected by the
/// integrity verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    /// Position in the chain, starting at 0.
    pub sequence: u64,
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub actor_type: ActorType,
    pub actor_id: Option<String>,
    pub action: AuditAction,
    pub result: Option<AuditResult>,
    pub reason: Option<String>,
    pub object_key: Option<String>,
    /// `HACCP-Rnn` or `HACCP-CCP-nn` when a rule was involved.
    pub rule_id: Option<String>,
    pub sop_id: Option<String>,
    pub sop_version: Option<String>,
    /// Lowercase hex SHA-256 linking this entry to its predecessor.
    pub chain_hash: String,
}

impl AuditLogEntry {
    /// The previous-hash value the first entry of every chain links to.
    ///
    /// 64 hex zeros.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}
