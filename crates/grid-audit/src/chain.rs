//! Hash-chain primitives: hashing, entry stamping and chain verification.
//!
//! Hash input layout (bytes, in order):
//!   1. prev_hash as UTF-8 bytes (64 ASCII hex chars; genesis is 64 zeros)
//!   2. sequence as 8-byte little-endian
//!   3. canonical JSON of the entry content (compact serde_json, every field
//!      except `chain_hash`, in declaration order)
//!
//! This layout is fixed. Changing it breaks verification of existing trails.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use grid_contracts::{
    audit::{ActorType, AuditAction, AuditDraft, AuditLogEntry, AuditResult},
    error::GridResult,
};

/// Borrowed view of the hashed part of an entry.
///
/// Field order here defines the canonical JSON; keep it stable.
#[derive(Serialize)]
struct CanonicalEntry<'a> {
    sequence: u64,
    id: &'a Uuid,
    timestamp: &'a DateTime<Utc>,
    actor_type: ActorType,
    actor_id: Option<&'a str>,
    action: AuditAction,
    result: Option<AuditResult>,
    reason: Option<&'a str>,
    object_key: Option<&'a str>,
    rule_id: Option<&'a str>,
    sop_id: Option<&'a str>,
    sop_version: Option<&'a str>,
}

impl<'a> From<&'a AuditLogEntry> for CanonicalEntry<'a> {
    fn from(e: &'a AuditLogEntry) -> Self {
        Self {
            sequence: e.sequence,
            id: &e.id,
            timestamp: &e.timestamp,
            actor_type: e.actor_type,
            actor_id: e.actor_id.as_deref(),
            action: e.action,
            result: e.result,
            reason: e.reason.as_deref(),
            object_key: e.object_key.as_deref(),
            rule_id: e.rule_id.as_deref(),
            sop_id: e.sop_id.as_deref(),
            sop_version: e.sop_version.as_deref(),
        }
    }
}

/// Compute the chain hash of `entry` given its predecessor's hash.
///
/// `entry.chain_hash` itself is not part of the input. Returns a lowercase
/// 64-character hex string.
pub fn hash_entry(entry: &AuditLogEntry, prev_hash: &str) -> GridResult<String> {
    let content = serde_json::to_vec(&CanonicalEntry::from(entry))?;

    let mut hasher = Sha256::new();
    hasher.update(prev_hash.as_bytes());
    hasher.update(entry.sequence.to_le_bytes());
    hasher.update(&content);

    Ok(hex::encode(hasher.finalize()))
}

/// Build the next entry of a chain from `draft`.
///
/// Assigns a fresh id and the current time, then computes the chain hash.
/// Does not store anything; the caller commits the entry under its writer lock.
pub fn stamp(draft: AuditDraft, sequence: u64, prev_hash: &str) -> GridResult<AuditLogEntry> {
    let mut entry = AuditLogEntry {
        sequence,
        id: Uuid::new_v4(),
        timestamp: Utc::now(),
        actor_type: draft.actor_type,
        actor_id: draft.actor_id,
        action: draft.action,
        result: draft.result,
        reason: draft.reason,
        object_key: draft.object_key,
        rule_id: draft.rule_id,
        sop_id: draft.sop_id,
        sop_version: draft.sop_version,
        chain_hash: String::new(),
    };
    entry.chain_hash = hash_entry(&entry, prev_hash)?;
    Ok(entry)
}

/// Result of walking a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainVerdict {
    pub is_valid: bool,
    /// Id of the first entry that failed verification.
    pub failed_event_id: Option<Uuid>,
    /// Entries verified successfully before stopping.
    pub checked: usize,
}

/// Verify a chain, oldest entry first.
///
/// For each entry the expected previous hash starts at `GENESIS_HASH`; the
/// entry's `sequence` must equal its position and its stored `chain_hash`
/// must equal `hash_entry(entry, expected_prev)`. The walk stops at the first
/// mismatch and reports that entry's id. An empty chain is valid.
pub fn verify_chain(entries: &[AuditLogEntry]) -> GridResult<ChainVerdict> {
    let mut expected_prev = AuditLogEntry::GENESIS_HASH.to_string();

    for (position, entry) in entries.iter().enumerate() {
        let in_place = entry.sequence == position as u64;
        if !in_place || hash_entry(entry, &expected_prev)? != entry.chain_hash {
            return Ok(ChainVerdict {
                is_valid: false,
                failed_event_id: Some(entry.id),
                checked: position,
            });
        }
        expected_prev.clone_from(&entry.chain_hash);
    }

    Ok(ChainVerdict {
        is_valid: true,
        failed_event_id: None,
        checked: entries.len(),
    })
}

/// The mutable head of a chain: entries written so far and the last hash.
///
/// Shared by the in-memory and JSON-lines trails, which both keep it behind a
/// `Mutex` so that stamp-then-commit is one critical section.
#[derive(Debug)]
pub(crate) struct ChainState {
    pub(crate) entries: Vec<AuditLogEntry>,
    pub(crate) last_hash: String,
}

impl ChainState {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            last_hash: AuditLogEntry::GENESIS_HASH.to_string(),
        }
    }

    /// Rebuild state from previously persisted entries.
    pub(crate) fn from_entries(entries: Vec<AuditLogEntry>) -> Self {
        let last_hash = entries
            .last()
            .map(|e| e.chain_hash.clone())
            .unwrap_or_else(|| AuditLogEntry::GENESIS_HASH.to_string());
        Self { entries, last_hash }
    }

    pub(crate) fn next(&self, draft: AuditDraft) -> GridResult<AuditLogEntry> {
        stamp(draft, self.entries.len() as u64, &self.last_hash)
    }

    pub(crate) fn commit(&mut self, entry: AuditLogEntry) {
        self.last_hash.clone_from(&entry.chain_hash);
        self.entries.push(entry);
    }
}
