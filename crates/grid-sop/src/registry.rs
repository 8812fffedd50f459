//! The SOP registry.
//!
//! Holds every version of every SOP and guarantees that for each `sop_id` at
//! most one version is active. Creating a version archives the current
//! active one and inserts the new one as a single step:
//!
//! 1. Take the write lock.
//! 2. Build the next document set (archive actives, append new version).
//! 3. Persist the complete set through the `SopStore`.
//! 4. Only on success, swap it into memory.
//!
//! Readers take the read lock, so they see either the old or the new set,
//! never a state with two active versions.

use std::{
    collections::HashSet,
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};
use uuid::Uuid;

use grid_contracts::{
    audit::{AuditAction, AuditDraft, AuditResult},
    error::{GridError, GridResult},
    sop::{NewSopVersion, SopDocument, SopStatus},
};
use grid_core::traits::{AuditTrail, SopStore};
use grid_rules::rule::INVALID_SOP_VERSION;

use crate::version::compare_versions;

pub struct SopRegistry<S: SopStore> {
    store: S,
    documents: RwLock<Vec<SopDocument>>,
    audit: Option<Arc<dyn AuditTrail>>,
}

impl<S: SopStore> SopRegistry<S> {
    /// Load the current document set from `store`.
    ///
    /// Returns `GridError::SopStoreFailed` if the stored set has more than one
    /// active version of the same `sop_id`.
    pub fn open(store: S) -> GridResult<Self> {
        let documents = store.load()?;
        if let Some(sop_id) = duplicate_active(&documents) {
            warn!(sop_id, "stored sop set has several active versions");
            return Err(GridError::SopStoreFailed {
                reason: format!("stored set has more than one active version of {}", sop_id),
            });
        }
        debug!(documents = documents.len(), "sop registry loaded");
        Ok(Self {
            store,
            documents: RwLock::new(documents),
            audit: None,
        })
    }

    /// Record `SOP_VERSION_CREATED` / `SOP_ARCHIVED` entries in `trail`.
    ///
    /// Entries are appended after the document set has been persisted; an
    /// audit failure is returned to the caller even though the change stands.
    pub fn with_audit(mut self, trail: Arc<dyn AuditTrail>) -> Self {
        self.audit = Some(trail);
        self
    }

    fn read(&self) -> GridResult<RwLockReadGuard<'_, Vec<SopDocument>>> {
        self.documents.read().map_err(|e| GridError::SopStoreFailed {
            reason: format!("sop registry lock poisoned: {}", e),
        })
    }

    fn write(&self) -> GridResult<RwLockWriteGuard<'_, Vec<SopDocument>>> {
        self.documents.write().map_err(|e| GridError::SopStoreFailed {
            reason: format!("sop registry lock poisoned: {}", e),
        })
    }

    /// All documents, sorted by `(sop_id, version)` ascending.
    pub fn list_sops(&self) -> GridResult<Vec<SopDocument>> {
        let mut docs = self.read()?.clone();
        docs.sort_by(|a, b| {
            a.sop_id
                .cmp(&b.sop_id)
                .then_with(|| compare_versions(&a.version, &b.version))
        });
        Ok(docs)
    }

    /// Every version of `sop_id`, oldest version first.
    pub fn history(&self, sop_id: &str) -> GridResult<Vec<SopDocument>> {
        let mut docs: Vec<SopDocument> = self
            .read()?
            .iter()
            .filter(|d| d.sop_id == sop_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| compare_versions(&a.version, &b.version));
        Ok(docs)
    }

    /// The active version of `sop_id`, if any.
    pub fn get_active_sop(&self, sop_id: &str) -> GridResult<Option<SopDocument>> {
        Ok(self
            .read()?
            .iter()
            .find(|d| d.sop_id == sop_id && d.is_active())
            .cloned())
    }

    /// An exact version, whether active or archived.
    pub fn get_sop(&self, sop_id: &str, version: &str) -> GridResult<Option<SopDocument>> {
        Ok(self
            .read()?
            .iter()
            .find(|d| d.sop_id == sop_id && d.version == version)
            .cloned())
    }

    /// Archive every active version of `sop_id`. Returns how many were archived;
    /// zero (and no write) when nothing was active.
    pub fn archive_all_versions(&self, sop_id: &str) -> GridResult<usize> {
        let mut docs = self.write()?;
        let mut next = docs.clone();
        let archived = archive_actives(&mut next, sop_id);
        if archived.is_empty() {
            return Ok(0);
        }

        self.store.save(&next)?;
        *docs = next;
        drop(docs);

        info!(sop_id, count = archived.len(), "sop versions archived");
        for version in &archived {
            self.audit_event(AuditAction::SopArchived, sop_id, version)?;
        }
        Ok(archived.len())
    }

    /// Archive the active version of `new.sop_id` and insert `new` as active.
    ///
    /// # Errors
    ///
    /// - `GridError::RuleViolated` (`HACCP-R06`) for an empty sop id or
    ///   version, or a version that already exists for this sop id.
    /// - `GridError::SopStoreFailed` if persisting fails; nothing changes then.
    pub fn create_new_version(&self, new: NewSopVersion) -> GridResult<SopDocument> {
        if new.sop_id.trim().is_empty() || new.version.trim().is_empty() {
            return Err(GridError::RuleViolated {
                rule_id: INVALID_SOP_VERSION.to_string(),
                reason: "sop id and version must not be empty".to_string(),
            });
        }

        let mut docs = self.write()?;

        if docs
            .iter()
            .any(|d| d.sop_id == new.sop_id && d.version == new.version)
        {
            warn!(sop_id = %new.sop_id, version = %new.version, "duplicate sop version rejected");
            return Err(GridError::RuleViolated {
                rule_id: INVALID_SOP_VERSION.to_string(),
                reason: format!("{} version {} already exists", new.sop_id, new.version),
            });
        }

        let now = Utc::now();
        let document = SopDocument {
            id: Uuid::new_v4(),
            checksum: Some(checksum(&new.sop_id, &new.title, &new.version)),
            sop_id: new.sop_id,
            title: new.title,
            version: new.version,
            status: SopStatus::Active,
            valid_from: new.valid_from.unwrap_or(now),
            approved_by: new.approved_by,
            created_at: now,
        };

        let mut next = docs.clone();
        let archived = archive_actives(&mut next, &document.sop_id);
        next.push(document.clone());

        self.store.save(&next)?;
        *docs = next;
        drop(docs);

        info!(
            sop_id = %document.sop_id,
            version = %document.version,
            archived = archived.len(),
            "sop version created"
        );

        for version in &archived {
            self.audit_event(AuditAction::SopArchived, &document.sop_id, version)?;
        }
        self.audit_event(AuditAction::SopVersionCreated, &document.sop_id, &document.version)?;

        Ok(document)
    }

    fn audit_event(&self, action: AuditAction, sop_id: &str, version: &str) -> GridResult<()> {
        if let Some(trail) = &self.audit {
            trail.append(
                AuditDraft::system(action)
                    .with_result(AuditResult::Ok)
                    .with_sop(sop_id, version),
            )?;
        }
        Ok(())
    }
}

/// The first `sop_id` with more than one active version, if any.
fn duplicate_active(docs: &[SopDocument]) -> Option<&str> {
    let mut seen = HashSet::new();
    docs.iter()
        .filter(|d| d.is_active())
        .map(|d| d.sop_id.as_str())
        .find(|id| !seen.insert(*id))
}

/// Archive the active documents for `sop_id` in place; returns their versions.
fn archive_actives(docs: &mut [SopDocument], sop_id: &str) -> Vec<String> {
    docs.iter_mut()
        .filter(|d| d.sop_id == sop_id && d.is_active())
        .map(|d| {
            d.status = SopStatus::Archived;
            d.version.clone()
        })
        .collect()
}

/// Hex SHA-256 over the canonical JSON of `[sop_id, title, version]`.
fn checksum(sop_id: &str, title: &str, version: &str) -> String {
    let canonical = serde_json::json!([sop_id, title, version]).to_string();
    hex::encode(Sha256::digest(canonical.as_bytes()))
}
