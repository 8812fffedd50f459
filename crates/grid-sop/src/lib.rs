//! # grid-sop
//!
//! Versioned registry of Standard Operating Procedures.
//!
//! Every version of a SOP is kept forever for traceability. At any time at
//! most one version per `sop_id` is active; `create_new_version` archives the
//! previous active version and inserts the new one atomically.
//!
//! ```rust,ignore
//! use grid_sop::{SopRegistry, JsonFileSopStore};
//! use grid_contracts::sop::NewSopVersion;
//!
//! let registry = SopRegistry::open(JsonFileSopStore::new("data/sops.json"))?;
//! registry.create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.1"))?;
//! ```

pub mod registry;
pub mod store;
pub mod version;

pub use registry::SopRegistry;
pub use store::{InMemorySopStore, JsonFileSopStore};
pub use version::compare_versions;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::{sync::Arc, thread};

    use chrono::{TimeZone, Utc};

    use grid_audit::InMemoryAuditTrail;
    use grid_contracts::{
        audit::AuditAction,
        error::{GridError, GridResult},
        sop::{NewSopVersion, SopDocument, SopStatus},
    };
    use grid_core::traits::{AuditTrail, SopStore};

    use super::*;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn registry() -> SopRegistry<InMemorySopStore> {
        SopRegistry::open(InMemorySopStore::new()).unwrap()
    }

    fn active_count(registry: &SopRegistry<impl SopStore>, sop_id: &str) -> usize {
        registry
            .list_sops()
            .unwrap()
            .iter()
            .filter(|d| d.sop_id == sop_id && d.status == SopStatus::Active)
            .count()
    }

    /// A store whose saves always fail.
    struct BrokenStore;

    impl SopStore for BrokenStore {
        fn load(&self) -> GridResult<Vec<SopDocument>> {
            Ok(Vec::new())
        }

        fn save(&self, _documents: &[SopDocument]) -> GridResult<()> {
            Err(GridError::SopStoreFailed {
                reason: "disk full".to_string(),
            })
        }
    }

    // ── Single-active invariant ───────────────────────────────────────────────

    #[test]
    fn test_single_active_after_many_versions() {
        let registry = registry();
        for v in ["1.0", "1.1", "1.2", "2.0"] {
            registry
                .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", v))
                .unwrap();
            assert_eq!(active_count(&registry, "SOP-COOL"), 1, "after version {v}");
        }

        let active = registry.get_active_sop("SOP-COOL").unwrap().unwrap();
        assert_eq!(active.version, "2.0");
    }

    #[test]
    fn test_archived_versions_remain_retrievable() {
        let registry = registry();
        registry
            .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.0"))
            .unwrap();
        registry
            .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling v2", "1.1"))
            .unwrap();

        let old = registry.get_sop("SOP-COOL", "1.0").unwrap().unwrap();
        assert_eq!(old.status, SopStatus::Archived);
        assert_eq!(old.title, "Cooling");
        assert_eq!(registry.history("SOP-COOL").unwrap().len(), 2);
    }

    #[test]
    fn test_ids_are_independent() {
        let registry = registry();
        registry
            .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.0"))
            .unwrap();
        registry
            .create_new_version(NewSopVersion::new("SOP-HEAT", "Reheating", "1.0"))
            .unwrap();

        assert!(registry.get_active_sop("SOP-COOL").unwrap().is_some());
        assert!(registry.get_active_sop("SOP-HEAT").unwrap().is_some());
    }

    #[test]
    fn test_lookups_return_none_when_missing() {
        let registry = registry();
        assert_eq!(registry.get_active_sop("SOP-NONE").unwrap(), None);
        assert_eq!(registry.get_sop("SOP-NONE", "1.0").unwrap(), None);
    }

    // ── Listing ───────────────────────────────────────────────────────────────

    #[test]
    fn test_list_sorted_by_id_then_version() {
        let registry = registry();
        for (id, v) in [("SOP-B", "1.10"), ("SOP-A", "2.0"), ("SOP-B", "1.9"), ("SOP-A", "1.0")] {
            registry.create_new_version(NewSopVersion::new(id, "t", v)).unwrap();
        }

        let listed: Vec<(String, String)> = registry
            .list_sops()
            .unwrap()
            .into_iter()
            .map(|d| (d.sop_id, d.version))
            .collect();
        let expected = [("SOP-A", "1.0"), ("SOP-A", "2.0"), ("SOP-B", "1.9"), ("SOP-B", "1.10")];
        assert_eq!(
            listed,
            expected
                .iter()
                .map(|(a, b)| (a.to_string(), b.to_string()))
                .collect::<Vec<_>>()
        );
    }

    // ── Archive ───────────────────────────────────────────────────────────────

    #[test]
    fn test_archive_all_versions_is_idempotent() {
        let registry = registry();
        registry
            .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.0"))
            .unwrap();

        assert_eq!(registry.archive_all_versions("SOP-COOL").unwrap(), 1);
        assert_eq!(registry.archive_all_versions("SOP-COOL").unwrap(), 0);
        assert_eq!(registry.get_active_sop("SOP-COOL").unwrap(), None);
        assert_eq!(registry.archive_all_versions("SOP-NONE").unwrap(), 0);
    }

    // ── Input rules ───────────────────────────────────────────────────────────

    #[test]
    fn test_duplicate_version_rejected() {
        let registry = registry();
        registry
            .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.0"))
            .unwrap();
        let err = registry
            .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling again", "1.0"))
            .unwrap_err();

        match err {
            GridError::RuleViolated { rule_id, .. } => assert_eq!(rule_id, "HACCP-R06"),
            other => panic!("expected RuleViolated, got {:?}", other),
        }
        // The original version is still the active one.
        let active = registry.get_active_sop("SOP-COOL").unwrap().unwrap();
        assert_eq!(active.title, "Cooling");
    }

    #[test]
    fn test_empty_key_rejected() {
        let registry = registry();
        assert!(registry.create_new_version(NewSopVersion::new(" ", "t", "1.0")).is_err());
        assert!(registry.create_new_version(NewSopVersion::new("SOP-X", "t", "")).is_err());
        assert!(registry.list_sops().unwrap().is_empty());
    }

    #[test]
    fn test_new_version_fields() {
        let registry = registry();
        let from = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let doc = registry
            .create_new_version(
                NewSopVersion::new("SOP-COOL", "Cooling", "1.0")
                    .approved_by("qa-lead")
                    .valid_from(from),
            )
            .unwrap();

        assert_eq!(doc.status, SopStatus::Active);
        assert_eq!(doc.approved_by.as_deref(), Some("qa-lead"));
        assert_eq!(doc.valid_from, from);
        assert_eq!(doc.checksum.as_ref().map(String::len), Some(64));
    }

    // ── Persistence ───────────────────────────────────────────────────────────

    #[test]
    fn test_failed_save_leaves_state_unchanged() {
        let registry = SopRegistry::open(BrokenStore).unwrap();
        let err = registry
            .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.0"))
            .unwrap_err();
        assert!(matches!(err, GridError::SopStoreFailed { .. }));
        assert!(registry.list_sops().unwrap().is_empty());
    }

    #[test]
    fn test_json_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sops.json");

        {
            let registry = SopRegistry::open(JsonFileSopStore::new(&path)).unwrap();
            registry
                .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.0"))
                .unwrap();
            registry
                .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.1"))
                .unwrap();
        }

        let registry = SopRegistry::open(JsonFileSopStore::new(&path)).unwrap();
        assert_eq!(registry.list_sops().unwrap().len(), 2);
        assert_eq!(registry.get_active_sop("SOP-COOL").unwrap().unwrap().version, "1.1");
        assert_eq!(active_count(&registry, "SOP-COOL"), 1);
    }

    #[test]
    fn test_stored_set_with_two_actives_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sops.json");
        let mut docs = {
            let registry = SopRegistry::open(JsonFileSopStore::new(&path)).unwrap();
            for v in ["1.0", "1.1"] {
                registry
                    .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", v))
                    .unwrap();
            }
            registry.list_sops().unwrap()
        };
        for doc in &mut docs {
            doc.status = SopStatus::Active;
        }
        JsonFileSopStore::new(&path).save(&docs).unwrap();

        let err = SopRegistry::open(JsonFileSopStore::new(&path)).err().unwrap();
        assert!(matches!(
            err,
            GridError::SopStoreFailed { ref reason } if reason.contains("SOP-COOL")
        ));
    }

    // ── Concurrency ───────────────────────────────────────────────────────────

    #[test]
    fn test_concurrent_versions_keep_single_active() {
        let registry = Arc::new(registry());
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let registry = registry.clone();
                thread::spawn(move || {
                    for i in 0..10 {
                        registry
                            .create_new_version(NewSopVersion::new(
                                "SOP-COOL",
                                "Cooling",
                                format!("{}.{}", t, i),
                            ))
                            .unwrap();
                        assert!(active_count(&*registry, "SOP-COOL") <= 1);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(registry.list_sops().unwrap().len(), 80);
        assert_eq!(active_count(&*registry, "SOP-COOL"), 1);
    }

    // ── Audit wiring ──────────────────────────────────────────────────────────

    #[test]
    fn test_version_changes_are_audited() {
        let trail = Arc::new(InMemoryAuditTrail::new());
        let registry = registry().with_audit(trail.clone());

        registry
            .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.0"))
            .unwrap();
        registry
            .create_new_version(NewSopVersion::new("SOP-COOL", "Cooling", "1.1"))
            .unwrap();

        let actions: Vec<AuditAction> = trail
            .fetch_all_entries()
            .unwrap()
            .iter()
            .map(|e| e.action)
            .collect();
        assert_eq!(
            actions,
            vec![
                AuditAction::SopVersionCreated,
                AuditAction::SopArchived,
                AuditAction::SopVersionCreated,
            ]
        );
        let last = trail.fetch_all_entries().unwrap().pop().unwrap();
        assert_eq!(last.sop_id.as_deref(), Some("SOP-COOL"));
        assert_eq!(last.sop_version.as_deref(), Some("1.1"));
    }
}
