//! Wiring of the stores and components over one data directory.
//!
//! Layout:
//!   audit.jsonl  the hash-chained audit trail
//!   sops.json    the SOP document set
//!   state.json   key-value state (last integrity check)
//!   grid.toml    optional configuration

use std::{path::Path, sync::Arc};

use grid_audit::{IntegrityVerifier, JsonFileKeyValueStore, JsonlAuditTrail};
use grid_contracts::error::GridResult;
use grid_core::{traits::AuditTrail, Gatekeeper};
use grid_rules::Validator;
use grid_sop::{JsonFileSopStore, SopRegistry};

use crate::config::GridConfig;

pub const AUDIT_FILE: &str = "audit.jsonl";
pub const SOP_FILE: &str = "sops.json";
pub const STATE_FILE: &str = "state.json";

/// Every component, each holding explicit handles to the stores it uses.
pub struct Kernel {
    pub trail: Arc<dyn AuditTrail>,
    pub gate: Gatekeeper,
    pub validator: Validator,
    pub verifier: IntegrityVerifier,
    pub sops: SopRegistry<JsonFileSopStore>,
}

impl Kernel {
    pub fn open(data_dir: &Path, config: GridConfig) -> GridResult<Self> {
        let jsonl = JsonlAuditTrail::open(data_dir.join(AUDIT_FILE))?;
        let trail: Arc<dyn AuditTrail> = Arc::new(jsonl);
        let kv = Arc::new(JsonFileKeyValueStore::open(data_dir.join(STATE_FILE))?);
        let sops = SopRegistry::open(JsonFileSopStore::new(data_dir.join(SOP_FILE)))?
            .with_audit(trail.clone());

        Ok(Self {
            gate: Gatekeeper::new(trail.clone()),
            validator: Validator::new(config.rules),
            verifier: IntegrityVerifier::new(trail.clone(), kv),
            sops,
            trail,
        })
    }
}
