//! # grid-audit
//!
//! Immutable, append-only, SHA-256 hash-chained HACCP audit trail.
//!
//! ## Overview
//!
//! Every audited action becomes an `AuditLogEntry` whose `chain_hash` commits
//! to the previous entry's hash. Tampering with any entry, even a single
//! byte, breaks the chain and is reported by the `IntegrityVerifier` with the
//! id of the first diverging entry.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use grid_audit::{JsonlAuditTrail, JsonFileKeyValueStore, IntegrityVerifier};
//!
//! let trail = Arc::new(JsonlAuditTrail::open("data/audit.jsonl")?);
//! let kv = Arc::new(JsonFileKeyValueStore::open("data/state.json")?);
//! let verifier = IntegrityVerifier::new(trail.clone(), kv);
//! let result = verifier.spawn_check()?.join().expect("check thread panicked")?;
//! ```

pub mod chain;
pub mod export;
pub mod integrity;
pub mod jsonl;
pub mod kv;
pub mod memory;
pub mod seal;

pub use chain::{hash_entry, verify_chain, ChainVerdict};
pub use export::{build_export, export_trail, inspect_export, record_export, ExportInspection};
pub use integrity::{IntegrityVerifier, LAST_CHECK_KEY};
pub use jsonl::JsonlAuditTrail;
pub use kv::{InMemoryKeyValueStore, JsonFileKeyValueStore};
pub use memory::InMemoryAuditTrail;
pub use seal::ExportSeal;

// ── Tests ─────────────────────────────────────────────────────────────────────
