//! # grid-core
//!
//! Store traits and the audited validation gate for the gastro-grid kernel.
//!
//! This crate provides:
//! - The three store traits (`AuditTrail`, `SopStore`, `KeyValueStore`)
//! - The `Gatekeeper` that turns validator outcomes into audit entries
//! - Atomic file write helpers used by the file-backed stores
//!
//! ## Usage
//!
//! ```rust,ignore
//! use grid_core::{Gatekeeper, traits::AuditTrail};
//!
//! let gate = Gatekeeper::new(trail.clone());
//! gate.guard(draft, grid_rules::validate_temperature(6.5, 7.0))?;
//! ```

pub mod gatekeeper;
pub mod persist;
pub mod traits;

pub use gatekeeper::Gatekeeper;
