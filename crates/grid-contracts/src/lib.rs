//! # grid-contracts
//!
//! Shared types and error contracts for the gastro-grid HACCP audit kernel.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod audit;
pub mod error;
pub mod integrity;
pub mod sop;
pub mod violation;
