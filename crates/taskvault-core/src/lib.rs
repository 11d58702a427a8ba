//! TaskVault Core - record model and shared facilities
//!
//! This crate provides the pieces every other TaskVault crate builds on:
//! - The polymorphic `Task` record with its closed set of variants
//! - Deterministic identity keys derived from a record
//! - The persisted timestamp text format
//! - The structured error facility (`ExError`) and domain errors
//! - The structured logging facility and its test capture mode

pub mod errors;
pub mod identity;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, TaskVaultError};
pub use identity::derive_key;
pub use model::{Task, TaskDetails, TaskKind};
