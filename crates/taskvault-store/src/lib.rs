//! TaskVault Store - hybrid persistence engine
//!
//! Splits each task across two backing artifacts:
//! - A JSON metadata document holding a compact summary of every record
//! - A SQLite content table holding full per-record data, variant columns included
//!
//! `PersistenceCoordinator` is the only entry point callers need; the
//! adapters underneath are public for inspection and tests.

pub mod config;
pub mod content;
pub mod coordinator;
pub mod db;
pub mod errors;
pub mod hydration;
pub mod metadata;
pub mod schema;

// Re-export key types
pub use config::StoreConfig;
pub use coordinator::{ConsistencyReport, EngineState, LoadOutcome, PersistenceCoordinator};
pub use errors::Result;
pub use hydration::SkippedRow;
pub use schema::SchemaStatus;
