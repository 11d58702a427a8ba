//! Schema guard for the content table
//!
//! Provides:
//! - The current column set of `TaskContent`
//! - Probe, additive migration and recreate-on-failure repair
//! - A ledger of every schema change with the checksum of the applied DDL

mod columns;
mod guard;
mod ledger;

pub use columns::{column_list, create_table_sql, ColumnDef, COLUMNS, CONTENT_TABLE, IDENTITY_COLUMNS};
pub use guard::{ensure_schema, is_current, SchemaStatus};
pub use ledger::{list_events, SchemaEvent};
