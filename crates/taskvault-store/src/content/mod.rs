//! Content store adapter
//!
//! Full per-record rows in the SQLite `TaskContent` table, one column per
//! common field plus every variant-specific column.

mod row;
mod sqlite_content;

pub use row::ContentRow;
pub use sqlite_content::ContentStore;
