//! Ledger of schema changes
//!
//! Each create, migrate or recreate appends a row carrying the SHA-256 of the
//! DDL the table was brought to.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;
use sha2::{Digest, Sha256};

/// A recorded schema change
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEvent {
    pub action: String,
    pub detail: Option<String>,
    pub checksum: String,
    pub applied_at: i64,
}

/// Compute SHA256 checksum of a string
pub(crate) fn compute_checksum(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Create the ledger table if it doesn't exist
pub(crate) fn create_ledger_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            action TEXT NOT NULL,
            detail TEXT,
            checksum TEXT NOT NULL,
            applied_at INTEGER NOT NULL
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

pub(crate) fn record_event(
    conn: &Connection,
    action: &str,
    detail: Option<&str>,
    ddl: &str,
) -> Result<()> {
    let now = chrono::Utc::now().timestamp();
    conn.execute(
        "INSERT INTO schema_events (action, detail, checksum, applied_at) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![action, detail, compute_checksum(ddl), now],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// List recorded schema changes, oldest first
pub fn list_events(conn: &Connection) -> Result<Vec<SchemaEvent>> {
    create_ledger_table(conn)?;

    let mut stmt = conn
        .prepare("SELECT action, detail, checksum, applied_at FROM schema_events ORDER BY id")
        .map_err(from_rusqlite)?;

    let events = stmt
        .query_map([], |row| {
            Ok(SchemaEvent {
                action: row.get(0)?,
                detail: row.get(1)?,
                checksum: row.get(2)?,
                applied_at: row.get(3)?,
            })
        })
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checksum_deterministic() {
        let a = compute_checksum("CREATE TABLE x (y TEXT)");
        let b = compute_checksum("CREATE TABLE x (y TEXT)");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_record_and_list() {
        let conn = Connection::open_in_memory().unwrap();
        create_ledger_table(&conn).unwrap();
        record_event(&conn, "created", None, "DDL").unwrap();
        record_event(&conn, "migrated", Some("Location"), "DDL").unwrap();

        let events = list_events(&conn).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, "created");
        assert_eq!(events[1].detail.as_deref(), Some("Location"));
        assert_eq!(events[0].checksum, compute_checksum("DDL"));
    }
}
