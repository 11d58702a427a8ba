//! Probe and repair of the content table
//!
//! A cheap query selects every current column. If it fails the guard looks at
//! what is actually there: a missing table is created, a table that still has
//! its identity columns gets the missing columns added in place, and anything
//! else is dropped and recreated.

#![allow(clippy::result_large_err)]

use super::columns::{column_list, create_table_sql, ColumnDef, COLUMNS, CONTENT_TABLE, IDENTITY_COLUMNS};
use super::ledger::{create_ledger_table, record_event};
use crate::errors::{from_rusqlite, schema_error, Result};
use rusqlite::Connection;

/// What the guard had to do to make the table current
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaStatus {
    /// Probe succeeded, nothing changed
    Current,
    /// Table was absent and has been created
    Created,
    /// Missing columns were added; existing rows kept
    Migrated { added: Vec<String> },
    /// Table could not be migrated and was rebuilt empty
    Recreated { discarded_rows: u64 },
}

impl SchemaStatus {
    /// True when stored rows were lost
    pub fn lost_data(&self) -> bool {
        matches!(self, SchemaStatus::Recreated { discarded_rows } if *discarded_rows > 0)
    }
}

/// True when every current column can be selected; changes nothing
pub fn is_current(conn: &Connection) -> bool {
    selects_every_column(conn)
}

/// Bring the content table to the current column set
///
/// # Errors
///
/// Returns a `Persistence` error if SQLite fails and `SchemaMismatch` if the
/// table has every column yet still cannot be queried.
pub fn ensure_schema(conn: &mut Connection) -> Result<SchemaStatus> {
    create_ledger_table(conn)?;

    if selects_every_column(conn) {
        return Ok(SchemaStatus::Current);
    }

    let ddl = create_table_sql();
    let existing = existing_columns(conn)?;

    if existing.is_empty() {
        let tx = conn.transaction().map_err(from_rusqlite)?;
        tx.execute_batch(&ddl).map_err(from_rusqlite)?;
        record_event(&tx, "created", None, &ddl)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::info!(op = "schema_guard", table = CONTENT_TABLE, "content table created");
        return Ok(SchemaStatus::Created);
    }

    let missing: Vec<&ColumnDef> = COLUMNS
        .iter()
        .filter(|c| !has_column(&existing, c.name))
        .collect();
    let identity_intact = IDENTITY_COLUMNS
        .iter()
        .all(|name| has_column(&existing, name));

    if missing.is_empty() {
        // Every column is there yet the select failed: not a shape problem
        return Err(schema_error(&format!(
            "{} has all expected columns but cannot be queried",
            CONTENT_TABLE
        )));
    }

    if identity_intact {
        let added: Vec<String> = missing.iter().map(|c| c.name.to_string()).collect();

        let tx = conn.transaction().map_err(from_rusqlite)?;
        for column in &missing {
            tx.execute_batch(&format!(
                "ALTER TABLE {} ADD COLUMN {}",
                CONTENT_TABLE,
                column.add_column_sql()
            ))
            .map_err(from_rusqlite)?;
        }
        record_event(&tx, "migrated", Some(&added.join(",")), &ddl)?;
        tx.commit().map_err(from_rusqlite)?;

        tracing::warn!(
            op = "schema_guard",
            table = CONTENT_TABLE,
            added = %added.join(","),
            "content table migrated in place"
        );
        return Ok(SchemaStatus::Migrated { added });
    }

    let discarded_rows: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", CONTENT_TABLE), [], |row| {
            row.get(0)
        })
        .map_err(from_rusqlite)?;
    let discarded_rows = u64::try_from(discarded_rows).unwrap_or_default();

    let tx = conn.transaction().map_err(from_rusqlite)?;
    tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", CONTENT_TABLE))
        .map_err(from_rusqlite)?;
    tx.execute_batch(&ddl).map_err(from_rusqlite)?;
    record_event(
        &tx,
        "recreated",
        Some(&format!("discarded {} rows", discarded_rows)),
        &ddl,
    )?;
    tx.commit().map_err(from_rusqlite)?;

    tracing::warn!(
        op = "schema_guard",
        table = CONTENT_TABLE,
        discarded_rows,
        "content table lacked identity columns; recreated"
    );
    Ok(SchemaStatus::Recreated { discarded_rows })
}

fn selects_every_column(conn: &Connection) -> bool {
    let sql = format!("SELECT {} FROM {} LIMIT 1", column_list(), CONTENT_TABLE);
    conn.prepare(&sql)
        .and_then(|mut stmt| stmt.exists([]))
        .is_ok()
}

fn existing_columns(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn
        .prepare(&format!("PRAGMA table_info({})", CONTENT_TABLE))
        .map_err(from_rusqlite)?;

    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(names)
}

fn has_column(existing: &[String], name: &str) -> bool {
    existing.iter().any(|e| e.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[test]
    fn test_fresh_database_created_then_current() {
        let mut conn = open_in_memory().unwrap();

        assert_eq!(ensure_schema(&mut conn).unwrap(), SchemaStatus::Created);
        assert_eq!(ensure_schema(&mut conn).unwrap(), SchemaStatus::Current);
    }

    #[test]
    fn test_additive_change_keeps_rows() {
        let mut conn = open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE TaskContent (
                TaskId TEXT PRIMARY KEY,
                TaskType TEXT NOT NULL,
                Name TEXT NOT NULL,
                Description TEXT,
                DifficultyLevel TEXT,
                CreationDate TEXT,
                DueDate TEXT,
                IsCompleted INTEGER DEFAULT 0
            );
            INSERT INTO TaskContent (TaskId, TaskType, Name) VALUES ('k1', 'Trabalho', 'Deploy');",
        )
        .unwrap();

        let status = ensure_schema(&mut conn).unwrap();

        match status {
            SchemaStatus::Migrated { added } => {
                assert_eq!(added.len(), COLUMNS.len() - 8);
                assert!(added.contains(&"Location".to_string()));
            }
            other => panic!("expected migration, got {:?}", other),
        }
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM TaskContent", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
        assert!(selects_every_column(&conn));
    }

    fn column_defaults(conn: &Connection) -> Vec<(String, Option<String>)> {
        let mut stmt = conn.prepare("PRAGMA table_info(TaskContent)").unwrap();
        let mut defaults: Vec<(String, Option<String>)> = stmt
            .query_map([], |row| Ok((row.get(1)?, row.get(4)?)))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap();
        defaults.retain(|(name, _)| !IDENTITY_COLUMNS.contains(&name.as_str()));
        defaults.sort();
        defaults
    }

    #[test]
    fn test_migrated_columns_match_fresh_defaults() {
        // Given: A table holding only the identity columns and one row
        let mut migrated = open_in_memory().unwrap();
        migrated
            .execute_batch(
                "CREATE TABLE TaskContent (
                    TaskId TEXT PRIMARY KEY,
                    TaskType TEXT NOT NULL,
                    Name TEXT NOT NULL
                );
                INSERT INTO TaskContent VALUES ('k1', 'Pessoal', 'Groceries');",
            )
            .unwrap();
        let mut fresh = open_in_memory().unwrap();

        // When: Both are brought up to date
        ensure_schema(&mut migrated).unwrap();
        ensure_schema(&mut fresh).unwrap();

        // Then: Added columns carry the same defaults as created ones
        assert_eq!(column_defaults(&migrated), column_defaults(&fresh));

        // And: The existing row reads those defaults
        let (completed, urgent, hours): (i64, i64, i64) = migrated
            .query_row(
                "SELECT IsCompleted, IsUrgent, StudyHours FROM TaskContent WHERE TaskId = 'k1'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
            )
            .unwrap();
        assert_eq!((completed, urgent, hours), (0, 0, 0));
    }

    #[test]
    fn test_is_current_leaves_old_table_alone() {
        // Given: A table from the untagged generation
        let conn = open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE TaskContent (Name TEXT NOT NULL, Description TEXT);
             INSERT INTO TaskContent VALUES ('Old', '');",
        )
        .unwrap();

        // When: Checking without repair
        let current = is_current(&conn);

        // Then: It is reported stale and its row survives
        assert!(!current);
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM TaskContent", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_missing_identity_column_recreates() {
        let mut conn = open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE TaskContent (
                TaskId TEXT PRIMARY KEY,
                Name TEXT NOT NULL,
                Description TEXT
            );
            INSERT INTO TaskContent VALUES ('a', 'One', '');
            INSERT INTO TaskContent VALUES ('b', 'Two', '');",
        )
        .unwrap();

        let status = ensure_schema(&mut conn).unwrap();

        assert_eq!(status, SchemaStatus::Recreated { discarded_rows: 2 });
        assert!(status.lost_data());
        assert!(selects_every_column(&conn));
    }

    #[test]
    fn test_ledger_records_each_change() {
        let mut conn = open_in_memory().unwrap();
        ensure_schema(&mut conn).unwrap();
        ensure_schema(&mut conn).unwrap();

        let events = super::super::list_events(&conn).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].action, "created");
    }
}
