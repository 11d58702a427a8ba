//! SQLite-backed content store

#![allow(clippy::result_large_err)]

use super::row::ContentRow;
use crate::db;
use crate::errors::{from_rusqlite, Result};
use crate::schema::{self, column_list, SchemaStatus, CONTENT_TABLE};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use taskvault_core::Task;

/// CRUD over the content table
///
/// Holds only the database path; every call opens a connection and drops it
/// before returning.
#[derive(Debug, Clone)]
pub struct ContentStore {
    path: PathBuf,
}

impl ContentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// True when the file exists and the table has every current column
    ///
    /// Never creates or repairs anything.
    pub fn is_current(&self) -> bool {
        self.exists()
            && self
                .connect()
                .map(|conn| schema::is_current(&conn))
                .unwrap_or(false)
    }

    fn connect(&self) -> Result<Connection> {
        db::open(&self.path)
    }

    /// Run the schema guard against this database
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the database cannot be opened or
    /// altered and `SchemaMismatch` if the table stays unreadable.
    pub fn ensure_schema(&self) -> Result<SchemaStatus> {
        let mut conn = self.connect()?;
        schema::ensure_schema(&mut conn)
    }

    /// Replace every row with one row per task
    ///
    /// Runs in a single transaction, so the table holds either the previous
    /// snapshot or the new one. Tasks sharing a key collapse to the last one.
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if any statement fails; the transaction
    /// is rolled back.
    pub fn replace_all(&self, tasks: &[Task]) -> Result<usize> {
        let mut conn = self.connect()?;
        let tx = conn.transaction().map_err(from_rusqlite)?;

        tx.execute(&format!("DELETE FROM {}", CONTENT_TABLE), [])
            .map_err(from_rusqlite)?;

        {
            let placeholders = (1..=schema::COLUMNS.len())
                .map(|i| format!("?{}", i))
                .collect::<Vec<_>>()
                .join(", ");
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT OR REPLACE INTO {} ({}) VALUES ({})",
                    CONTENT_TABLE,
                    column_list(),
                    placeholders
                ))
                .map_err(from_rusqlite)?;

            for task in tasks {
                let row = ContentRow::from_task(task);
                stmt.execute(&row.params()[..]).map_err(from_rusqlite)?;
            }
        }

        let count: i64 = tx
            .query_row(&format!("SELECT COUNT(*) FROM {}", CONTENT_TABLE), [], |r| {
                r.get(0)
            })
            .map_err(from_rusqlite)?;
        tx.commit().map_err(from_rusqlite)?;

        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// All rows, in insertion order
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the table cannot be read.
    pub fn select_all(&self) -> Result<Vec<ContentRow>> {
        let conn = self.connect()?;
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {} FROM {} ORDER BY rowid",
                column_list(),
                CONTENT_TABLE
            ))
            .map_err(from_rusqlite)?;

        let rows = stmt
            .query_map([], |row| ContentRow::read(row))
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;

        Ok(rows)
    }

    /// Overwrite the row whose key matches the task
    ///
    /// Returns the number of rows changed; 0 means no row had that key and
    /// nothing was written.
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the update fails.
    pub fn upsert_one(&self, task: &Task) -> Result<usize> {
        let conn = self.connect()?;
        let row = ContentRow::from_task(task);

        let assignments = schema::COLUMNS
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| format!("{} = ?{}", c.name, i + 1))
            .collect::<Vec<_>>()
            .join(", ");

        conn.execute(
            &format!(
                "UPDATE {} SET {} WHERE TaskId = ?1",
                CONTENT_TABLE, assignments
            ),
            &row.params()[..],
        )
        .map_err(from_rusqlite)
    }

    /// Delete the row with the given key; returns rows removed
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the delete fails.
    pub fn delete_one(&self, task_id: &str) -> Result<usize> {
        let conn = self.connect()?;
        conn.execute(
            &format!("DELETE FROM {} WHERE TaskId = ?1", CONTENT_TABLE),
            [task_id],
        )
        .map_err(from_rusqlite)
    }

    /// Number of stored rows
    ///
    /// # Errors
    ///
    /// Returns a `Persistence` error if the table cannot be counted.
    pub fn count(&self) -> Result<usize> {
        let conn = self.connect()?;
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {}", CONTENT_TABLE), [], |r| {
                r.get(0)
            })
            .map_err(from_rusqlite)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }
}
