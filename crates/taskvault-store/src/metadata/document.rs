//! The metadata document
//!
//! An indented JSON array; each object carries, in order, `TaskId`,
//! `TaskType`, `Name`, `DifficultyLevel`, `CreationDate`, `DueDate` and
//! `IsCompleted`. Documents from the older non-polymorphic generation lack
//! `TaskId`/`TaskType` and still parse.

#![allow(clippy::result_large_err)]

use super::atomic::atomic_write;
use crate::content::ContentRow;
use crate::errors::{io_error, json_error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use taskvault_core::model::format_timestamp;
use taskvault_core::{derive_key, Task};

/// One summary object of the metadata document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataEntry {
    #[serde(rename = "TaskId", default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(rename = "TaskType", default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,

    #[serde(rename = "Name", default)]
    pub name: String,

    #[serde(rename = "DifficultyLevel", default)]
    pub difficulty_level: Option<String>,

    #[serde(rename = "CreationDate", default)]
    pub creation_date: Option<String>,

    #[serde(rename = "DueDate", default)]
    pub due_date: Option<String>,

    #[serde(rename = "IsCompleted", default)]
    pub is_completed: bool,
}

impl From<&Task> for MetadataEntry {
    fn from(task: &Task) -> Self {
        Self {
            task_id: Some(derive_key(task)),
            task_type: Some(task.type_tag().to_string()),
            name: task.name.clone(),
            difficulty_level: Some(task.difficulty_level.clone()),
            creation_date: Some(format_timestamp(&task.creation_date)),
            due_date: Some(format_timestamp(&task.due_date)),
            is_completed: task.is_completed,
        }
    }
}

impl From<&ContentRow> for MetadataEntry {
    fn from(row: &ContentRow) -> Self {
        Self {
            task_id: row.task_id.clone(),
            task_type: row.task_type.clone(),
            name: row.name.clone().unwrap_or_default(),
            difficulty_level: row.difficulty_level.clone(),
            creation_date: row.creation_date.clone(),
            due_date: row.due_date.clone(),
            is_completed: row.is_completed.unwrap_or(0) != 0,
        }
    }
}

/// Whole-file reader/writer for the metadata document
#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Rewrite the document from a set of tasks
    ///
    /// # Errors
    ///
    /// As [`MetadataStore::write_entries`].
    pub fn write(&self, tasks: &[Task]) -> Result<()> {
        let entries: Vec<MetadataEntry> = tasks.iter().map(MetadataEntry::from).collect();
        self.write_entries(&entries)
    }

    /// Rewrite the document from prepared entries
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error if the entries cannot be encoded and
    /// an `Io` error if the temporary file cannot be written or renamed.
    pub fn write_entries(&self, entries: &[MetadataEntry]) -> Result<()> {
        let json =
            serde_json::to_string_pretty(entries).map_err(|e| json_error("write_metadata", e))?;
        atomic_write(&self.path, json.as_bytes())
    }

    /// Parse the document
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the file cannot be read and a
    /// `Serialization` error if it is not a JSON array of summary objects.
    pub fn read(&self) -> Result<Vec<MetadataEntry>> {
        let text = std::fs::read_to_string(&self.path).map_err(|e| io_error("read_metadata", e))?;
        serde_json::from_str(&text).map_err(|e| json_error("read_metadata", e))
    }

    /// Delete the document; absent is fine
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if a present file cannot be deleted.
    pub fn remove(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove_metadata", e)),
        }
    }
}
