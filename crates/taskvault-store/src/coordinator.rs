//! Persistence coordinator
//!
//! The single entry point the in-memory task manager talks to. Writes go to
//! the metadata document first and the content table last, so the content
//! table always holds the last complete snapshot and the document can be
//! rebuilt from it.

#![allow(clippy::result_large_err)]

use crate::config::StoreConfig;
use crate::content::ContentStore;
use crate::errors::{io_error, Result};
use crate::hydration::{hydrate_rows, SkippedRow};
use crate::metadata::{MetadataEntry, MetadataStore};
use crate::schema::SchemaStatus;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Instant;
use taskvault_core::errors::ExError;
use taskvault_core::{derive_key, log_op_end, log_op_error, log_op_start, Task};

/// SQLite files that may sit next to the database
const SIDE_FILE_SUFFIXES: [&str; 3] = ["-journal", "-wal", "-shm"];

/// Lifecycle of a coordinator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// The schema guard has not run (fresh, or after `clear_all`)
    Uninitialized,
    /// The content table matches the current column set
    Ready,
}

/// Result of `load_all`
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    /// Every stored row was reconstructed (or nothing is stored yet)
    Complete(Vec<Task>),
    /// Some rows were skipped; the rest loaded
    Partial {
        tasks: Vec<Task>,
        skipped: Vec<SkippedRow>,
    },
    /// The store could not be read at all
    Failed(ExError),
}

impl LoadOutcome {
    /// Tasks that loaded; empty for `Failed`
    pub fn tasks(&self) -> &[Task] {
        match self {
            LoadOutcome::Complete(tasks) | LoadOutcome::Partial { tasks, .. } => tasks,
            LoadOutcome::Failed(_) => &[],
        }
    }

    pub fn into_tasks(self) -> Vec<Task> {
        match self {
            LoadOutcome::Complete(tasks) | LoadOutcome::Partial { tasks, .. } => tasks,
            LoadOutcome::Failed(_) => Vec::new(),
        }
    }

    pub fn skipped(&self) -> &[SkippedRow] {
        match self {
            LoadOutcome::Partial { skipped, .. } => skipped,
            _ => &[],
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped().len()
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, LoadOutcome::Complete(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, LoadOutcome::Failed(_))
    }

    pub fn error(&self) -> Option<&ExError> {
        match self {
            LoadOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    /// Loaded tasks, or the failure; skipped rows are dropped
    ///
    /// # Errors
    ///
    /// Returns the cause of a `Failed` outcome.
    pub fn into_result(self) -> Result<Vec<Task>> {
        match self {
            LoadOutcome::Failed(err) => Err(err),
            other => Ok(other.into_tasks()),
        }
    }
}

/// Key-level comparison of the two artifacts
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Keys listed in the metadata document with no content row
    pub metadata_only: Vec<String>,
    /// Content rows missing from the metadata document
    pub content_only: Vec<String>,
    /// Metadata entries without a `TaskId` (older document generation)
    pub unkeyed_entries: usize,
}

impl ConsistencyReport {
    pub fn is_consistent(&self) -> bool {
        self.metadata_only.is_empty() && self.content_only.is_empty() && self.unkeyed_entries == 0
    }
}

/// Coordinates the metadata document and the content table
#[derive(Debug)]
pub struct PersistenceCoordinator {
    config: StoreConfig,
    content: ContentStore,
    metadata: MetadataStore,
    state: EngineState,
}

impl PersistenceCoordinator {
    /// Coordinator for the configured locations; nothing is touched yet
    pub fn new(config: StoreConfig) -> Self {
        let content = ContentStore::new(config.content_path());
        let metadata = MetadataStore::new(config.metadata_path());
        Self {
            config,
            content,
            metadata,
            state: EngineState::Uninitialized,
        }
    }

    /// `new` followed by `initialize`
    ///
    /// # Errors
    ///
    /// As [`PersistenceCoordinator::initialize`].
    pub fn open(config: StoreConfig) -> Result<Self> {
        let mut coordinator = Self::new(config);
        coordinator.initialize()?;
        Ok(coordinator)
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn content(&self) -> &ContentStore {
        &self.content
    }

    pub fn metadata(&self) -> &MetadataStore {
        &self.metadata
    }

    /// Run the schema guard and repair a diverged metadata document
    ///
    /// Idempotent. Leaves the coordinator `Ready`.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if the data directory cannot be created, a
    /// `Persistence` error if SQLite fails and `SchemaMismatch` if the table
    /// cannot be brought up to date.
    pub fn initialize(&mut self) -> Result<SchemaStatus> {
        let start = Instant::now();
        log_op_start!("initialize");

        let result = self.run_initialize();
        finish("initialize", start, result)
    }

    fn run_initialize(&mut self) -> Result<SchemaStatus> {
        let status = self.run_guard()?;

        if self.metadata.exists() {
            let diverged = match self.compare_keys() {
                Ok(report) if report.is_consistent() => false,
                Ok(report) => {
                    tracing::warn!(
                        op = "initialize",
                        metadata_only = report.metadata_only.len(),
                        content_only = report.content_only.len(),
                        unkeyed_entries = report.unkeyed_entries,
                        "metadata document diverges from content; rebuilding it"
                    );
                    true
                }
                Err(err) => {
                    tracing::warn!(
                        op = "initialize",
                        err_code = err.code(),
                        error = %err,
                        "metadata document unreadable; rebuilding it"
                    );
                    true
                }
            };
            if diverged {
                self.rewrite_metadata()?;
            }
        }

        Ok(status)
    }

    /// Persist the full task set
    ///
    /// The metadata document is written first, then every content row is
    /// replaced in one transaction.
    ///
    /// # Errors
    ///
    /// Returns the first `Io`, `Serialization` or `Persistence` error hit.
    pub fn save_all(&mut self, tasks: &[Task]) -> Result<()> {
        let start = Instant::now();
        log_op_start!("save_all", task_count = tasks.len());

        let result = self.run_save_all(tasks);
        finish("save_all", start, result)
    }

    fn run_save_all(&mut self, tasks: &[Task]) -> Result<()> {
        self.ensure_ready()?;
        self.metadata.write(tasks)?;
        let rows = self.content.replace_all(tasks)?;

        if rows != tasks.len() {
            tracing::warn!(
                op = "save_all",
                task_count = tasks.len(),
                row_count = rows,
                "tasks with colliding keys were collapsed"
            );
            // Keep the document keyed like the table
            self.rewrite_metadata()?;
        }
        Ok(())
    }

    /// Reconstruct every stored task
    ///
    /// A missing artifact is a cold start and yields an empty `Complete`.
    /// Rows that cannot be reconstructed are skipped and reported.
    pub fn load_all(&mut self) -> LoadOutcome {
        let start = Instant::now();
        log_op_start!("load_all");

        if !self.has_persisted_data() {
            let duration_ms = start.elapsed().as_millis() as u64;
            log_op_end!("load_all", duration_ms = duration_ms, task_count = 0_u64);
            return LoadOutcome::Complete(Vec::new());
        }

        let rows = match self.ensure_ready().and_then(|()| self.content.select_all()) {
            Ok(rows) => rows,
            Err(err) => {
                let duration_ms = start.elapsed().as_millis() as u64;
                log_op_error!("load_all", err, duration_ms = duration_ms);
                return LoadOutcome::Failed(err);
            }
        };

        let (tasks, skipped) = hydrate_rows(&rows);
        let duration_ms = start.elapsed().as_millis() as u64;
        log_op_end!(
            "load_all",
            duration_ms = duration_ms,
            task_count = tasks.len(),
            skipped_count = skipped.len()
        );

        if skipped.is_empty() {
            LoadOutcome::Complete(tasks)
        } else {
            LoadOutcome::Partial { tasks, skipped }
        }
    }

    /// Overwrite the stored row for this task's key
    ///
    /// Returns `false` when no row had that key; nothing is inserted. The
    /// metadata document is rebuilt from the content table either way.
    ///
    /// # Errors
    ///
    /// Returns `Persistence`, `Io` or `Serialization` errors from either store.
    pub fn update_one(&mut self, task: &Task) -> Result<bool> {
        let start = Instant::now();
        let task_id = derive_key(task);
        log_op_start!("update_one", task_id = task_id.as_str());

        let result = self.run_update_one(task);
        finish("update_one", start, result)
    }

    fn run_update_one(&mut self, task: &Task) -> Result<bool> {
        self.ensure_ready()?;
        let changed = self.content.upsert_one(task)?;
        self.rewrite_metadata()?;
        Ok(changed > 0)
    }

    /// Delete the stored row for this task's key
    ///
    /// Returns `false` when no row had that key. The metadata document is
    /// rebuilt from the content table either way.
    ///
    /// # Errors
    ///
    /// Returns `Persistence`, `Io` or `Serialization` errors from either store.
    pub fn remove_one(&mut self, task: &Task) -> Result<bool> {
        let start = Instant::now();
        let task_id = derive_key(task);
        log_op_start!("remove_one", task_id = task_id.as_str());

        let result = self.run_remove_one(&task_id);
        finish("remove_one", start, result)
    }

    fn run_remove_one(&mut self, task_id: &str) -> Result<bool> {
        self.ensure_ready()?;
        let removed = self.content.delete_one(task_id)?;
        self.rewrite_metadata()?;
        Ok(removed > 0)
    }

    /// Rebuild the metadata document from the content table
    ///
    /// Returns the number of entries written.
    ///
    /// # Errors
    ///
    /// Returns `Persistence`, `Io` or `Serialization` errors.
    pub fn resync_metadata(&mut self) -> Result<usize> {
        let start = Instant::now();
        log_op_start!("resync_metadata");

        let result = self.ensure_ready().and_then(|()| self.rewrite_metadata());
        finish("resync_metadata", start, result)
    }

    /// Compare the keys of the two artifacts
    ///
    /// A missing artifact counts as holding no keys. An existing content
    /// table is run through the schema guard first, which may migrate or
    /// recreate it; [`PersistenceCoordinator::inspect_consistency`] does not.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error for an unparseable metadata document
    /// and `Persistence` errors from the content table.
    pub fn check_consistency(&mut self) -> Result<ConsistencyReport> {
        let start = Instant::now();
        log_op_start!("check_consistency");

        let result = self.run_check_consistency();
        finish("check_consistency", start, result)
    }

    fn run_check_consistency(&mut self) -> Result<ConsistencyReport> {
        if self.content.exists() {
            self.ensure_ready()?;
        }
        self.compare_keys()
    }

    /// Compare the keys of the two artifacts without touching either
    ///
    /// Only meaningful when the content table is current; check
    /// `content().is_current()` first.
    ///
    /// # Errors
    ///
    /// Returns a `Serialization` error for an unparseable metadata document
    /// and a `Persistence` error if the content table cannot be read.
    pub fn inspect_consistency(&self) -> Result<ConsistencyReport> {
        self.compare_keys()
    }

    /// True when both artifacts exist
    pub fn has_persisted_data(&self) -> bool {
        self.metadata.exists() && self.content.exists()
    }

    /// Delete both artifacts and any SQLite side files
    ///
    /// Absent files are fine. The coordinator returns to `Uninitialized`;
    /// the next operation that needs the table recreates it.
    ///
    /// # Errors
    ///
    /// Returns an `Io` error if a present file cannot be deleted.
    pub fn clear_all(&mut self) -> Result<()> {
        let start = Instant::now();
        log_op_start!("clear_all");

        let result = self.run_clear_all();
        finish("clear_all", start, result)
    }

    fn run_clear_all(&mut self) -> Result<()> {
        self.metadata.remove()?;
        remove_if_present(self.content.path())?;
        for suffix in SIDE_FILE_SUFFIXES {
            remove_if_present(&side_file(self.content.path(), suffix))?;
        }
        self.state = EngineState::Uninitialized;
        Ok(())
    }

    fn ensure_ready(&mut self) -> Result<()> {
        if self.state == EngineState::Ready && self.content.exists() {
            return Ok(());
        }
        self.run_guard().map(|_| ())
    }

    fn run_guard(&mut self) -> Result<SchemaStatus> {
        self.ensure_data_dir()?;
        let status = self.content.ensure_schema()?;
        if status.lost_data() {
            tracing::warn!(
                op = "schema_guard",
                status = ?status,
                "stored content rows were discarded"
            );
        }
        self.state = EngineState::Ready;
        Ok(status)
    }

    fn ensure_data_dir(&self) -> Result<()> {
        self.config.validate()?;
        std::fs::create_dir_all(&self.config.data_dir).map_err(|e| io_error("create_data_dir", e))
    }

    fn rewrite_metadata(&self) -> Result<usize> {
        let rows = self.content.select_all()?;
        let entries: Vec<MetadataEntry> = rows.iter().map(MetadataEntry::from).collect();
        self.metadata.write_entries(&entries)?;
        Ok(entries.len())
    }

    fn compare_keys(&self) -> Result<ConsistencyReport> {
        let entries = if self.metadata.exists() {
            self.metadata.read()?
        } else {
            Vec::new()
        };
        let rows = if self.content.exists() {
            self.content.select_all()?
        } else {
            Vec::new()
        };

        let unkeyed_entries = entries.iter().filter(|e| e.task_id.is_none()).count();
        let metadata_keys: BTreeSet<String> =
            entries.into_iter().filter_map(|e| e.task_id).collect();
        let content_keys: BTreeSet<String> = rows.into_iter().filter_map(|r| r.task_id).collect();

        Ok(ConsistencyReport {
            metadata_only: metadata_keys.difference(&content_keys).cloned().collect(),
            content_only: content_keys.difference(&metadata_keys).cloned().collect(),
            unkeyed_entries,
        })
    }
}

fn finish<T>(op: &'static str, start: Instant, result: Result<T>) -> Result<T> {
    let duration_ms = start.elapsed().as_millis() as u64;
    match &result {
        Ok(_) => {
            log_op_end!(op, duration_ms = duration_ms);
        }
        Err(err) => {
            log_op_error!(op, *err, duration_ms = duration_ms);
        }
    }
    result
}

fn side_file(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn remove_if_present(path: &Path) -> Result<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(io_error("clear_all", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskvault_core::errors::ExErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_new_is_uninitialized_and_lazy() {
        let dir = TempDir::new().unwrap();
        let coordinator = PersistenceCoordinator::new(StoreConfig::in_dir(dir.path()));

        assert_eq!(coordinator.state(), EngineState::Uninitialized);
        assert!(!coordinator.content().exists());
        assert!(!coordinator.has_persisted_data());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let mut coordinator = PersistenceCoordinator::new(StoreConfig::in_dir(dir.path()));

        assert_eq!(coordinator.initialize().unwrap(), SchemaStatus::Created);
        assert_eq!(coordinator.initialize().unwrap(), SchemaStatus::Current);
        assert_eq!(coordinator.state(), EngineState::Ready);
    }

    #[test]
    fn test_initialize_creates_nested_data_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");

        let coordinator = PersistenceCoordinator::open(StoreConfig::in_dir(&nested)).unwrap();

        assert!(coordinator.content().exists());
    }

    #[test]
    fn test_side_file_appends_suffix() {
        let path = side_file(Path::new("/data/tasks_content.db"), "-journal");
        assert_eq!(path, PathBuf::from("/data/tasks_content.db-journal"));
    }

    #[test]
    fn test_load_outcome_accessors() {
        let failed = LoadOutcome::Failed(ExError::new(ExErrorKind::Persistence));
        assert!(failed.is_failed());
        assert!(failed.tasks().is_empty());
        assert_eq!(
            failed.error().map(|e| e.kind()),
            Some(ExErrorKind::Persistence)
        );
        assert!(failed.into_result().is_err());

        let empty = LoadOutcome::Complete(Vec::new());
        assert!(empty.is_complete());
        assert_eq!(empty.skipped_count(), 0);
    }

    #[test]
    fn test_consistency_report_flags_unkeyed_entries() {
        let report = ConsistencyReport {
            unkeyed_entries: 1,
            ..ConsistencyReport::default()
        };
        assert!(!report.is_consistent());
        assert!(ConsistencyReport::default().is_consistent());
    }
}
