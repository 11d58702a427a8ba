// Integration tests for opening stores written under older column sets

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use taskvault_core::{Task, TaskDetails, TaskKind};
use taskvault_store::schema::list_events;
use taskvault_store::{PersistenceCoordinator, SchemaStatus, StoreConfig};
use tempfile::TempDir;

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 11, 2)
        .and_then(|d| d.and_hms_opt(14, 0, 0))
        .unwrap()
}

fn seed_database(dir: &TempDir, sql: &str) -> StoreConfig {
    let config = StoreConfig::in_dir(dir.path());
    let conn = Connection::open(config.content_path()).unwrap();
    conn.execute_batch(sql).unwrap();
    config
}

#[test]
fn test_additive_upgrade_keeps_rows() {
    // Given: A table from before the health columns existed, holding one row
    let dir = TempDir::new().unwrap();
    let config = seed_database(
        &dir,
        "CREATE TABLE TaskContent (
            TaskId TEXT PRIMARY KEY,
            TaskType TEXT NOT NULL,
            Name TEXT NOT NULL,
            Description TEXT,
            DifficultyLevel TEXT,
            CreationDate TEXT,
            DueDate TEXT,
            IsCompleted INTEGER DEFAULT 0,
            Project TEXT,
            Priority TEXT,
            Category TEXT,
            IsUrgent INTEGER DEFAULT 0,
            Subject TEXT,
            StudyHours INTEGER DEFAULT 0,
            StudyMethod TEXT
        );
        INSERT INTO TaskContent VALUES (
            'Estudo_Review_20231102140000', 'Estudo', 'Review', 'Ch. 3', 'Medium',
            '2023-11-02 14:00:00', '2023-11-12 14:00:00', 0,
            NULL, NULL, NULL, NULL, 'Math', 5, 'Flashcards'
        );",
    );

    // When: Initializing
    let mut coordinator = PersistenceCoordinator::new(config);
    let status = coordinator.initialize().unwrap();

    // Then: The missing columns were added and the row still loads
    assert_eq!(
        status,
        SchemaStatus::Migrated {
            added: vec![
                "ActivityType".to_string(),
                "Duration".to_string(),
                "Location".to_string()
            ]
        }
    );
    std::fs::write(coordinator.metadata().path(), "[]").unwrap();
    let tasks = coordinator.load_all().into_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].details, TaskDetails::study("Math", 5, "Flashcards"));
}

#[test]
fn test_untagged_generation_is_recreated_and_usable() {
    // Given: A table from the generation without type tags
    let dir = TempDir::new().unwrap();
    let config = seed_database(
        &dir,
        "CREATE TABLE TaskContent (
            TaskId TEXT PRIMARY KEY,
            Name TEXT NOT NULL,
            Description TEXT,
            DifficultyLevel TEXT,
            CreationDate TEXT,
            DueDate TEXT,
            IsCompleted INTEGER DEFAULT 0
        );
        INSERT INTO TaskContent VALUES ('Old_1', 'Old', '', 'Easy', '2020-01-01 00:00:00', '2020-01-02 00:00:00', 0);",
    );

    // When: Initializing
    let mut coordinator = PersistenceCoordinator::new(config.clone());
    let status = coordinator.initialize().unwrap();

    // Then: The table was rebuilt, reporting the discarded row
    assert_eq!(status, SchemaStatus::Recreated { discarded_rows: 1 });

    // And: Saving and loading work against the new column set
    let task = Task::new(
        "Walk",
        "Evening walk",
        "Easy",
        t0(),
        t0(),
        TaskDetails::health("Walking", 20, "Beach"),
    )
    .unwrap();
    coordinator.save_all(std::slice::from_ref(&task)).unwrap();
    let loaded = coordinator.load_all().into_tasks();
    assert_eq!(loaded, vec![task]);
    assert_eq!(loaded[0].kind(), TaskKind::Health);

    // And: The ledger records the repair
    let conn = Connection::open(config.content_path()).unwrap();
    let events = list_events(&conn).unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].action, "recreated");
    assert_eq!(events[0].checksum.len(), 64);
}

#[test]
fn test_guard_reruns_after_clear_all() {
    // Given: A ready coordinator whose artifacts were cleared
    let dir = TempDir::new().unwrap();
    let mut coordinator = PersistenceCoordinator::open(StoreConfig::in_dir(dir.path())).unwrap();
    coordinator.clear_all().unwrap();

    // When: Saving after clear_all
    let task = Task::new(
        "Plan",
        "",
        "Easy",
        t0(),
        t0(),
        TaskDetails::personal("Home", false),
    )
    .unwrap();
    coordinator.save_all(std::slice::from_ref(&task)).unwrap();

    // Then: The table was recreated lazily
    assert_eq!(coordinator.load_all().into_tasks(), vec![task]);
}
