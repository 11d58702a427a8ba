// Integration tests for save/load round trips through both artifacts

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use taskvault_core::{derive_key, Task, TaskDetails, TaskKind};
use taskvault_store::{LoadOutcome, PersistenceCoordinator, StoreConfig};
use tempfile::TempDir;

fn t0() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 1)
        .and_then(|d| d.and_hms_milli_opt(9, 30, 15, 750))
        .unwrap()
}

fn open(dir: &TempDir) -> PersistenceCoordinator {
    PersistenceCoordinator::open(StoreConfig::in_dir(dir.path())).unwrap()
}

fn one_of_each() -> Vec<Task> {
    let due = t0() + Duration::days(10);
    let mut personal = Task::new(
        "Dentist",
        "Book a cleaning",
        "Easy",
        t0(),
        due,
        TaskDetails::personal("Health admin", true),
    )
    .unwrap();
    personal.mark_completed();

    vec![
        Task::new(
            "Deploy",
            "Ship release 2.1",
            "Hard",
            t0(),
            due,
            TaskDetails::work("Platform", "High"),
        )
        .unwrap(),
        personal,
        Task::new(
            "Review",
            "Chapter 3 exercises",
            "Medium",
            t0(),
            due,
            TaskDetails::study("Math", 5, "Flashcards"),
        )
        .unwrap(),
        Task::new(
            "Run",
            "Morning run",
            "Medium",
            t0(),
            due,
            TaskDetails::health("Running", 45, "Park"),
        )
        .unwrap(),
    ]
}

#[test]
fn test_study_task_round_trip() {
    // Given: One saved study task
    let dir = TempDir::new().unwrap();
    let mut coordinator = open(&dir);
    let review = Task::new(
        "Review",
        "Chapter 3 exercises",
        "Medium",
        t0(),
        t0() + Duration::days(10),
        TaskDetails::study("Math", 5, "Flashcards"),
    )
    .unwrap();
    coordinator.save_all(std::slice::from_ref(&review)).unwrap();

    // When: A fresh coordinator reloads
    let mut reopened = open(&dir);
    let outcome = reopened.load_all();

    // Then: The study variant comes back with its fields
    assert!(outcome.is_complete());
    let tasks = outcome.into_tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].kind(), TaskKind::Study);
    match &tasks[0].details {
        TaskDetails::Study {
            subject,
            study_hours,
            ..
        } => {
            assert_eq!(subject, "Math");
            assert_eq!(*study_hours, 5);
        }
        other => panic!("expected study details, got {:?}", other),
    }
    assert_eq!(tasks[0], review);
}

#[test]
fn test_every_variant_round_trips() {
    // Given: One task of each variant, one of them completed
    let dir = TempDir::new().unwrap();
    let mut coordinator = open(&dir);
    let tasks = one_of_each();

    // When: Saved and reloaded
    coordinator.save_all(&tasks).unwrap();
    let loaded = coordinator.load_all().into_tasks();

    // Then: Every field matches at second precision, in save order
    assert_eq!(loaded, tasks);
    assert!(loaded[1].is_completed);
    assert_eq!(loaded[0].creation_date.nanosecond(), 0);
}

#[test]
fn test_repeated_save_has_one_row_per_task() {
    // Given: A task set saved once
    let dir = TempDir::new().unwrap();
    let mut coordinator = open(&dir);
    let tasks = one_of_each();
    coordinator.save_all(&tasks).unwrap();

    // When: The same set is saved again
    coordinator.save_all(&tasks).unwrap();

    // Then: No duplicates appear
    assert_eq!(coordinator.content().count().unwrap(), tasks.len());
    assert_eq!(coordinator.load_all().tasks().len(), tasks.len());
}

#[test]
fn test_save_replaces_previous_snapshot() {
    // Given: Four saved tasks
    let dir = TempDir::new().unwrap();
    let mut coordinator = open(&dir);
    let tasks = one_of_each();
    coordinator.save_all(&tasks).unwrap();

    // When: Only the first two are saved
    coordinator.save_all(&tasks[..2]).unwrap();

    // Then: The others are gone from both artifacts
    assert_eq!(coordinator.load_all().into_tasks(), tasks[..2].to_vec());
    assert_eq!(coordinator.metadata().read().unwrap().len(), 2);
}

#[test]
fn test_cold_start_is_empty_not_failure() {
    // Given: An empty directory
    let dir = TempDir::new().unwrap();
    let mut coordinator = PersistenceCoordinator::new(StoreConfig::in_dir(dir.path()));

    // When: Loading without any artifacts
    let outcome = coordinator.load_all();

    // Then: Complete and empty, and nothing was created
    assert!(matches!(outcome, LoadOutcome::Complete(ref t) if t.is_empty()));
    assert!(!coordinator.has_persisted_data());
    assert!(!coordinator.content().exists());
}

#[test]
fn test_metadata_document_mirrors_saved_tasks() {
    // Given: Saved tasks
    let dir = TempDir::new().unwrap();
    let mut coordinator = open(&dir);
    let tasks = one_of_each();
    coordinator.save_all(&tasks).unwrap();

    // When: Reading the metadata document directly
    let entries = coordinator.metadata().read().unwrap();

    // Then: One summary per task, keyed by the derived identity
    let keys: Vec<_> = entries.iter().filter_map(|e| e.task_id.clone()).collect();
    let expected: Vec<_> = tasks.iter().map(derive_key).collect();
    assert_eq!(keys, expected);
    assert_eq!(entries[3].task_type.as_deref(), Some("Saúde"));
    assert_eq!(entries[0].creation_date.as_deref(), Some("2024-03-01 09:30:15"));
    assert!(entries[1].is_completed);
}

#[test]
fn test_colliding_keys_collapse_to_last() {
    // Given: Two work tasks with the same name and creation second
    let dir = TempDir::new().unwrap();
    let mut coordinator = open(&dir);
    let first = Task::new(
        "Deploy",
        "first",
        "Easy",
        t0(),
        t0(),
        TaskDetails::work("A", "Low"),
    )
    .unwrap();
    let second = Task::new(
        "Deploy",
        "second",
        "Hard",
        t0(),
        t0(),
        TaskDetails::work("B", "High"),
    )
    .unwrap();

    // When: Both are saved
    coordinator.save_all(&[first, second.clone()]).unwrap();

    // Then: One row survives, the later one, and metadata agrees
    assert_eq!(coordinator.load_all().into_tasks(), vec![second]);
    assert_eq!(coordinator.metadata().read().unwrap().len(), 1);
    assert!(coordinator.check_consistency().unwrap().is_consistent());
}
