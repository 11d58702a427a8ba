use taskvault_core::errors::{ExError, ExErrorKind, TaskVaultError};

#[test]
fn test_unknown_type_maps_to_stable_code() {
    let ex_err: ExError = TaskVaultError::UnknownTaskType {
        tag: "Lazer".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::UnknownTaskType);
    assert_eq!(ex_err.code(), "ERR_UNKNOWN_TASK_TYPE");
    assert_eq!(ex_err.field(), Some("TaskType"));
    assert!(ex_err.message().contains("Lazer"));
}

#[test]
fn test_row_problems_are_malformed_row() {
    let cases = vec![
        TaskVaultError::MalformedTimestamp {
            field: "DueDate".to_string(),
            value: "soon".to_string(),
        },
        TaskVaultError::BlankField {
            field: "Name".to_string(),
        },
        TaskVaultError::OutOfRange {
            field: "StudyHours".to_string(),
            value: -2,
        },
    ];

    for err in cases {
        let ex_err: ExError = err.into();
        assert_eq!(ex_err.kind(), ExErrorKind::MalformedRow);
        assert!(ex_err.field().is_some());
    }
}

#[test]
fn test_invalid_name_distinct_from_invalid_input() {
    let ex_err: ExError = TaskVaultError::InvalidName {
        reason: "Task name cannot be empty".to_string(),
    }
    .into();

    assert_eq!(ex_err.kind(), ExErrorKind::InvalidName);
    assert_ne!(ex_err.kind(), ExErrorKind::InvalidInput);
    assert_eq!(ex_err.code(), "ERR_INVALID_NAME");
}

#[test]
fn test_error_codes_are_unique() {
    let kinds = [
        ExErrorKind::InvalidInput,
        ExErrorKind::InvalidName,
        ExErrorKind::NotFound,
        ExErrorKind::UnknownTaskType,
        ExErrorKind::MalformedRow,
        ExErrorKind::SchemaMismatch,
        ExErrorKind::Io,
        ExErrorKind::Serialization,
        ExErrorKind::Persistence,
        ExErrorKind::Internal,
    ];

    let mut codes: Vec<&str> = kinds.iter().map(|k| k.code()).collect();
    codes.sort();
    codes.dedup();
    assert_eq!(codes.len(), kinds.len());
    assert!(codes.iter().all(|c| c.starts_with("ERR_")));
}
