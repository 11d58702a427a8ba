//! Hydration layer - turns raw content rows back into tasks
//!
//! Dispatch is an exhaustive match over the stored type tag. Rows that cannot
//! be reconstructed are reported as `SkippedRow` rather than aborting the load.

use crate::content::ContentRow;
use taskvault_core::errors::{ExError, ExErrorKind, TaskVaultError};
use taskvault_core::model::parse_timestamp;
use taskvault_core::{Task, TaskDetails, TaskKind};

/// A row left out of a load, with the reason
#[derive(Debug, Clone)]
pub struct SkippedRow {
    pub task_id: Option<String>,
    pub error: ExError,
}

/// Reconstruct one task from its row
///
/// Checks run in a fixed order: blank name, blank creation date, blank due
/// date, type tag, timestamp text, then variant numeric ranges. Missing
/// variant columns read as empty text or zero.
///
/// # Errors
///
/// Returns the first check that fails.
pub fn task_from_row(row: &ContentRow) -> Result<Task, TaskVaultError> {
    let name = required(&row.name, "Name")?;
    let creation_text = required(&row.creation_date, "CreationDate")?;
    let due_text = required(&row.due_date, "DueDate")?;

    let kind = TaskKind::from_tag(row.task_type.as_deref().unwrap_or_default())?;

    let creation_date = parse_timestamp("CreationDate", creation_text)?;
    let due_date = parse_timestamp("DueDate", due_text)?;

    let details = match kind {
        TaskKind::Work => TaskDetails::work(text(&row.project), text(&row.priority)),
        TaskKind::Personal => {
            TaskDetails::personal(text(&row.category), row.is_urgent.unwrap_or(0) != 0)
        }
        TaskKind::Study => TaskDetails::study(
            text(&row.subject),
            unsigned(row.study_hours, "StudyHours")?,
            text(&row.study_method),
        ),
        TaskKind::Health => TaskDetails::health(
            text(&row.activity_type),
            unsigned(row.duration, "Duration")?,
            text(&row.location),
        ),
    };

    let mut task = Task::new(
        name,
        text(&row.description),
        text(&row.difficulty_level),
        creation_date,
        due_date,
        details,
    )?;
    task.is_completed = row.is_completed.unwrap_or(0) != 0;

    Ok(task)
}

/// Reconstruct every row, collecting the ones that fail
///
/// Order of the returned tasks follows the order of `rows`.
pub fn hydrate_rows(rows: &[ContentRow]) -> (Vec<Task>, Vec<SkippedRow>) {
    let mut tasks = Vec::with_capacity(rows.len());
    let mut skipped = Vec::new();

    for row in rows {
        match task_from_row(row) {
            Ok(task) => tasks.push(task),
            Err(err) => {
                let mut error = ExError::from(err).with_op("load_all");
                if let Some(id) = &row.task_id {
                    error = error.with_task_id(id.clone());
                }

                log_skipped(row.task_id.as_deref(), &error);

                skipped.push(SkippedRow {
                    task_id: row.task_id.clone(),
                    error,
                });
            }
        }
    }

    (tasks, skipped)
}

/// Unknown tags are logged at `error`, damaged rows of a known type at `warn`
fn log_skipped(task_id: Option<&str>, error: &ExError) {
    let task_id = task_id.unwrap_or("<none>");
    if error.kind() == ExErrorKind::UnknownTaskType {
        tracing::error!(
            op = "load_all",
            task_id,
            err_code = error.code(),
            error = %error,
            "dropping content row with unknown task type"
        );
    } else {
        tracing::warn!(
            op = "load_all",
            task_id,
            err_code = error.code(),
            error = %error,
            "skipping unreadable content row"
        );
    }
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, TaskVaultError> {
    match value.as_deref() {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(TaskVaultError::BlankField {
            field: field.to_string(),
        }),
    }
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn unsigned(value: Option<i64>, field: &str) -> Result<u32, TaskVaultError> {
    let raw = value.unwrap_or(0);
    u32::try_from(raw).map_err(|_| TaskVaultError::OutOfRange {
        field: field.to_string(),
        value: raw,
    })
}
