//! Raw content rows
//!
//! `ContentRow` is exactly what the table holds, with no type reconstruction.
//! Reads are lenient about SQLite storage classes so one oddly typed cell
//! does not fail the whole select.

use rusqlite::types::ValueRef;
use rusqlite::Row;
use taskvault_core::model::format_timestamp;
use taskvault_core::{derive_key, Task, TaskDetails};

/// One `TaskContent` row, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRow {
    pub task_id: Option<String>,
    pub task_type: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub difficulty_level: Option<String>,
    pub creation_date: Option<String>,
    pub due_date: Option<String>,
    pub is_completed: Option<i64>,
    pub project: Option<String>,
    pub priority: Option<String>,
    pub category: Option<String>,
    pub is_urgent: Option<i64>,
    pub subject: Option<String>,
    pub study_hours: Option<i64>,
    pub study_method: Option<String>,
    pub activity_type: Option<String>,
    pub duration: Option<i64>,
    pub location: Option<String>,
}

impl ContentRow {
    /// Row for a task; columns of other variants stay NULL
    pub fn from_task(task: &Task) -> Self {
        let mut row = ContentRow {
            task_id: Some(derive_key(task)),
            task_type: Some(task.type_tag().to_string()),
            name: Some(task.name.clone()),
            description: Some(task.description.clone()),
            difficulty_level: Some(task.difficulty_level.clone()),
            creation_date: Some(format_timestamp(&task.creation_date)),
            due_date: Some(format_timestamp(&task.due_date)),
            is_completed: Some(i64::from(task.is_completed)),
            ..ContentRow::default()
        };

        match &task.details {
            TaskDetails::Work { project, priority } => {
                row.project = Some(project.clone());
                row.priority = Some(priority.clone());
            }
            TaskDetails::Personal {
                category,
                is_urgent,
            } => {
                row.category = Some(category.clone());
                row.is_urgent = Some(i64::from(*is_urgent));
            }
            TaskDetails::Study {
                subject,
                study_hours,
                study_method,
            } => {
                row.subject = Some(subject.clone());
                row.study_hours = Some(i64::from(*study_hours));
                row.study_method = Some(study_method.clone());
            }
            TaskDetails::Health {
                activity_type,
                duration,
                location,
            } => {
                row.activity_type = Some(activity_type.clone());
                row.duration = Some(i64::from(*duration));
                row.location = Some(location.clone());
            }
        }

        row
    }

    /// Read a row selected with `schema::column_list()`
    pub(crate) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(ContentRow {
            task_id: text(row, 0)?,
            task_type: text(row, 1)?,
            name: text(row, 2)?,
            description: text(row, 3)?,
            difficulty_level: text(row, 4)?,
            creation_date: text(row, 5)?,
            due_date: text(row, 6)?,
            is_completed: integer(row, 7)?,
            project: text(row, 8)?,
            priority: text(row, 9)?,
            category: text(row, 10)?,
            is_urgent: integer(row, 11)?,
            subject: text(row, 12)?,
            study_hours: integer(row, 13)?,
            study_method: text(row, 14)?,
            activity_type: text(row, 15)?,
            duration: integer(row, 16)?,
            location: text(row, 17)?,
        })
    }

    /// Values in column order, for binding to an INSERT
    pub(crate) fn params(&self) -> [&dyn rusqlite::ToSql; 18] {
        [
            &self.task_id,
            &self.task_type,
            &self.name,
            &self.description,
            &self.difficulty_level,
            &self.creation_date,
            &self.due_date,
            &self.is_completed,
            &self.project,
            &self.priority,
            &self.category,
            &self.is_urgent,
            &self.subject,
            &self.study_hours,
            &self.study_method,
            &self.activity_type,
            &self.duration,
            &self.location,
        ]
    }
}

fn text(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Null => None,
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            Some(String::from_utf8_lossy(bytes).into_owned())
        }
        ValueRef::Integer(i) => Some(i.to_string()),
        ValueRef::Real(f) => Some(f.to_string()),
    })
}

fn integer(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<i64>> {
    Ok(match row.get_ref(idx)? {
        ValueRef::Integer(i) => Some(i),
        // REAL truncates toward zero
        ValueRef::Real(f) => Some(f as i64),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok()),
        ValueRef::Null | ValueRef::Blob(_) => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_from_task_nulls_other_variants() {
        let t = NaiveDate::from_ymd_opt(2024, 2, 29)
            .and_then(|d| d.and_hms_opt(23, 59, 59))
            .unwrap();
        let mut task = Task::new(
            "Yoga",
            "Morning flow",
            "Easy",
            t,
            t,
            TaskDetails::health("Yoga", 45, "Studio"),
        )
        .unwrap();
        task.mark_completed();

        let row = ContentRow::from_task(&task);

        assert_eq!(row.task_id.as_deref(), Some("Saúde_Yoga_20240229235959"));
        assert_eq!(row.creation_date.as_deref(), Some("2024-02-29 23:59:59"));
        assert_eq!(row.is_completed, Some(1));
        assert_eq!(row.duration, Some(45));
        assert_eq!(row.project, None);
        assert_eq!(row.is_urgent, None);
        assert_eq!(row.study_hours, None);
    }
}
