use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::kind::TaskKind;
use super::timestamp::{format_timestamp, truncate_to_second};
use crate::errors::{Result, TaskVaultError};

/// Variant-specific fields
///
/// Exactly one arm is populated per record, so a record can never carry
/// fields from two variants at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskDetails {
    Work {
        project: String,
        priority: String,
    },
    Personal {
        category: String,
        is_urgent: bool,
    },
    Study {
        subject: String,
        study_hours: u32,
        study_method: String,
    },
    Health {
        activity_type: String,
        /// Minutes
        duration: u32,
        location: String,
    },
}

impl TaskDetails {
    pub fn work(project: impl Into<String>, priority: impl Into<String>) -> Self {
        TaskDetails::Work {
            project: project.into(),
            priority: priority.into(),
        }
    }

    pub fn personal(category: impl Into<String>, is_urgent: bool) -> Self {
        TaskDetails::Personal {
            category: category.into(),
            is_urgent,
        }
    }

    pub fn study(
        subject: impl Into<String>,
        study_hours: u32,
        study_method: impl Into<String>,
    ) -> Self {
        TaskDetails::Study {
            subject: subject.into(),
            study_hours,
            study_method: study_method.into(),
        }
    }

    pub fn health(
        activity_type: impl Into<String>,
        duration: u32,
        location: impl Into<String>,
    ) -> Self {
        TaskDetails::Health {
            activity_type: activity_type.into(),
            duration,
            location: location.into(),
        }
    }

    /// The variant these fields belong to
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskDetails::Work { .. } => TaskKind::Work,
            TaskDetails::Personal { .. } => TaskKind::Personal,
            TaskDetails::Study { .. } => TaskKind::Study,
            TaskDetails::Health { .. } => TaskKind::Health,
        }
    }
}

/// A persisted unit of work
///
/// Common fields live here; the variant's extra fields live in `details`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Human identifier, never blank
    pub name: String,

    pub description: String,

    /// Free-text difficulty label (e.g. "Medium")
    pub difficulty_level: String,

    /// Whole-second creation time; part of the identity key
    pub creation_date: NaiveDateTime,

    pub due_date: NaiveDateTime,

    pub is_completed: bool,

    pub details: TaskDetails,
}

impl Task {
    /// Create a new pending task
    ///
    /// Timestamps are truncated to whole seconds, the precision they survive
    /// persistence with.
    ///
    /// # Errors
    ///
    /// Returns `InvalidName` if `name` is empty or whitespace-only.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        difficulty_level: impl Into<String>,
        creation_date: NaiveDateTime,
        due_date: NaiveDateTime,
        details: TaskDetails,
    ) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(TaskVaultError::InvalidName {
                reason: "Task name cannot be empty".to_string(),
            });
        }

        Ok(Self {
            name,
            description: description.into(),
            difficulty_level: difficulty_level.into(),
            creation_date: truncate_to_second(creation_date),
            due_date: truncate_to_second(due_date),
            is_completed: false,
            details,
        })
    }

    pub fn kind(&self) -> TaskKind {
        self.details.kind()
    }

    /// Persisted type tag
    pub fn type_tag(&self) -> &'static str {
        self.kind().tag()
    }

    pub fn mark_completed(&mut self) {
        self.is_completed = true;
        match &self.details {
            TaskDetails::Work { project, .. } => {
                tracing::info!(task = %self.name, kind = %self.kind(), project = %project, "task completed");
            }
            TaskDetails::Personal { category, is_urgent } => {
                tracing::info!(task = %self.name, kind = %self.kind(), category = %category, is_urgent, "task completed");
            }
            TaskDetails::Study {
                subject,
                study_hours,
                ..
            } => {
                tracing::info!(task = %self.name, kind = %self.kind(), subject = %subject, study_hours, "task completed");
            }
            TaskDetails::Health {
                activity_type,
                duration,
                location,
            } => {
                tracing::info!(
                    task = %self.name,
                    kind = %self.kind(),
                    activity_type = %activity_type,
                    duration,
                    location = %location,
                    "task completed"
                );
            }
        }
    }

    pub fn mark_pending(&mut self) {
        self.is_completed = false;
        tracing::info!(task = %self.name, kind = %self.kind(), "task marked pending");
    }

    /// Multi-line summary of the variant's own fields
    pub fn describe_variant_fields(&self) -> String {
        match &self.details {
            TaskDetails::Work { project, priority } => {
                format!("Project: {}\nPriority: {}\n", project, priority)
            }
            TaskDetails::Personal {
                category,
                is_urgent,
            } => format!(
                "Category: {}\nUrgent: {}\n",
                category,
                if *is_urgent { "Yes" } else { "No" }
            ),
            TaskDetails::Study {
                subject,
                study_hours,
                study_method,
            } => format!(
                "Subject: {}\nStudy hours: {}\nMethod: {}\n",
                subject, study_hours, study_method
            ),
            TaskDetails::Health {
                activity_type,
                duration,
                location,
            } => format!(
                "Activity: {}\nDuration: {} minutes\nLocation: {}\n",
                activity_type, duration, location
            ),
        }
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Type: {}", self.kind())?;
        writeln!(f, "Name: {}", self.name)?;
        writeln!(f, "Description: {}", self.description)?;
        writeln!(f, "Difficulty: {}", self.difficulty_level)?;
        writeln!(f, "Created: {}", format_timestamp(&self.creation_date))?;
        writeln!(f, "Due: {}", format_timestamp(&self.due_date))?;
        writeln!(
            f,
            "Status: {}",
            if self.is_completed {
                "Completed"
            } else {
                "Pending"
            }
        )?;
        f.write_str(&self.describe_variant_fields())
    }
}
