use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TaskVaultError};

/// Closed set of task variants
///
/// The persisted tag for each variant is fixed: it is written to both stores
/// and drives reconstruction on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TaskKind {
    Work,
    Personal,
    Study,
    Health,
}

impl TaskKind {
    /// All variants, in tag order
    pub const ALL: [TaskKind; 4] = [
        TaskKind::Work,
        TaskKind::Personal,
        TaskKind::Study,
        TaskKind::Health,
    ];

    /// Persisted type tag
    pub fn tag(&self) -> &'static str {
        match self {
            TaskKind::Work => "Trabalho",
            TaskKind::Personal => "Pessoal",
            TaskKind::Study => "Estudo",
            TaskKind::Health => "Saúde",
        }
    }

    /// Resolve a persisted type tag
    ///
    /// # Errors
    ///
    /// Returns `UnknownTaskType` for any tag outside the closed set.
    pub fn from_tag(tag: &str) -> Result<Self> {
        match tag {
            "Trabalho" => Ok(TaskKind::Work),
            "Pessoal" => Ok(TaskKind::Personal),
            "Estudo" => Ok(TaskKind::Study),
            "Saúde" => Ok(TaskKind::Health),
            other => Err(TaskVaultError::UnknownTaskType {
                tag: other.to_string(),
            }),
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            TaskKind::Work => "Work",
            TaskKind::Personal => "Personal",
            TaskKind::Study => "Study",
            TaskKind::Health => "Health",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_resolve_back_to_kind() {
        for kind in TaskKind::ALL {
            assert_eq!(TaskKind::from_tag(kind.tag()), Ok(kind));
        }
    }

    #[test]
    fn test_unknown_tag_rejected() {
        let err = TaskKind::from_tag("Lazer").unwrap_err();
        assert_eq!(
            err,
            TaskVaultError::UnknownTaskType {
                tag: "Lazer".to_string()
            }
        );
    }

    #[test]
    fn test_tag_match_is_exact() {
        assert!(TaskKind::from_tag("trabalho").is_err());
        assert!(TaskKind::from_tag(" Estudo").is_err());
        assert!(TaskKind::from_tag("").is_err());
    }
}
