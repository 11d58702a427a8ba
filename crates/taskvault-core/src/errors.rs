use thiserror::Error;

/// Result type alias using TaskVaultError
pub type Result<T> = std::result::Result<T, TaskVaultError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers and tests can match on
/// without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    InvalidName,
    NotFound,

    // Persisted data
    /// Stored type tag is outside the closed variant set
    UnknownTaskType,
    /// A stored row cannot be turned back into a record
    MalformedRow,
    /// The relational table does not match the current column set
    SchemaMismatch,

    // Integration/IO
    Io,
    Serialization,
    Persistence,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidName => "ERR_INVALID_NAME",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::UnknownTaskType => "ERR_UNKNOWN_TASK_TYPE",
            ExErrorKind::MalformedRow => "ERR_MALFORMED_ROW",
            ExErrorKind::SchemaMismatch => "ERR_SCHEMA_MISMATCH",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus optional
/// context (operation, record key, field) for debugging.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    task_id: Option<String>,
    field: Option<String>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            task_id: None,
            field: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add record key context
    pub fn with_task_id(mut self, id: impl Into<String>) -> Self {
        self.task_id = Some(id.into());
        self
    }

    /// Add column/field context
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the record key context, if any
    pub fn task_id(&self) -> Option<&str> {
        self.task_id.as_deref()
    }

    /// Get the field context, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(task_id) = &self.task_id {
            write!(f, " (task_id: {})", task_id)?;
        }
        if let Some(field) = &self.field {
            write!(f, " (field: {})", field)?;
        }
        if let Some(source) = &self.source {
            write!(f, " caused by {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain errors raised by the record model and row reconstruction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TaskVaultError {
    /// Task name is empty or whitespace-only
    #[error("Invalid task name: {reason}")]
    InvalidName { reason: String },

    /// Type tag is not one of the known variants
    #[error("Unknown task type tag: {tag:?}")]
    UnknownTaskType { tag: String },

    /// Persisted timestamp text could not be parsed
    #[error("Malformed timestamp in {field}: {value:?}")]
    MalformedTimestamp { field: String, value: String },

    /// A required persisted field is missing or blank
    #[error("Required field {field} is blank")]
    BlankField { field: String },

    /// A count-like field holds a value outside `0..=u32::MAX`
    #[error("Field {field} out of range: {value}")]
    OutOfRange { field: String, value: i64 },
}

impl From<TaskVaultError> for ExError {
    fn from(err: TaskVaultError) -> Self {
        let message = err.to_string();
        match err {
            TaskVaultError::InvalidName { .. } => {
                ExError::new(ExErrorKind::InvalidName).with_message(message)
            }
            TaskVaultError::UnknownTaskType { .. } => ExError::new(ExErrorKind::UnknownTaskType)
                .with_field("TaskType")
                .with_message(message),
            TaskVaultError::MalformedTimestamp { field, .. } => {
                ExError::new(ExErrorKind::MalformedRow)
                    .with_field(field)
                    .with_message(message)
            }
            TaskVaultError::BlankField { field } => ExError::new(ExErrorKind::MalformedRow)
                .with_field(field)
                .with_message(message),
            TaskVaultError::OutOfRange { field, .. } => {
                ExError::new(ExErrorKind::MalformedRow)
                    .with_field(field)
                    .with_message(message)
            }
        }
    }
}
