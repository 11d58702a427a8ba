//! Current generation of the `TaskContent` table

/// Content table name
pub const CONTENT_TABLE: &str = "TaskContent";

/// Columns a row cannot be identified without; a table missing any of them
/// cannot be migrated in place.
pub const IDENTITY_COLUMNS: [&str; 3] = ["TaskId", "TaskType", "Name"];

/// One column of the content table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
    /// Constraint or default written after the type in `CREATE TABLE`
    pub create_clause: &'static str,
}

impl ColumnDef {
    /// Column definition for `ALTER TABLE ... ADD COLUMN`
    ///
    /// Keys and `NOT NULL` cannot be added to a populated table, so only a
    /// `DEFAULT` clause is carried over. Existing rows read that default.
    pub fn add_column_sql(&self) -> String {
        if self.create_clause.starts_with("DEFAULT") {
            format!("{} {} {}", self.name, self.sql_type, self.create_clause)
        } else {
            format!("{} {}", self.name, self.sql_type)
        }
    }
}

const fn col(name: &'static str, sql_type: &'static str, create_clause: &'static str) -> ColumnDef {
    ColumnDef {
        name,
        sql_type,
        create_clause,
    }
}

/// Column order is the bind order for inserts and the read order for selects.
pub const COLUMNS: [ColumnDef; 18] = [
    col("TaskId", "TEXT", "PRIMARY KEY"),
    col("TaskType", "TEXT", "NOT NULL"),
    col("Name", "TEXT", "NOT NULL"),
    col("Description", "TEXT", ""),
    col("DifficultyLevel", "TEXT", ""),
    col("CreationDate", "TEXT", ""),
    col("DueDate", "TEXT", ""),
    col("IsCompleted", "INTEGER", "DEFAULT 0"),
    // Work
    col("Project", "TEXT", ""),
    col("Priority", "TEXT", ""),
    // Personal
    col("Category", "TEXT", ""),
    col("IsUrgent", "INTEGER", "DEFAULT 0"),
    // Study
    col("Subject", "TEXT", ""),
    col("StudyHours", "INTEGER", "DEFAULT 0"),
    col("StudyMethod", "TEXT", ""),
    // Health
    col("ActivityType", "TEXT", ""),
    col("Duration", "INTEGER", "DEFAULT 0"),
    col("Location", "TEXT", ""),
];

/// Comma-separated column names in table order
pub fn column_list() -> String {
    COLUMNS
        .iter()
        .map(|c| c.name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// DDL for the current generation
pub fn create_table_sql() -> String {
    let body = COLUMNS
        .iter()
        .map(|c| {
            if c.create_clause.is_empty() {
                format!("    {} {}", c.name, c.sql_type)
            } else {
                format!("    {} {} {}", c.name, c.sql_type, c.create_clause)
            }
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", CONTENT_TABLE, body)
}
