//! Record model
//!
//! `Task` holds the fields every record shares; `TaskDetails` holds exactly
//! one variant's extra fields, and `TaskKind` names the variant.

pub mod kind;
pub mod task;
pub mod timestamp;

pub use kind::TaskKind;
pub use task::{Task, TaskDetails};
pub use timestamp::{format_timestamp, parse_timestamp, TIMESTAMP_FORMAT};
