//! Identity keys
//!
//! A record's key is `{type tag}_{name}_{yyyyMMddHHmmss}`. It is the content
//! table's primary key and the `TaskId` of the metadata document. Two records
//! sharing type, name and creation second map to the same key, and the later
//! one wins on save.

use crate::model::timestamp::KEY_TIMESTAMP_FORMAT;
use crate::model::Task;

/// Derive the identity key for a task
pub fn derive_key(task: &Task) -> String {
    format!(
        "{}_{}_{}",
        task.type_tag(),
        task.name,
        task.creation_date.format(KEY_TIMESTAMP_FORMAT)
    )
}
