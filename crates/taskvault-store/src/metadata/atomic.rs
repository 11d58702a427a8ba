//! Atomic write primitives
//!
//! Uses temp→rename so readers see the old document or the new one, never a
//! partial write.

#![allow(clippy::result_large_err)]

use crate::errors::{io_error, Result};
use std::fs;
use std::path::Path;

/// Atomically write bytes to a file
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| io_error("create_metadata_dir", e))?;
        }
    }

    // Temp file in the same directory so the rename stays on one filesystem
    let mut temp_name = target_path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = Path::new(&temp_name);

    fs::write(temp_path, content).map_err(|e| io_error("write_metadata_temp", e))?;

    if let Err(e) = fs::rename(temp_path, target_path) {
        let _ = fs::remove_file(temp_path);
        return Err(io_error("rename_metadata_temp", e));
    }

    Ok(())
}
