//! Metadata store adapter
//!
//! A single indented JSON document summarising every record. It is written
//! on each save and rewritten from the content table after single-record
//! changes; it is never used to rebuild records.

mod atomic;
mod document;

pub use atomic::atomic_write;
pub use document::{MetadataEntry, MetadataStore};
