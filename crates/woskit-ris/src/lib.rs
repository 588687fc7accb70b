//! RIS rendering for extracted WoS records.
//!
//! Two stages: [`entry`] projects extracted publication info into ordered
//! two-letter-tag entries (the RIS vocabulary), and [`render`] serializes
//! those entries into the tagged, line-oriented text format with one block
//! per record. File output goes through [`render::write_file`], which
//! refuses to overwrite unless told to.

use std::path::PathBuf;

use thiserror::Error;

pub mod entry;
pub mod render;

// Re-export for convenience
pub use entry::{RisEntry, RisValue, to_ris_entries, to_ris_entry};
pub use render::{to_ris_text, write_file};

#[derive(Error, Debug)]
pub enum RisError {
    #[error("refusing to overwrite existing file {}", .0.display())]
    AlreadyExists(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
