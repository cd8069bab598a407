//! Structured representation of `git diff` output.
//!
//! [`parse_diff`] turns unified diff text into a [`GitDiff`]:
//! - one [`FileChange`] per `diff --git` section (changed, added, deleted, renamed)
//! - hunks with their ranges, optional function context, and per-line changes
//! - binary file markers
//!
//! The serialized form is stable and can be read back with `serde_json`.

mod helpers;
mod model;
mod parser;


pub use model::{
    AddedFile, BinaryFilesChunk, ChangedFile, Chunk, DeletedFile, FileChange, GitDiff, Hunk,
    LineChange, LineRange, RenamedFile,
};
pub use parser::parse_diff;

/// Delimiter that opens every file section of raw diff output.
pub const FILE_HEADER: &str = "diff --git";

/// Approximate number of files in raw diff text.
///
/// Counts every occurrence of [`FILE_HEADER`], including ones that appear
/// inside changed file content.
#[must_use]
pub fn count_raw_files(raw: &str) -> usize {
    raw.matches(FILE_HEADER).count()
}
