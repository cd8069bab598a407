//! Serializable structured diff model.
//!
//! Every node carries a `type` discriminator so the JSON form reads the same
//! as the one produced by the `parse-git-diff` npm package:
//!
//! ```json
//! {"type":"GitDiff","files":[{"type":"ChangedFile","path":"a.txt","chunks":[...]}]}
//! ```

use serde::{Deserialize, Serialize};

/// A parsed diff: one entry per file touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "GitDiff")]
pub struct GitDiff {
    pub files: Vec<FileChange>,
}

impl GitDiff {
    /// Canonical JSON text of the diff.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FileChange {
    ChangedFile(ChangedFile),
    AddedFile(AddedFile),
    DeletedFile(DeletedFile),
    RenamedFile(RenamedFile),
}

impl FileChange {
    /// Path of the file after the change (before it, for deletions).
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::ChangedFile(f) => &f.path,
            Self::AddedFile(f) => &f.path,
            Self::DeletedFile(f) => &f.path,
            Self::RenamedFile(f) => &f.path_after,
        }
    }

    #[must_use]
    pub fn chunks(&self) -> &[Chunk] {
        match self {
            Self::ChangedFile(f) => &f.chunks,
            Self::AddedFile(f) => &f.chunks,
            Self::DeletedFile(f) => &f.chunks,
            Self::RenamedFile(f) => &f.chunks,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedFile {
    pub path: String,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedFile {
    pub path: String,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletedFile {
    pub path: String,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenamedFile {
    pub path_before: String,
    pub path_after: String,
    pub chunks: Vec<Chunk>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Chunk {
    Chunk(Hunk),
    BinaryFilesChunk(BinaryFilesChunk),
}

/// A contiguous block of changed lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub from_file_range: LineRange,
    pub to_file_range: LineRange,
    pub changes: Vec<LineChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineRange {
    pub start: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BinaryFilesChunk {
    pub path_before: String,
    pub path_after: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum LineChange {
    AddedLine { line_after: usize, content: String },
    DeletedLine { line_before: usize, content: String },
    UnchangedLine {
        line_before: usize,
        line_after: usize,
        content: String,
    },
    /// `\ No newline at end of file` and similar annotations.
    MessageLine { content: String },
}
