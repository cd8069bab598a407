//! Core diff parsing logic.

use super::helpers::{
    parse_binary_line, parse_diff_git_line, parse_hunk_header, parse_marker_path,
};
use super::model::{
    AddedFile, BinaryFilesChunk, ChangedFile, Chunk, DeletedFile, FileChange, GitDiff, Hunk,
    LineChange, RenamedFile,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Changed,
    Added,
    Deleted,
    Renamed,
}

/// File entry being assembled from its extended header lines.
#[derive(Debug)]
struct PendingFile {
    kind: Kind,
    path_before: String,
    path_after: String,
    chunks: Vec<Chunk>,
}

impl PendingFile {
    fn new(path_before: String, path_after: String) -> Self {
        Self {
            kind: Kind::Changed,
            path_before,
            path_after,
            chunks: Vec::new(),
        }
    }

    fn finish(self) -> FileChange {
        let chunks = self.chunks;
        match self.kind {
            Kind::Changed => FileChange::ChangedFile(ChangedFile {
                path: self.path_after,
                chunks,
            }),
            Kind::Added => FileChange::AddedFile(AddedFile {
                path: self.path_after,
                chunks,
            }),
            Kind::Deleted => FileChange::DeletedFile(DeletedFile {
                path: self.path_before,
                chunks,
            }),
            Kind::Renamed => FileChange::RenamedFile(RenamedFile {
                path_before: self.path_before,
                path_after: self.path_after,
                chunks,
            }),
        }
    }
}

/// Line numbers and remaining line budget of the hunk being read.
#[derive(Debug, Default)]
struct HunkCursor {
    line_before: usize,
    line_after: usize,
    remaining_before: usize,
    remaining_after: usize,
}

impl HunkCursor {
    const fn is_open(&self) -> bool {
        self.remaining_before > 0 || self.remaining_after > 0
    }
}

/// Parse raw `git diff` output into a [`GitDiff`].
///
/// Parsing never fails: lines that are not part of a recognised header or
/// hunk are skipped.
#[must_use]
pub fn parse_diff(diff_output: &str) -> GitDiff {
    let mut files = Vec::new();
    let mut current: Option<PendingFile> = None;
    let mut cursor = HunkCursor::default();

    // Split on '\n' only: a trailing '\r' is part of the line content.
    let body = diff_output.strip_suffix('\n').unwrap_or(diff_output);
    for line in body.split('\n') {
        if cursor.is_open() {
            if let Some(file) = current.as_mut() {
                if let Some(Chunk::Chunk(hunk)) = file.chunks.last_mut() {
                    if let Some(change) = read_hunk_line(line, &mut cursor) {
                        hunk.changes.push(change);
                        continue;
                    }
                }
            }
            // Anything else ends the hunk early (truncated or malformed input).
            cursor = HunkCursor::default();
        }

        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(message) = line.strip_prefix('\\') {
            if let Some(Chunk::Chunk(hunk)) = current.as_mut().and_then(|f| f.chunks.last_mut()) {
                hunk.changes.push(LineChange::MessageLine {
                    content: message.trim_start().to_string(),
                });
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("diff --git ") {
            files.extend(current.take().map(PendingFile::finish));
            current = parse_diff_git_line(rest)
                .map(|(before, after)| PendingFile::new(before, after));
            continue;
        }

        let Some(file) = current.as_mut() else {
            continue;
        };

        if line.starts_with("new file mode") {
            file.kind = Kind::Added;
        } else if line.starts_with("deleted file mode") {
            file.kind = Kind::Deleted;
        } else if let Some(path) = line.strip_prefix("rename from ") {
            file.kind = Kind::Renamed;
            file.path_before = path.to_string();
        } else if let Some(path) = line.strip_prefix("rename to ") {
            file.kind = Kind::Renamed;
            file.path_after = path.to_string();
        } else if let Some(rest) = line.strip_prefix("--- ") {
            if let Some(path) = parse_marker_path(rest) {
                file.path_before = path;
            }
        } else if let Some(rest) = line.strip_prefix("+++ ") {
            if let Some(path) = parse_marker_path(rest) {
                file.path_after = path;
            }
        } else if line.starts_with("Binary files ") {
            if let Some((path_before, path_after)) = parse_binary_line(line) {
                file.chunks.push(Chunk::BinaryFilesChunk(BinaryFilesChunk {
                    path_before,
                    path_after,
                }));
            }
        } else if line.starts_with("@@ ") {
            if let Some((from, to, context)) = parse_hunk_header(line) {
                cursor = HunkCursor {
                    line_before: from.start,
                    line_after: to.start,
                    remaining_before: from.lines,
                    remaining_after: to.lines,
                };
                file.chunks.push(Chunk::Chunk(Hunk {
                    context,
                    from_file_range: from,
                    to_file_range: to,
                    changes: Vec::new(),
                }));
            }
        }
    }

    files.extend(current.map(PendingFile::finish));
    GitDiff { files }
}

/// Consume one hunk body line, advancing the cursor.
fn read_hunk_line(line: &str, cursor: &mut HunkCursor) -> Option<LineChange> {
    let mut chars = line.chars();
    let marker = chars.next();
    let content = chars.as_str().to_string();

    match marker {
        Some('+') if cursor.remaining_after > 0 => {
            let change = LineChange::AddedLine {
                line_after: cursor.line_after,
                content,
            };
            cursor.line_after += 1;
            cursor.remaining_after -= 1;
            Some(change)
        }
        Some('-') if cursor.remaining_before > 0 => {
            let change = LineChange::DeletedLine {
                line_before: cursor.line_before,
                content,
            };
            cursor.line_before += 1;
            cursor.remaining_before -= 1;
            Some(change)
        }
        // An empty line is a context line whose leading space was stripped.
        Some(' ') | None if cursor.remaining_before > 0 && cursor.remaining_after > 0 => {
            let change = LineChange::UnchangedLine {
                line_before: cursor.line_before,
                line_after: cursor.line_after,
                content,
            };
            cursor.line_before += 1;
            cursor.line_after += 1;
            cursor.remaining_before -= 1;
            cursor.remaining_after -= 1;
            Some(change)
        }
        Some('\\') => Some(LineChange::MessageLine {
            content: content.trim().to_string(),
        }),
        _ => None,
    }
}
