//! Helper functions for diff parsing.

use super::model::LineRange;

/// Split the remainder of a `diff --git` line into its (old, new) paths.
///
/// Handles:
/// - `a/path b/path` (normal)
/// - `a/old b/new` (rename)
/// - `"a/with space" "b/with space"` (quoted)
/// - `path path` (`--no-prefix`)
pub(super) fn parse_diff_git_line(rest: &str) -> Option<(String, String)> {
    if rest.starts_with('"') {
        let (old, new) = split_quoted(rest)?;
        return Some((strip_prefix(&old), strip_prefix(&new)));
    }

    // Paths can contain spaces; the last " b/" separates the two sides.
    if let Some(b_pos) = rest.rfind(" b/") {
        let old = &rest[..b_pos];
        let new = &rest[b_pos + 1..];
        return Some((strip_prefix(old), strip_prefix(new)));
    }

    // Without prefixes both halves are identical unless the file was renamed.
    let mid = rest.len() / 2;
    if rest.is_char_boundary(mid) && rest.as_bytes().get(mid) == Some(&b' ') {
        let (old, new) = (&rest[..mid], &rest[mid + 1..]);
        if old == new {
            return Some((old.to_string(), new.to_string()));
        }
    }

    let mut parts = rest.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some(old), Some(new)) => Some((strip_prefix(old), strip_prefix(new))),
        _ => None,
    }
}

/// Path from a `--- ` or `+++ ` line, `None` for `/dev/null`.
pub(super) fn parse_marker_path(rest: &str) -> Option<String> {
    // git appends a tab when the path contains spaces
    let rest = rest.trim_end_matches('\t');
    if rest == "/dev/null" {
        return None;
    }
    Some(strip_prefix(&unquote(rest)))
}

/// Parse `Binary files A and B differ` into (before, after) paths.
pub(super) fn parse_binary_line(line: &str) -> Option<(String, String)> {
    let rest = line.strip_prefix("Binary files ")?.strip_suffix(" differ")?;
    let (before, after) = rest.split_once(" and ")?;
    Some((binary_path(before), binary_path(after)))
}

fn binary_path(side: &str) -> String {
    parse_marker_path(side).unwrap_or_else(|| side.to_string())
}

/// Parse a hunk header line.
///
/// Format: `@@ -old_start[,old_len] +new_start[,new_len] @@ [context]`
///
/// Returns (from, to, context) or `None` if the header is malformed.
pub(super) fn parse_hunk_header(line: &str) -> Option<(LineRange, LineRange, Option<String>)> {
    let line = line.strip_prefix("@@ ")?;
    let end_marker = line.find(" @@")?;
    let range_part = &line[..end_marker];

    let mut parts = range_part.split_whitespace();
    let from = parse_range(parts.next()?.strip_prefix('-')?)?;
    let to = parse_range(parts.next()?.strip_prefix('+')?)?;

    let context = line[end_marker + 3..].trim();
    let context = (!context.is_empty()).then(|| context.to_string());

    Some((from, to, context))
}

/// Parse `start` or `start,len`; an omitted length means one line.
fn parse_range(range: &str) -> Option<LineRange> {
    let (start, lines) = match range.split_once(',') {
        Some((start, len)) => (start.parse().ok()?, len.parse().ok()?),
        None => (range.parse().ok()?, 1),
    };
    Some(LineRange { start, lines })
}

fn strip_prefix(path: &str) -> String {
    let path = unquote(path);
    path.strip_prefix("a/")
        .or_else(|| path.strip_prefix("b/"))
        .map_or_else(|| path.clone(), str::to_string)
}

fn unquote(path: &str) -> String {
    path.strip_prefix('"')
        .and_then(|p| p.strip_suffix('"'))
        .map_or_else(|| path.to_string(), unescape_c_style)
}

/// Undo git's C-style path quoting (`core.quotePath`).
///
/// Non-ASCII bytes arrive as `\NNN` octal escapes; runs of them are
/// reassembled into UTF-8.
fn unescape_c_style(quoted: &str) -> String {
    let bytes = quoted.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' || i + 1 == bytes.len() {
            out.push(bytes[i]);
            i += 1;
            continue;
        }

        let escape = bytes[i + 1];
        i += 2;
        match escape {
            b'0'..=b'7' => {
                let digits = bytes[i - 1..]
                    .iter()
                    .take(3)
                    .take_while(|b| (b'0'..=b'7').contains(*b))
                    .count();
                let value = bytes[i - 1..i - 1 + digits]
                    .iter()
                    .fold(0_u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                out.push(u8::try_from(value).unwrap_or(u8::MAX));
                i += digits - 1;
            }
            b'a' => out.push(0x07),
            b'b' => out.push(0x08),
            b'f' => out.push(0x0c),
            b'n' => out.push(b'\n'),
            b'r' => out.push(b'\r'),
            b't' => out.push(b'\t'),
            b'v' => out.push(0x0b),
            other => out.push(other),
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Split `"a/x y" "b/x y"` into its two quoted halves (quotes kept).
fn split_quoted(rest: &str) -> Option<(String, String)> {
    let mut escaped = false;
    for (i, c) in rest.char_indices().skip(1) {
        match c {
            '\\' if !escaped => escaped = true,
            '"' if !escaped => {
                let (old, new) = rest.split_at(i + 1);
                return Some((old.to_string(), new.trim_start().to_string()));
            }
            _ => escaped = false,
        }
    }
    None
}
