//! Unified diffs between document revisions.
//!
//! Revisions are immutable, so a diff is a pure function of two snapshots.
//! A missing snapshot on either side is an expected state (the first
//! revision of a document has no predecessor) and yields
//! [`DIFF_UNAVAILABLE`] rather than an error.

use crate::types::DbId;

/// Returned instead of a diff when either revision is missing.
pub const DIFF_UNAVAILABLE: &str = "Diff is unavailable.";

/// Lines of unchanged context around each hunk.
pub const CONTEXT_LINES: usize = 3;

/// The parts of a revision a diff needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevisionText<'a> {
    pub id: DbId,
    /// Locale of the revision's document, shown in the file headers.
    pub locale: &'a str,
    pub content: &'a str,
}

impl RevisionText<'_> {
    /// Header label, e.g. `[en-US] #42`.
    pub fn label(&self) -> String {
        format!("[{}] #{}", self.locale, self.id)
    }
}

// ---------------------------------------------------------------------------
// Line-level diff
// ---------------------------------------------------------------------------

/// The type of a line in a diff result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiffLineType {
    Added,
    Removed,
    Unchanged,
}

impl DiffLineType {
    fn prefix(&self) -> char {
        match self {
            Self::Added => '+',
            Self::Removed => '-',
            Self::Unchanged => ' ',
        }
    }
}

/// A single line in a diff result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffLine {
    pub line_type: DiffLineType,
    pub content: String,
}

/// Compute a line-level diff between two texts using LCS.
///
/// Removals are ordered before the additions that replace them.
pub fn compute_line_diff(old: &str, new: &str) -> Vec<DiffLine> {
    let old_lines: Vec<&str> = old.lines().collect();
    let new_lines: Vec<&str> = new.lines().collect();
    let m = old_lines.len();
    let n = new_lines.len();

    // Build LCS table.
    let mut lcs = vec![vec![0u32; n + 1]; m + 1];
    for i in 1..=m {
        for j in 1..=n {
            if old_lines[i - 1] == new_lines[j - 1] {
                lcs[i][j] = lcs[i - 1][j - 1] + 1;
            } else {
                lcs[i][j] = lcs[i - 1][j].max(lcs[i][j - 1]);
            }
        }
    }

    // Backtrack to produce diff.
    let mut result = Vec::new();
    let mut i = m;
    let mut j = n;
    while i > 0 || j > 0 {
        if i > 0 && j > 0 && old_lines[i - 1] == new_lines[j - 1] {
            result.push(DiffLine {
                line_type: DiffLineType::Unchanged,
                content: old_lines[i - 1].to_string(),
            });
            i -= 1;
            j -= 1;
        } else if j > 0 && (i == 0 || lcs[i][j - 1] >= lcs[i - 1][j]) {
            result.push(DiffLine {
                line_type: DiffLineType::Added,
                content: new_lines[j - 1].to_string(),
            });
            j -= 1;
        } else {
            result.push(DiffLine {
                line_type: DiffLineType::Removed,
                content: old_lines[i - 1].to_string(),
            });
            i -= 1;
        }
    }

    result.reverse();
    result
}

// ---------------------------------------------------------------------------
// Unified format
// ---------------------------------------------------------------------------

/// Normalise revision content before diffing: CRLF line endings and
/// trailing whitespace do not count as changes.
pub fn tidy_content(content: &str) -> String {
    content
        .replace("\r\n", "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

/// `start,len` range of a hunk side, 1-based. A length of one omits the
/// count; an empty side points at the line before it.
fn format_range(start: usize, len: usize) -> String {
    match len {
        1 => format!("{}", start + 1),
        0 => format!("{start},0"),
        _ => format!("{},{len}", start + 1),
    }
}

/// Unified diff between two texts, or an empty string when they match.
///
/// Lines are joined with `\n` and the result has no trailing newline.
pub fn unified_diff_text(old: &str, new: &str, from_label: &str, to_label: &str) -> String {
    let lines = compute_line_diff(old, new);

    // Old/new line offsets before each diff line.
    let mut positions = Vec::with_capacity(lines.len());
    let (mut old_pos, mut new_pos) = (0usize, 0usize);
    for line in &lines {
        positions.push((old_pos, new_pos));
        match line.line_type {
            DiffLineType::Unchanged => {
                old_pos += 1;
                new_pos += 1;
            }
            DiffLineType::Removed => old_pos += 1,
            DiffLineType::Added => new_pos += 1,
        }
    }

    let changed: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.line_type != DiffLineType::Unchanged)
        .map(|(idx, _)| idx)
        .collect();
    let (Some(&first), Some(&last)) = (changed.first(), changed.last()) else {
        return String::new();
    };

    // Group changes whose context windows overlap or touch into one hunk.
    let mut hunks: Vec<(usize, usize)> = Vec::new();
    let mut start = first.saturating_sub(CONTEXT_LINES);
    let mut end = first;
    for &idx in &changed {
        if idx > end + 2 * CONTEXT_LINES + 1 {
            hunks.push((start, (end + CONTEXT_LINES).min(lines.len() - 1)));
            start = idx.saturating_sub(CONTEXT_LINES);
        }
        end = idx;
    }
    debug_assert_eq!(end, last);
    hunks.push((start, (end + CONTEXT_LINES).min(lines.len() - 1)));

    let mut out = vec![format!("--- {from_label}"), format!("+++ {to_label}")];
    for (from, to) in hunks {
        let slice = &lines[from..=to];
        let old_len = slice
            .iter()
            .filter(|l| l.line_type != DiffLineType::Added)
            .count();
        let new_len = slice
            .iter()
            .filter(|l| l.line_type != DiffLineType::Removed)
            .count();
        let (old_start, new_start) = positions[from];
        out.push(format!(
            "@@ -{} +{} @@",
            format_range(old_start, old_len),
            format_range(new_start, new_len)
        ));
        for line in slice {
            out.push(format!("{}{}", line.line_type.prefix(), line.content));
        }
    }

    out.join("\n")
}

/// Unified diff between two revisions of a document.
///
/// Returns [`DIFF_UNAVAILABLE`] when either revision is missing; never fails.
pub fn revisions_unified_diff(
    from: Option<RevisionText<'_>>,
    to: Option<RevisionText<'_>>,
) -> String {
    let (Some(from), Some(to)) = (from, to) else {
        return DIFF_UNAVAILABLE.to_string();
    };
    unified_diff_text(
        &tidy_content(from.content),
        &tidy_content(to.content),
        &from.label(),
        &to.label(),
    )
}
