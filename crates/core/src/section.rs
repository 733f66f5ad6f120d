//! Section extraction, hiding and replacement by heading id.
//!
//! A section is addressed by the `id` attribute of the element that starts
//! it. For a heading (`h1`..`h6`) the section body is every following sibling
//! up to the next heading of the same or a higher level, or the end of the
//! parent element. For any other element the body is the element's content.
//!
//! Unknown ids are not errors: extraction yields an empty string and the
//! rewriting operations return the document unchanged.

use std::collections::HashSet;
use std::ops::Range;

use serde::Serialize;

use crate::html::{
    element_end, heading_level, text_between, tokenize, OpenElements, Token, TokenKind,
};

/// Placeholder left where a hidden section used to be.
pub const HIDDEN_SECTION_MARKER: &str = "<!-- -->";

/// Fallback id for headings without any usable text.
const EMPTY_HEADING_ID: &str = "Section";

/// Byte ranges of a located section.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SectionSpan {
    /// Heading (or wrapping element) plus body.
    outer: Range<usize>,
    /// Body only.
    inner: Range<usize>,
}

/// A heading that carries an id, as listed by [`section_outline`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionHeading {
    pub id: String,
    pub level: u8,
    pub title: String,
}

fn locate(html: &str, tokens: &[Token], section_id: &str) -> Option<SectionSpan> {
    let open_idx = tokens
        .iter()
        .position(|t| t.id().as_deref() == Some(section_id))?;
    let open = &tokens[open_idx];
    let end = element_end(tokens, open_idx);

    match open.heading_level() {
        Some(level) => {
            let body_start = end.close.end;
            let body_end =
                heading_body_end(tokens, open_idx, end.next, level).unwrap_or(html.len());
            Some(SectionSpan {
                outer: open.start..body_end,
                inner: body_start..body_end,
            })
        }
        None => Some(SectionSpan {
            outer: open.start..end.close.end,
            inner: open.end..end.close.start,
        }),
    }
}

/// Byte offset where the body of the heading at token `heading_idx` stops,
/// scanning its siblings from token `from`. `None` means end of input.
///
/// The body ends at the next sibling heading of the same or a higher level,
/// or where the heading's parent element ends (explicitly or implied).
fn heading_body_end(
    tokens: &[Token],
    heading_idx: usize,
    from: usize,
    level: u8,
) -> Option<usize> {
    let mut open = OpenElements::before(tokens, heading_idx);
    if let Some(name) = tokens[heading_idx].tag_name() {
        open.close_implied_by(name);
    }
    let base = open.depth();

    for token in tokens.iter().skip(from) {
        match &token.kind {
            TokenKind::Open {
                name, self_closing, ..
            } => {
                open.close_implied_by(name);
                if open.depth() < base {
                    return Some(token.start);
                }
                if open.depth() == base && heading_level(name).is_some_and(|l| l <= level) {
                    return Some(token.start);
                }
                if !self_closing {
                    open.push(name);
                }
            }
            TokenKind::Close { name } => {
                if open.close(name).is_some_and(|pos| pos < base) {
                    return Some(token.start);
                }
            }
            TokenKind::Text | TokenKind::Comment | TokenKind::Declaration => {}
        }
    }
    None
}

/// Whether `html` contains an element with the given id.
pub fn has_section(html: &str, section_id: &str) -> bool {
    tokenize(html)
        .iter()
        .any(|t| t.id().as_deref() == Some(section_id))
}

/// Return the body of the section identified by `section_id`.
///
/// The heading itself is not included. Returns an empty string when no
/// element carries the id.
pub fn section_extract(html: &str, section_id: &str) -> String {
    let tokens = tokenize(html);
    locate(html, &tokens, section_id)
        .map(|span| html[span.inner].to_string())
        .unwrap_or_default()
}

/// Return `html` with the identified section (heading and body) replaced by
/// [`HIDDEN_SECTION_MARKER`]. Everything else is preserved verbatim.
pub fn section_hide(html: &str, section_id: &str) -> String {
    let tokens = tokenize(html);
    match locate(html, &tokens, section_id) {
        Some(span) => {
            let mut out = String::with_capacity(html.len());
            out.push_str(&html[..span.outer.start]);
            out.push_str(HIDDEN_SECTION_MARKER);
            out.push_str(&html[span.outer.end..]);
            out
        }
        None => html.to_string(),
    }
}

/// Return `html` with the body of the identified section swapped for
/// `replacement`. The heading is kept.
pub fn section_replace(html: &str, section_id: &str, replacement: &str) -> String {
    let tokens = tokenize(html);
    match locate(html, &tokens, section_id) {
        Some(span) => {
            let mut out = String::with_capacity(html.len() + replacement.len());
            out.push_str(&html[..span.inner.start]);
            out.push_str(replacement);
            out.push_str(&html[span.inner.end..]);
            out
        }
        None => html.to_string(),
    }
}

/// Headings with an id, in document order.
pub fn section_outline(html: &str) -> Vec<SectionHeading> {
    let tokens = tokenize(html);
    tokens
        .iter()
        .enumerate()
        .filter_map(|(idx, token)| {
            let level = token.heading_level()?;
            let id = token.id()?;
            let end = element_end(&tokens, idx);
            Some(SectionHeading {
                id,
                level,
                title: text_between(html, &tokens, idx, end.content_end),
            })
        })
        .collect()
}

/// Derive a section id from heading text: whitespace becomes `_`, anything
/// that is not a word character, `-` or `.` is dropped.
pub fn section_id_from_text(text: &str) -> String {
    let id: String = text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
        .collect();
    if id.is_empty() {
        EMPTY_HEADING_ID.to_string()
    } else {
        id
    }
}

/// Give every heading without an `id` one derived from its text.
///
/// Ids already present anywhere in the document are reserved; collisions get
/// a numeric suffix (`Usage`, `Usage_2`, `Usage_3`).
pub fn inject_section_ids(html: &str) -> String {
    let tokens = tokenize(html);
    let mut taken: HashSet<String> = tokens.iter().filter_map(Token::id).collect();
    let mut inserts: Vec<(usize, String)> = Vec::new();

    for (idx, token) in tokens.iter().enumerate() {
        let TokenKind::Open { name, .. } = &token.kind else {
            continue;
        };
        if token.heading_level().is_none() || token.has_attribute("id") {
            continue;
        }

        let end = element_end(&tokens, idx);
        let base = section_id_from_text(&text_between(html, &tokens, idx, end.content_end));
        let mut candidate = base.clone();
        let mut suffix = 2;
        while taken.contains(&candidate) {
            candidate = format!("{base}_{suffix}");
            suffix += 1;
        }
        taken.insert(candidate.clone());

        // Right after `<hN`.
        inserts.push((token.start + 1 + name.len(), candidate));
    }

    let mut out = String::with_capacity(html.len() + inserts.len() * 16);
    let mut cursor = 0;
    for (at, id) in inserts {
        out.push_str(&html[cursor..at]);
        out.push_str(" id=\"");
        out.push_str(&id);
        out.push('"');
        cursor = at;
    }
    out.push_str(&html[cursor..]);
    out
}
