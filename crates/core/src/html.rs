//! Tag-level HTML scanner used by the section helpers.
//!
//! Rendered document HTML comes out of the wiki's own rendering pipeline, so
//! the helpers never need a DOM: element boundaries, `id` attributes and
//! heading levels are enough. The scanner is tolerant of unclosed elements and
//! never fails; anything that does not look like markup is text.

use std::collections::BTreeMap;
use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)(?P<comment><!--.*?-->)|(?P<decl><![^>]*>|<\?[^>]*>)|<(?P<close>/)?(?P<name>[A-Za-z][A-Za-z0-9:-]*)(?P<attrs>(?:[^>"']|"[^"]*"|'[^']*')*)>"#,
    )
    .expect("valid regex")
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<name>[^\s"'>/=]+)(?:\s*=\s*(?:"(?P<dq>[^"]*)"|'(?P<sq>[^']*)'|(?P<bare>[^\s"'>]+)))?"#,
    )
    .expect("valid regex")
});

static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Elements that never have content or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// What a [`Token`] covers in the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Text,
    Comment,
    /// `<!DOCTYPE ...>`, `<![CDATA[...]]>` and processing instructions.
    Declaration,
    Open {
        /// Lowercased tag name.
        name: String,
        /// Raw attribute text between the tag name and `>`.
        attrs: String,
        /// Void element or explicit `/>`; no matching close tag follows.
        self_closing: bool,
    },
    Close {
        name: String,
    },
}

/// A slice of the source HTML, identified by byte offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
}

impl Token {
    /// Tag name for open and close tokens.
    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Open { name, .. } | TokenKind::Close { name } => Some(name),
            _ => None,
        }
    }

    /// Heading level (1-6) if this token opens an `h1`..`h6` element.
    pub fn heading_level(&self) -> Option<u8> {
        match &self.kind {
            TokenKind::Open { name, .. } => heading_level(name),
            _ => None,
        }
    }

    /// Value of the `id` attribute of an open tag.
    pub fn id(&self) -> Option<String> {
        match &self.kind {
            TokenKind::Open { attrs, .. } => parse_attributes(attrs)
                .into_iter()
                .find(|(name, _)| name == "id")
                .and_then(|(_, value)| value),
            _ => None,
        }
    }

    /// Whether an open tag carries attribute `name`, with or without a value.
    pub fn has_attribute(&self, name: &str) -> bool {
        match &self.kind {
            TokenKind::Open { attrs, .. } => parse_attributes(attrs)
                .iter()
                .any(|(attr, _)| attr == name),
            _ => false,
        }
    }

    pub fn is_self_closing(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Open {
                self_closing: true,
                ..
            }
        )
    }
}

/// Heading level for a tag name, `None` for anything but `h1`..`h6`.
pub fn heading_level(name: &str) -> Option<u8> {
    let mut chars = name.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some('h' | 'H'), Some(digit @ '1'..='6'), None) => {
            digit.to_digit(10).and_then(|d| u8::try_from(d).ok())
        }
        _ => None,
    }
}

/// Split `html` into tags, comments, declarations and text runs.
///
/// Tokens are contiguous and cover the whole input.
pub fn tokenize(html: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut cursor = 0;

    for caps in TOKEN_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if whole.start() > cursor {
            tokens.push(Token {
                kind: TokenKind::Text,
                start: cursor,
                end: whole.start(),
            });
        }

        let kind = if caps.name("comment").is_some() {
            TokenKind::Comment
        } else if caps.name("decl").is_some() {
            TokenKind::Declaration
        } else {
            let name = caps
                .name("name")
                .map(|m| m.as_str().to_ascii_lowercase())
                .unwrap_or_default();
            if caps.name("close").is_some() {
                TokenKind::Close { name }
            } else {
                let attrs = caps
                    .name("attrs")
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                let self_closing =
                    VOID_ELEMENTS.contains(&name.as_str()) || attrs.trim_end().ends_with('/');
                TokenKind::Open {
                    name,
                    attrs,
                    self_closing,
                }
            }
        };

        tokens.push(Token {
            kind,
            start: whole.start(),
            end: whole.end(),
        });
        cursor = whole.end();
    }

    if cursor < html.len() {
        tokens.push(Token {
            kind: TokenKind::Text,
            start: cursor,
            end: html.len(),
        });
    }

    tokens
}

/// Parse raw attribute text into `(name, value)` pairs in source order.
///
/// Names are lowercased; valueless attributes (`disabled`) have `None`.
pub fn parse_attributes(raw: &str) -> Vec<(String, Option<String>)> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|caps| {
            let name = caps.name("name")?.as_str().to_ascii_lowercase();
            let value = caps
                .name("dq")
                .or_else(|| caps.name("sq"))
                .or_else(|| caps.name("bare"))
                .map(|m| m.as_str().to_string());
            Some((name, value))
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Element structure
// ---------------------------------------------------------------------------

/// Elements that bound the search for an implicitly closed element.
const SCOPE_BOUNDARIES: &[&str] = &[
    "applet", "caption", "html", "table", "td", "th", "marquee", "object", "template",
];

/// Start tags that close an open `p` element.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "details", "dialog", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hgroup", "hr", "li", "main", "menu", "nav", "ol", "p", "pre", "section", "table",
    "ul",
];

/// Stack of open element names, maintained while scanning tokens forward.
///
/// Applies the HTML end tags that may be omitted: a `p` ends at the next
/// block-level start tag, a `li` at the next `li`, table cells and rows at
/// the next cell or row, and so on. Stray end tags are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpenElements {
    names: Vec<String>,
}

impl OpenElements {
    /// The open elements just before token `idx`.
    pub fn before(tokens: &[Token], idx: usize) -> Self {
        let mut open = Self::default();
        for token in tokens.iter().take(idx) {
            match &token.kind {
                TokenKind::Open {
                    name, self_closing, ..
                } => {
                    open.close_implied_by(name);
                    if !self_closing {
                        open.push(name);
                    }
                }
                TokenKind::Close { name } => {
                    open.close(name);
                }
                _ => {}
            }
        }
        open
    }

    pub fn depth(&self) -> usize {
        self.names.len()
    }

    pub fn push(&mut self, name: &str) {
        self.names.push(name.to_string());
    }

    /// Apply an end tag. Returns the depth the matching element was open at,
    /// or `None` for a stray end tag.
    pub fn close(&mut self, name: &str) -> Option<usize> {
        let pos = self.names.iter().rposition(|open| open == name)?;
        self.names.truncate(pos);
        Some(pos)
    }

    /// Close the elements that the start tag `opening` ends implicitly.
    pub fn close_implied_by(&mut self, opening: &str) {
        if CLOSES_P.contains(&opening) {
            self.close_in_scope(&["p"], &["button"]);
        }
        match opening {
            "li" => self.close_in_scope(&["li"], &["ol", "ul"]),
            "dt" | "dd" => self.close_in_scope(&["dt", "dd"], &["dl"]),
            "tr" => self.close_within(&["tr"], &["table", "tbody", "thead", "tfoot", "template"]),
            "td" | "th" => self.close_within(&["td", "th"], &["tr", "table", "template"]),
            "tbody" | "thead" | "tfoot" => {
                self.close_within(&["tbody", "thead", "tfoot"], &["table", "template"])
            }
            "option" => self.close_within(&["option"], &["select", "datalist", "optgroup"]),
            "optgroup" => self.close_within(&["optgroup"], &["select"]),
            "rt" | "rp" => self.close_within(&["rt", "rp"], &["ruby"]),
            _ if heading_level(opening).is_some() => {
                if self.names.last().is_some_and(|top| heading_level(top).is_some()) {
                    self.names.pop();
                }
            }
            _ => {}
        }
    }

    fn close_in_scope(&mut self, targets: &[&str], extra_boundaries: &[&str]) {
        let mut stops = SCOPE_BOUNDARIES.to_vec();
        stops.extend_from_slice(extra_boundaries);
        self.close_within(targets, &stops);
    }

    /// Close the nearest open element named in `targets`, and everything
    /// opened inside it, unless an element in `stops` comes first.
    fn close_within(&mut self, targets: &[&str], stops: &[&str]) {
        for pos in (0..self.names.len()).rev() {
            let name = self.names[pos].as_str();
            if targets.contains(&name) {
                self.names.truncate(pos);
                return;
            }
            if stops.contains(&name) {
                return;
            }
        }
    }
}

/// Where an element ends, explicitly or implicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementEnd {
    /// Byte range of the end tag; empty when the end tag is implied.
    pub close: Range<usize>,
    /// Index of the token where the element's content stops (exclusive).
    pub content_end: usize,
    /// Index of the first token after the element.
    pub next: usize,
}

/// Where the element opened at token `open_idx` ends.
///
/// Follows nesting and implied end tags. An element that is never closed
/// runs to the end of input.
pub fn element_end(tokens: &[Token], open_idx: usize) -> ElementEnd {
    let input_end = tokens.last().map_or(0, |t| t.end);
    let at_input_end = ElementEnd {
        close: input_end..input_end,
        content_end: tokens.len(),
        next: tokens.len(),
    };
    let Some(open) = tokens.get(open_idx) else {
        return at_input_end;
    };
    if open.is_self_closing() {
        return ElementEnd {
            close: open.end..open.end,
            content_end: open_idx + 1,
            next: open_idx + 1,
        };
    }
    let Some(name) = open.tag_name() else {
        return at_input_end;
    };

    let mut stack = OpenElements::before(tokens, open_idx);
    stack.close_implied_by(name);
    let base = stack.depth();
    stack.push(name);

    let implied_at = |idx: usize, token: &Token| ElementEnd {
        close: token.start..token.start,
        content_end: idx,
        next: idx,
    };

    for (idx, token) in tokens.iter().enumerate().skip(open_idx + 1) {
        match &token.kind {
            TokenKind::Open {
                name, self_closing, ..
            } => {
                stack.close_implied_by(name);
                if stack.depth() <= base {
                    return implied_at(idx, token);
                }
                if !self_closing {
                    stack.push(name);
                }
            }
            TokenKind::Close { name } => match stack.close(name) {
                Some(pos) if pos == base => {
                    return ElementEnd {
                        close: token.start..token.end,
                        content_end: idx,
                        next: idx + 1,
                    };
                }
                // An ancestor ended first.
                Some(pos) if pos < base => return implied_at(idx, token),
                _ => {}
            },
            _ => {}
        }
    }

    at_input_end
}

/// Plain text of the tokens strictly between `from` and `to`, with
/// whitespace collapsed and common entities decoded.
pub fn text_between(html: &str, tokens: &[Token], from: usize, to: usize) -> String {
    let mut text = String::new();
    for token in tokens.iter().take(to).skip(from + 1) {
        if token.kind == TokenKind::Text {
            text.push_str(&html[token.start..token.end]);
        }
    }
    collapse_whitespace(&decode_entities(&text))
}

/// Collapse runs of whitespace into single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

// ---------------------------------------------------------------------------
// Normalisation
// ---------------------------------------------------------------------------

/// Canonical form of an HTML fragment for equality checks.
///
/// Tag names are lowercased, attributes sorted by name and re-quoted,
/// whitespace inside text collapsed and whitespace-only text dropped.
/// Comments keep their (trimmed) body so placeholders stay visible.
pub fn normalize_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len());

    for token in tokenize(html) {
        let raw = &html[token.start..token.end];
        match &token.kind {
            TokenKind::Text => out.push_str(&collapse_whitespace(raw)),
            TokenKind::Comment => {
                let body = raw
                    .strip_prefix("<!--")
                    .and_then(|b| b.strip_suffix("-->"))
                    .unwrap_or_default();
                out.push_str("<!--");
                out.push_str(&collapse_whitespace(body));
                out.push_str("-->");
            }
            TokenKind::Declaration => out.push_str(raw),
            TokenKind::Open {
                name,
                attrs,
                self_closing,
            } => {
                let sorted: BTreeMap<String, Option<String>> =
                    parse_attributes(attrs).into_iter().collect();
                out.push('<');
                out.push_str(name);
                for (attr, value) in sorted {
                    out.push(' ');
                    out.push_str(&attr);
                    if let Some(value) = value {
                        out.push_str("=\"");
                        out.push_str(&value.replace('"', "&quot;"));
                        out.push('"');
                    }
                }
                if *self_closing && !VOID_ELEMENTS.contains(&name.as_str()) {
                    out.push('/');
                }
                out.push('>');
            }
            TokenKind::Close { name } => {
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(html: &str) -> Vec<TokenKind> {
        tokenize(html).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn tokens_cover_whole_input() {
        let html = "a<p class=\"x\">b</p><!-- c -->d";
        let tokens = tokenize(html);
        assert_eq!(tokens.first().map(|t| t.start), Some(0));
        assert_eq!(tokens.last().map(|t| t.end), Some(html.len()));
        for pair in tokens.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
    }

    #[test]
    fn void_and_explicit_self_closing_tags() {
        let tokens = tokenize("<br><img src=x /><div/>");
        assert!(tokens.iter().all(Token::is_self_closing));
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        let tokens = tokenize(r#"<a title="a > b" id='x'>t</a>"#);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].id().as_deref(), Some("x"));
    }

    #[test]
    fn tag_names_are_lowercased() {
        assert_eq!(
            kinds("<H2 ID=Top></H2>"),
            vec![
                TokenKind::Open {
                    name: "h2".into(),
                    attrs: " ID=Top".into(),
                    self_closing: false,
                },
                TokenKind::Close { name: "h2".into() },
            ]
        );
        assert_eq!(tokenize("<H2 ID=Top>")[0].id().as_deref(), Some("Top"));
    }

    #[test]
    fn heading_levels() {
        assert_eq!(heading_level("h1"), Some(1));
        assert_eq!(heading_level("h6"), Some(6));
        assert_eq!(heading_level("h7"), None);
        assert_eq!(heading_level("hr"), None);
        assert_eq!(heading_level("header"), None);
    }

    #[test]
    fn element_end_skips_nested_same_name() {
        let tokens = tokenize("<div><div></div></div><p></p>");
        assert_eq!(element_end(&tokens, 0).content_end, 3);
        assert_eq!(element_end(&tokens, 0).next, 4);
        assert_eq!(element_end(&tokens, 1).content_end, 2);
    }

    #[test]
    fn unclosed_element_runs_to_end_of_input() {
        let html = "<div><p>text";
        let end = element_end(&tokenize(html), 0);
        assert_eq!(end.close, html.len()..html.len());
        assert_eq!(end.content_end, 3);
    }

    #[test]
    fn paragraph_ends_at_next_block() {
        let html = "<p>one<p>two<div>three</div>";
        let tokens = tokenize(html);
        let first = element_end(&tokens, 0);
        assert_eq!(first.close, 6..6);
        assert_eq!(first.next, 2);
        let second = element_end(&tokens, 2);
        assert_eq!(&html[second.close.clone()], "");
        assert_eq!(tokens[second.next].tag_name(), Some("div"));
    }

    #[test]
    fn list_item_ends_at_sibling_or_list_end() {
        let html = "<ul><li>a<li>b</ul><p>after</p>";
        let tokens = tokenize(html);
        assert_eq!(tokens[element_end(&tokens, 1).next].start, html.find("<li>b").unwrap());
        assert_eq!(tokens[element_end(&tokens, 3).next].tag_name(), Some("ul"));
    }

    #[test]
    fn table_cells_end_at_next_cell_or_row() {
        let html = "<table><tr><td>a<td>b<tr><td>c</table>";
        let tokens = tokenize(html);
        // <td>a ends at <td>b, the first <tr> at the second.
        assert_eq!(element_end(&tokens, 2).next, 4);
        assert_eq!(element_end(&tokens, 1).next, 6);
    }

    #[test]
    fn nested_list_item_does_not_close_outer() {
        let mut open = OpenElements::default();
        for name in ["ul", "li", "ul"] {
            open.close_implied_by(name);
            open.push(name);
        }
        open.close_implied_by("li");
        assert_eq!(open.depth(), 3);
    }

    #[test]
    fn stray_end_tag_is_ignored() {
        let mut open = OpenElements::default();
        open.push("div");
        assert_eq!(open.close("span"), None);
        assert_eq!(open.depth(), 1);
    }

    #[test]
    fn text_between_decodes_and_collapses() {
        let html = "<h2>Tips &amp;\n   <em>Tricks</em></h2>";
        let tokens = tokenize(html);
        let end = element_end(&tokens, 0);
        assert_eq!(text_between(html, &tokens, 0, end.content_end), "Tips & Tricks");
    }

    #[test]
    fn normalize_ignores_whitespace_and_attribute_order() {
        let a = "<p class=\"a\"   id='b'>Hello\n   world</p>\n\n<br/>";
        let b = "<P id=\"b\" class=a>Hello world</P><br>";
        assert_eq!(normalize_html(a), normalize_html(b));
    }

    #[test]
    fn normalize_keeps_comments() {
        assert_eq!(normalize_html("<p>a</p>  <!-- -->  "), "<p>a</p><!---->");
    }

    #[test]
    fn normalize_distinguishes_content() {
        assert_ne!(normalize_html("<p>a</p>"), normalize_html("<p>b</p>"));
    }
}
