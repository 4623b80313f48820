//! Byte-range XML editing.
//!
//! Parts are parsed with `roxmltree` only to locate elements; edits are
//! applied as splices on the original text so everything not touched stays
//! byte-for-byte identical.

use std::{borrow::Cow, ops::Range};

use roxmltree::{Document, Node};

use crate::PackagingError;

/// WordprocessingML main namespace.
pub(crate) const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Escapes character data for element content.
pub fn escape_text(text: &str) -> Cow<'_, str> {
    escape(text, false)
}

/// Escapes character data for a double-quoted attribute value.
pub fn escape_attr(text: &str) -> Cow<'_, str> {
    escape(text, true)
}

/// Carriage returns become `&#13;` in both modes so they survive parsing.
fn escape(text: &str, attr: bool) -> Cow<'_, str> {
    let needs = |c: char| matches!(c, '&' | '<' | '>' | '\r') || (attr && matches!(c, '"' | '\n' | '\t'));
    if !text.chars().any(needs) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\r' => out.push_str("&#13;"),
            '"' if attr => out.push_str("&quot;"),
            '\n' if attr => out.push_str("&#10;"),
            '\t' if attr => out.push_str("&#9;"),
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Decodes a part as UTF-8, dropping a leading byte order mark.
pub(crate) fn decode<'a>(part: &str, bytes: &'a [u8]) -> Result<&'a str, PackagingError> {
    let text = std::str::from_utf8(bytes).map_err(|err| PackagingError::malformed(part, err))?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

/// Parses a part, mapping syntax errors to [`PackagingError::Malformed`].
pub(crate) fn parse<'a>(part: &str, text: &'a str) -> Result<Document<'a>, PackagingError> {
    Document::parse(text).map_err(|err| PackagingError::malformed(part, err))
}

/// Offset of the closing tag of a non-empty element, or `None` for `<a/>`.
pub(crate) fn end_tag_start(text: &str, node: Node<'_, '_>) -> Option<usize> {
    let range = node.range();
    let slice = &text[range.clone()];
    if slice.ends_with("/>") {
        return None;
    }
    slice.rfind("</").map(|idx| range.start + idx)
}

/// Qualified element or attribute name for a namespace prefix.
///
/// `None` means the namespace is the default one.
pub(crate) fn qualify(prefix: Option<&str>, local: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{local}"),
        _ => local.to_string(),
    }
}

/// First element child of `node` with the given local name.
pub(crate) fn child_element<'a, 'input>(
    node: Node<'a, 'input>,
    local: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.tag_name().name() == local)
}

/// A set of non-overlapping text splices applied in one pass.
///
/// Inserts at the same offset keep the order they were added in.
#[derive(Debug, Default)]
pub(crate) struct Edits {
    edits: Vec<(Range<usize>, String)>,
}

impl Edits {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, at: usize, text: impl Into<String>) {
        self.edits.push((at..at, text.into()));
    }

    pub(crate) fn replace(&mut self, range: Range<usize>, text: impl Into<String>) {
        self.edits.push((range, text.into()));
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub(crate) fn apply(self, text: &str) -> String {
        let mut ordered: Vec<_> = self.edits.into_iter().enumerate().collect();
        ordered.sort_by(|(a_seq, (a, _)), (b_seq, (b, _))| {
            b.start.cmp(&a.start).then(b_seq.cmp(a_seq))
        });

        let mut out = text.to_string();
        for (_, (range, replacement)) in ordered {
            out.replace_range(range, &replacement);
        }
        out
    }
}
