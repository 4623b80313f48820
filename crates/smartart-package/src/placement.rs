//! Where new body content goes.
//!
//! Word requires the section properties, if present, to be the last child
//! of `w:body`. New blocks are therefore placed right before the trailing
//! `w:sectPr`, or before `</w:body>` when there is none.

use crate::{
    PackagingError,
    xml::{self, W_NS},
};

/// Byte offset in `document` where appended body content belongs.
pub fn insertion_offset(part: &str, document: &str) -> Result<usize, PackagingError> {
    let doc = xml::parse(part, document)?;
    let body = doc
        .root_element()
        .children()
        .find(|node| {
            node.is_element()
                && node.tag_name().name() == "body"
                && node.tag_name().namespace() == Some(W_NS)
        })
        .ok_or_else(|| PackagingError::malformed(part, "no <w:body> element"))?;

    let trailing = body.children().rev().find(|node| node.is_element());
    if let Some(sect_pr) = trailing.filter(|node| {
        node.tag_name().name() == "sectPr" && node.tag_name().namespace() == Some(W_NS)
    }) {
        return Ok(sect_pr.range().start);
    }

    xml::end_tag_start(document, body)
        .ok_or_else(|| PackagingError::malformed(part, "<w:body> is self-closing"))
}

/// Inserts `fragment` at the body insertion point.
pub fn insert_block(part: &str, document: &str, fragment: &str) -> Result<String, PackagingError> {
    let at = insertion_offset(part, document)?;
    let mut out = String::with_capacity(document.len() + fragment.len());
    out.push_str(&document[..at]);
    out.push_str(fragment);
    out.push_str(&document[at..]);
    Ok(out)
}
