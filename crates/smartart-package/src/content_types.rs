//! The `[Content_Types].xml` manifest.

use std::collections::HashSet;

use crate::{
    PackagingError,
    xml::{self, Edits},
};

/// Archive entry name of the content-types manifest.
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

/// A parsed manifest, remembering where new overrides go.
#[derive(Debug)]
pub struct ContentTypes<'a> {
    text: &'a str,
    overrides: HashSet<String>,
    insert_at: Option<usize>,
    root_range: std::ops::Range<usize>,
}

impl<'a> ContentTypes<'a> {
    pub fn parse(text: &'a str) -> Result<Self, PackagingError> {
        let doc = xml::parse(CONTENT_TYPES_PART, text)?;
        let root = doc.root_element();
        if root.tag_name().name() != "Types" {
            return Err(PackagingError::malformed(CONTENT_TYPES_PART, "root is not <Types>"));
        }

        let overrides = root
            .children()
            .filter(|node| node.is_element() && node.tag_name().name() == "Override")
            .filter_map(|node| node.attribute("PartName"))
            .map(normalize)
            .collect();

        Ok(Self {
            text,
            overrides,
            insert_at: xml::end_tag_start(text, root),
            root_range: root.range(),
        })
    }

    /// Whether an override exists for `part_name` (with or without the leading `/`).
    ///
    /// Part names compare case-insensitively.
    pub fn has_override(&self, part_name: &str) -> bool {
        self.overrides.contains(&normalize(part_name))
    }

    /// Returns the manifest with an override appended for each `(part, content type)`.
    pub fn with_overrides<'p>(&self, additions: impl IntoIterator<Item = (&'p str, &'p str)>) -> String {
        let mut fragment = String::new();
        for (part, content_type) in additions {
            fragment.push_str(&format!(
                r#"<Override PartName="/{}" ContentType="{}"/>"#,
                xml::escape_attr(part.trim_start_matches('/')),
                xml::escape_attr(content_type),
            ));
        }
        if fragment.is_empty() {
            return self.text.to_string();
        }

        let mut edits = Edits::new();
        match self.insert_at {
            Some(at) => edits.insert(at, fragment),
            None => {
                // `<Types .../>`: open it up.
                let open = &self.text[self.root_range.clone()];
                let open = open.trim_end_matches("/>").trim_end();
                edits.replace(self.root_range.clone(), format!("{open}>{fragment}</Types>"));
            }
        }
        edits.apply(self.text)
    }
}

fn normalize(part_name: &str) -> String {
    format!("/{}", part_name.trim_start_matches('/')).to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/word/document.xml" ContentType="x"/>"#,
        r#"</Types>"#,
    );

    #[test]
    fn test_has_override_is_case_insensitive() {
        let types = ContentTypes::parse(MANIFEST).unwrap();
        assert!(types.has_override("/word/document.xml"));
        assert!(types.has_override("word/Document.xml"));
        assert!(!types.has_override("/word/diagrams/data1.xml"));
    }

    #[test]
    fn test_with_overrides_appends_before_end() {
        let types = ContentTypes::parse(MANIFEST).unwrap();
        let out = types.with_overrides([("word/diagrams/data1.xml", "ct/data")]);

        assert!(out.ends_with(
            r#"<Override PartName="/word/diagrams/data1.xml" ContentType="ct/data"/></Types>"#
        ));
        let reparsed = ContentTypes::parse(&out).unwrap();
        assert!(reparsed.has_override("/word/diagrams/data1.xml"));
        assert!(reparsed.has_override("/word/document.xml"));
    }

    #[test]
    fn test_with_overrides_opens_empty_root() {
        let text = r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#;
        let types = ContentTypes::parse(text).unwrap();
        let out = types.with_overrides([("/a.xml", "ct")]);
        assert!(ContentTypes::parse(&out).unwrap().has_override("/a.xml"));
    }

    #[test]
    fn test_no_additions_is_identity() {
        let types = ContentTypes::parse(MANIFEST).unwrap();
        assert_eq!(types.with_overrides([]), MANIFEST);
    }

    #[test]
    fn test_rejects_wrong_root() {
        assert!(ContentTypes::parse("<Relationships/>").is_err());
    }
}
