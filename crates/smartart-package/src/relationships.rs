//! Relationship manifests (`*.rels`).

use std::collections::HashSet;

use crate::{
    PackagingError,
    archive::ArchiveReader,
    parts::OFFICE_DOCUMENT_REL,
    xml::{self, Edits},
};

/// Relationship manifest of the package itself.
pub const PACKAGE_RELS_PART: &str = "_rels/.rels";

const DEFAULT_MAIN_PART: &str = "word/document.xml";

const RELATIONSHIPS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// A single relationship entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
}

/// A parsed relationship manifest.
#[derive(Debug)]
pub struct Relationships<'a> {
    text: &'a str,
    entries: Vec<Relationship>,
    insert_at: Option<usize>,
    root_range: std::ops::Range<usize>,
}

impl<'a> Relationships<'a> {
    pub fn parse(part: &str, text: &'a str) -> Result<Self, PackagingError> {
        let doc = xml::parse(part, text)?;
        let root = doc.root_element();
        if root.tag_name().name() != "Relationships" {
            return Err(PackagingError::malformed(part, "root is not <Relationships>"));
        }

        let entries = root
            .children()
            .filter(|node| node.is_element() && node.tag_name().name() == "Relationship")
            .map(|node| Relationship {
                id: node.attribute("Id").unwrap_or_default().to_string(),
                rel_type: node.attribute("Type").unwrap_or_default().to_string(),
                target: node.attribute("Target").unwrap_or_default().to_string(),
            })
            .collect();

        Ok(Self {
            text,
            entries,
            insert_at: xml::end_tag_start(text, root),
            root_range: root.range(),
        })
    }

    pub fn entries(&self) -> &[Relationship] {
        &self.entries
    }

    pub fn ids(&self) -> HashSet<&str> {
        self.entries.iter().map(|rel| rel.id.as_str()).collect()
    }

    /// Target of the first relationship of the given type.
    pub fn target_of_type(&self, rel_type: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|rel| rel.rel_type == rel_type)
            .map(|rel| rel.target.as_str())
    }

    /// Highest `N` among ids of the form `rIdN`, or 0.
    pub fn max_numeric_id(&self) -> u32 {
        self.entries
            .iter()
            .filter_map(|rel| rel.id.strip_prefix("rId")?.parse().ok())
            .max()
            .unwrap_or(0)
    }

    /// Returns the manifest with `additions` appended.
    pub fn with_relationships(&self, additions: &[Relationship]) -> String {
        let fragment: String = additions
            .iter()
            .map(|rel| {
                format!(
                    r#"<Relationship Id="{}" Type="{}" Target="{}"/>"#,
                    xml::escape_attr(&rel.id),
                    xml::escape_attr(&rel.rel_type),
                    xml::escape_attr(&rel.target),
                )
            })
            .collect();
        if fragment.is_empty() {
            return self.text.to_string();
        }

        let mut edits = Edits::new();
        match self.insert_at {
            Some(at) => edits.insert(at, fragment),
            None => {
                let open = &self.text[self.root_range.clone()];
                let open = open.trim_end_matches("/>").trim_end();
                edits.replace(
                    self.root_range.clone(),
                    format!("{open}>{fragment}</Relationships>"),
                );
            }
        }
        edits.apply(self.text)
    }
}

/// An empty manifest, for parts that had no relationships.
pub fn empty_manifest() -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>{}<Relationships xmlns="{RELATIONSHIPS_NS}"></Relationships>"#,
        "\n"
    )
}

/// Manifest path for a part: `word/document.xml` gives `word/_rels/document.xml.rels`.
pub fn rels_path_for(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{dir}/_rels/{file}.rels"),
        None => format!("_rels/{part}.rels"),
    }
}

/// Resolves a relationship target against the part that owns the manifest.
///
/// Absolute targets start at the package root.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(absolute) = target.strip_prefix('/') {
        return absolute.to_string();
    }

    let mut segments: Vec<&str> = match source_part.rsplit_once('/') {
        Some((dir, _)) => dir.split('/').collect(),
        None => Vec::new(),
    };
    for segment in target.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            segment => segments.push(segment),
        }
    }
    segments.join("/")
}

/// Target of a part in `dir` as written from a manifest owned by `source_part`.
pub fn relative_target(source_part: &str, part: &str) -> String {
    match source_part.rsplit_once('/') {
        Some((dir, _)) => part
            .strip_prefix(dir)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(str::to_string)
            .unwrap_or_else(|| format!("/{part}")),
        None => part.to_string(),
    }
}

/// Part name of the main document, from the package relationships.
///
/// Falls back to `word/document.xml` when the package does not say.
pub fn main_document_part(reader: &mut ArchiveReader<'_>) -> Result<String, PackagingError> {
    let Some(bytes) = reader.read(PACKAGE_RELS_PART)? else {
        return Ok(DEFAULT_MAIN_PART.to_string());
    };
    let text = xml::decode(PACKAGE_RELS_PART, &bytes)?;
    let rels = Relationships::parse(PACKAGE_RELS_PART, text)?;
    Ok(rels
        .target_of_type(OFFICE_DOCUMENT_REL)
        .map(|target| resolve_target("", target))
        .unwrap_or_else(|| DEFAULT_MAIN_PART.to_string()))
}
