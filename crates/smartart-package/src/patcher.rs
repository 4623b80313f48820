//! The Package Patcher.
//!
//! Phase 2 of a save: takes the archive the host wrote (with an empty slot
//! in the body for every diagram) and produces the final archive. Every
//! entry is copied unchanged except the main document part, its
//! relationship manifest, the content-types manifest and the settings part.
//! Diagram parts are appended after the copied entries.

use std::collections::{HashMap, HashSet};

use log::{debug, info};

use smartart_core::geometry::Extent;

use crate::{
    PackagingError, TemplateBundle,
    archive::{ArchiveReader, ArchiveWriter},
    content_types::{CONTENT_TYPES_PART, ContentTypes},
    parts::{DIAGRAM_FOLDER, PartKind, SETTINGS_REL},
    relationships::{self, Relationship, Relationships},
    settings::{self, REGENERATION_COMPAT_MODE},
    xml::{self, Edits},
};

/// Marks the body position reserved for one pending diagram.
///
/// The wrapped value is the diagram's index in the pending queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceholderToken(usize);

impl PlaceholderToken {
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Byte offset of a token's slot in the main document part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub token: PlaceholderToken,
    pub offset: usize,
}

/// Everything the patcher needs for one diagram.
#[derive(Debug, Clone, Copy)]
pub struct DiagramParts<'a> {
    pub token: PlaceholderToken,
    /// Synthesized data model.
    pub data: &'a [u8],
    pub bundle: &'a TemplateBundle,
    /// Cached drawing to write; either the bundle's or a stub.
    pub drawing: &'a [u8],
    pub extent: Extent,
}

impl DiagramParts<'_> {
    fn bytes(&self, kind: PartKind) -> &[u8] {
        match kind {
            PartKind::Data => self.data,
            PartKind::Layout => self.bundle.layout(),
            PartKind::Style => self.bundle.style(),
            PartKind::Colors => self.bundle.colors(),
            PartKind::Drawing => self.drawing,
        }
    }
}

/// Hands out diagram numbers, relationship ids and drawing object ids,
/// each starting above the highest value already in the package.
#[derive(Debug)]
struct PackageAllocator {
    next_diagram: u32,
    next_relationship: u32,
    next_drawing: u32,
}

impl PackageAllocator {
    fn seed(names: &[String], diagram_dir: &str, rels: &Relationships<'_>, document: &roxmltree::Document<'_>) -> Self {
        let max_diagram = names
            .iter()
            .filter_map(|name| {
                let (dir, file) = name.rsplit_once('/')?;
                (dir == diagram_dir).then_some(file)
            })
            .filter_map(PartKind::parse_file_name)
            .map(|(_, n)| n)
            .max()
            .unwrap_or(0);

        let max_drawing = document
            .descendants()
            .filter(|node| node.is_element() && node.tag_name().name() == "docPr")
            .filter_map(|node| node.attribute("id")?.parse::<u32>().ok())
            .max()
            .unwrap_or(0);

        let allocator = Self {
            next_diagram: max_diagram + 1,
            next_relationship: rels.max_numeric_id() + 1,
            next_drawing: max_drawing + 1,
        };
        debug!(
            diagram = allocator.next_diagram,
            relationship = allocator.next_relationship,
            drawing = allocator.next_drawing;
            "Package allocator seeded"
        );
        allocator
    }

    fn next_diagram(&mut self) -> u32 {
        let n = self.next_diagram;
        self.next_diagram += 1;
        n
    }

    fn next_relationship(&mut self) -> String {
        let id = format!("rId{}", self.next_relationship);
        self.next_relationship += 1;
        id
    }

    fn next_drawing(&mut self) -> u32 {
        let id = self.next_drawing;
        self.next_drawing += 1;
        id
    }
}

/// The four relationship ids a reference block points at.
#[derive(Debug)]
struct ReferenceIds {
    data: String,
    layout: String,
    style: String,
    colors: String,
}

/// Inline drawing paragraph referencing a diagram's parts.
///
/// Carries its own namespace declarations so it is valid wherever it lands.
fn reference_block(ids: &ReferenceIds, extent: Extent, drawing_id: u32, number: u32) -> String {
    format!(
        concat!(
            r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#,
            r#" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#,
            r#" xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing""#,
            r#" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main""#,
            r#" xmlns:dgm="http://schemas.openxmlformats.org/drawingml/2006/diagram">"#,
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:effectExtent l="0" t="0" r="0" b="0"/>"#,
            r#"<wp:docPr id="{drawing_id}" name="Diagram {number}"/>"#,
            r#"<wp:cNvGraphicFramePr/>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/diagram">"#,
            r#"<dgm:relIds r:dm="{dm}" r:lo="{lo}" r:qs="{qs}" r:cs="{cs}"/>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r></w:p>"#,
        ),
        cx = extent.width(),
        cy = extent.height(),
        drawing_id = drawing_id,
        number = number,
        dm = ids.data,
        lo = ids.layout,
        qs = ids.style,
        cs = ids.colors,
    )
}

fn read_part(reader: &mut ArchiveReader<'_>, name: &str) -> Result<Vec<u8>, PackagingError> {
    reader
        .read(name)?
        .ok_or_else(|| PackagingError::MissingPart(name.to_string()))
}

/// Pairs every diagram with its slot offset, in diagram order.
fn resolve_slots<'d, 'a>(
    slots: &[Slot],
    diagrams: &'d [DiagramParts<'a>],
    part: &str,
    document: &str,
) -> Result<Vec<(usize, &'d DiagramParts<'a>)>, PackagingError> {
    let mut by_token = HashMap::with_capacity(slots.len());
    for slot in slots {
        if !document.is_char_boundary(slot.offset) {
            return Err(PackagingError::malformed(
                part,
                format!("slot offset {} is outside the body text", slot.offset),
            ));
        }
        if by_token.insert(slot.token, slot.offset).is_some() {
            return Err(PackagingError::malformed(
                part,
                format!("diagram #{} has more than one slot", slot.token.index()),
            ));
        }
    }

    let mut resolved = Vec::with_capacity(diagrams.len());
    for diagram in diagrams {
        let offset = by_token
            .remove(&diagram.token)
            .ok_or(PackagingError::UnresolvedPlaceholder(diagram.token.index()))?;
        resolved.push((offset, diagram));
    }

    // A slot nobody claimed means its add never completed.
    if let Some(token) = by_token.keys().min() {
        return Err(PackagingError::UnresolvedPlaceholder(token.index()));
    }
    Ok(resolved)
}

/// Folds `diagrams` into the archive the host wrote.
///
/// `slots` holds the byte offsets, in the main document part, reserved for
/// each diagram's reference block. Offsets refer to the part's text as
/// written by phase 1.
pub fn patch(
    archive: &[u8],
    slots: &[Slot],
    diagrams: &[DiagramParts<'_>],
) -> Result<Vec<u8>, PackagingError> {
    info!(diagrams = diagrams.len(); "Patching package");

    let mut reader = ArchiveReader::new(archive)?;
    let names = reader.names();
    let existing_names: HashSet<String> = names.iter().map(|name| name.to_ascii_lowercase()).collect();

    let main_part = relationships::main_document_part(&mut reader)?;
    let main_rels_part = relationships::rels_path_for(&main_part);
    let main_dir = main_part.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("");
    let diagram_dir = if main_dir.is_empty() {
        DIAGRAM_FOLDER.to_string()
    } else {
        format!("{main_dir}/{DIAGRAM_FOLDER}")
    };

    let document_bytes = read_part(&mut reader, &main_part)?;
    let document_text = xml::decode(&main_part, &document_bytes)?;
    let document = xml::parse(&main_part, document_text)?;

    let rels_bytes = reader.read(&main_rels_part)?;
    let empty_rels;
    let rels_text = match &rels_bytes {
        Some(bytes) => xml::decode(&main_rels_part, bytes)?,
        None => {
            empty_rels = relationships::empty_manifest();
            empty_rels.as_str()
        }
    };
    let rels = Relationships::parse(&main_rels_part, rels_text)?;
    let existing_ids = rels.ids();

    let types_bytes = read_part(&mut reader, CONTENT_TYPES_PART)?;
    let types_text = xml::decode(CONTENT_TYPES_PART, &types_bytes)?;
    let content_types = ContentTypes::parse(types_text)?;

    let settings_part = rels
        .target_of_type(SETTINGS_REL)
        .map(|target| relationships::resolve_target(&main_part, target))
        .ok_or_else(|| PackagingError::MissingPart("settings".to_string()))?;
    let settings_bytes = read_part(&mut reader, &settings_part)?;
    let settings_text = xml::decode(&settings_part, &settings_bytes)?;

    let placements = resolve_slots(slots, diagrams, &main_part, document_text)?;
    let mut allocator = PackageAllocator::seed(&names, &diagram_dir, &rels, &document);

    let mut document_edits = Edits::new();
    let mut new_parts: Vec<(String, &[u8])> = Vec::with_capacity(diagrams.len() * 5);
    let mut overrides: Vec<(String, &'static str)> = Vec::with_capacity(diagrams.len() * 5);
    let mut new_rels: Vec<Relationship> = Vec::with_capacity(diagrams.len() * 4);

    for (offset, diagram) in placements {
        let number = allocator.next_diagram();
        let mut rel_ids = Vec::with_capacity(4);

        for kind in PartKind::ALL {
            let part = format!("{diagram_dir}/{}", kind.file_name(number));
            if existing_names.contains(&part.to_ascii_lowercase()) || content_types.has_override(&part) {
                return Err(PackagingError::PartCollision(part));
            }

            if let Some(rel_type) = kind.relationship_type() {
                let id = allocator.next_relationship();
                if existing_ids.contains(id.as_str()) {
                    return Err(PackagingError::RelationshipCollision(id));
                }
                rel_ids.push(id.clone());
                new_rels.push(Relationship {
                    id,
                    rel_type,
                    target: relationships::relative_target(&main_part, &part),
                });
            }

            overrides.push((part.clone(), kind.content_type()));
            new_parts.push((part, diagram.bytes(kind)));
        }

        let [data, layout, style, colors]: [String; 4] = rel_ids
            .try_into()
            .map_err(|_| PackagingError::malformed(&main_rels_part, "diagram relationships incomplete"))?;
        let ids = ReferenceIds {
            data,
            layout,
            style,
            colors,
        };
        let drawing_id = allocator.next_drawing();
        debug!(
            diagram = number,
            token = diagram.token.index(),
            data = ids.data.as_str(),
            drawing_id;
            "Diagram parts allocated"
        );
        document_edits.insert(offset, reference_block(&ids, diagram.extent, drawing_id, number));
    }

    let mut replacements: HashMap<String, Vec<u8>> = HashMap::new();
    replacements.insert(main_part.clone(), document_edits.apply(document_text).into_bytes());
    replacements.insert(
        CONTENT_TYPES_PART.to_string(),
        content_types
            .with_overrides(overrides.iter().map(|(part, ct)| (part.as_str(), *ct)))
            .into_bytes(),
    );
    replacements.insert(
        settings_part.clone(),
        settings::force_compatibility_mode(&settings_part, settings_text, REGENERATION_COMPAT_MODE)?
            .into_bytes(),
    );
    let rels_out = rels.with_relationships(&new_rels).into_bytes();

    let mut writer = ArchiveWriter::new();
    match rels_bytes {
        Some(_) => {
            replacements.insert(main_rels_part.clone(), rels_out);
            writer.copy_from(&mut reader, |name| replacements.remove(name))?;
        }
        None => {
            writer.copy_from(&mut reader, |name| replacements.remove(name))?;
            writer.write(&main_rels_part, &rels_out)?;
        }
    }
    for (part, bytes) in &new_parts {
        writer.write(part, bytes)?;
    }

    let out = writer.finish()?;
    info!(parts = new_parts.len(), bytes = out.len(); "Package patched");
    Ok(out)
}


#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeSet;

    use proptest::prelude::*;

    use super::tests::{bundle, host, parts, read};
    use super::*;

    // ===================
    // Strategies
    // ===================

    fn existing_numbers_strategy() -> impl Strategy<Value = BTreeSet<usize>> {
        prop::collection::btree_set(1usize..20, 0..6)
    }

    fn existing_rel_ids_strategy() -> impl Strategy<Value = BTreeSet<usize>> {
        prop::collection::btree_set(2usize..40, 0..8)
    }

    // ===================
    // Property Test Functions
    // ===================

    /// New parts and relationships never collide with existing ones, and
    /// numbering continues above the highest existing value.
    fn check_allocation_is_fresh(
        numbers: BTreeSet<usize>,
        rel_ids: BTreeSet<usize>,
        diagrams: usize,
    ) -> Result<(), TestCaseError> {
        let extra: Vec<(String, Vec<u8>)> = numbers
            .iter()
            .map(|n| (format!("word/diagrams/data{n}.xml"), b"<x/>".to_vec()))
            .collect();
        let extra_refs: Vec<(&str, &[u8])> = extra
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.as_slice()))
            .collect();
        let rels_extra: String = rel_ids
            .iter()
            .map(|n| format!(r#"<Relationship Id="rId{n}" Type="t" Target="x{n}.xml"/>"#))
            .collect();

        let bundle = bundle();
        let (archive, offset) = host(&extra_refs, &rels_extra);
        let tokens: Vec<usize> = (0..diagrams).collect();
        let slots: Vec<Slot> = tokens
            .iter()
            .map(|&index| Slot {
                token: PlaceholderToken::new(index),
                offset,
            })
            .collect();

        let out = patch(&archive, &slots, &parts(&bundle, &tokens)).unwrap();

        let reader = ArchiveReader::new(&out).unwrap();
        let names = reader.names();
        let unique: BTreeSet<&String> = names.iter().collect();
        prop_assert_eq!(unique.len(), names.len());

        let first = numbers.last().copied().unwrap_or(0) + 1;
        for n in first..first + diagrams {
            let data_path = format!("word/diagrams/data{n}.xml");
            let drawing_path = format!("word/diagrams/drawing{n}.xml");
            prop_assert!(reader.contains(&data_path));
            prop_assert!(reader.contains(&drawing_path));
        }

        let rels = read(&out, "word/_rels/document.xml.rels");
        let parsed = Relationships::parse("rels", &rels).unwrap();
        let ids: Vec<&str> = parsed.entries().iter().map(|rel| rel.id.as_str()).collect();
        let unique_ids: BTreeSet<&str> = ids.iter().copied().collect();
        prop_assert_eq!(unique_ids.len(), ids.len());
        prop_assert_eq!(ids.len(), 1 + rel_ids.len() + 4 * diagrams);

        let document = read(&out, "word/document.xml");
        prop_assert!(roxmltree::Document::parse(&document).is_ok());
        prop_assert_eq!(document.matches("<wp:docPr ").count(), diagrams);
        Ok(())
    }

    proptest! {
        #[test]
        fn allocation_is_fresh(
            numbers in existing_numbers_strategy(),
            rel_ids in existing_rel_ids_strategy(),
            diagrams in 1usize..5,
        ) {
            check_allocation_is_fresh(numbers, rel_ids, diagrams)?;
        }
    }
}
