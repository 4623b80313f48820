//! Template Bundle extraction.
//!
//! Each topology has a pre-built template archive (authored once with a full
//! office suite) holding one diagram. Its layout, quick style, colors and
//! cached drawing parts are reused verbatim for every diagram of that
//! topology; only the data part is synthesized.

use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use log::debug;
use roxmltree::Document;

use smartart_core::semantic::Topology;

use crate::{TemplateError, archive::ArchiveReader, parts::PartKind};

/// Identifiers the root point of a data model must declare.
///
/// Read from the `uniqueId` attribute and first `dgm:catLst/dgm:cat` of the
/// layout, style and colors definitions.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LayoutMetadata {
    pub layout_id: String,
    pub layout_category: Option<String>,
    pub style_id: Option<String>,
    pub style_category: Option<String>,
    pub colors_id: Option<String>,
    pub colors_category: Option<String>,
}

/// The four static parts of one topology's template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBundle {
    topology: Topology,
    layout: Vec<u8>,
    style: Vec<u8>,
    colors: Vec<u8>,
    drawing: Vec<u8>,
    metadata: LayoutMetadata,
}

impl TemplateBundle {
    /// Extracts the static parts from a template archive.
    ///
    /// Parts are looked up under any `diagrams/` folder by file name prefix;
    /// when a template holds several diagrams the first one in archive order
    /// wins.
    pub fn from_archive(topology: Topology, bytes: &[u8]) -> Result<Self, TemplateError> {
        let unreadable = |source| TemplateError::Unreadable { topology, source };
        let mut reader = ArchiveReader::new(bytes).map_err(unreadable)?;

        let mut found: HashMap<PartKind, String> = HashMap::new();
        for name in reader.names() {
            let Some((dir, file)) = name.rsplit_once('/') else {
                continue;
            };
            if !dir.ends_with(crate::parts::DIAGRAM_FOLDER) {
                continue;
            }
            if let Some((kind, _)) = PartKind::parse_file_name(file) {
                found.entry(kind).or_insert(name);
            }
        }

        let mut read = |kind: PartKind| -> Result<Vec<u8>, TemplateError> {
            let missing = TemplateError::MissingPart {
                topology,
                part: kind.file_prefix(),
            };
            let name = found.get(&kind).ok_or(missing)?;
            reader
                .read(name)
                .map_err(|source| TemplateError::Unreadable { topology, source })?
                .ok_or(TemplateError::MissingPart {
                    topology,
                    part: kind.file_prefix(),
                })
        };

        let layout = read(PartKind::Layout)?;
        let style = read(PartKind::Style)?;
        let colors = read(PartKind::Colors)?;
        let drawing = read(PartKind::Drawing)?;

        let (layout_id, layout_category) = definition_ids(topology, PartKind::Layout, &layout)?;
        let layout_id = layout_id.ok_or(TemplateError::Malformed {
            topology,
            part: PartKind::Layout.file_prefix(),
            reason: "layout definition has no uniqueId".to_string(),
        })?;
        let (style_id, style_category) = definition_ids(topology, PartKind::Style, &style)?;
        let (colors_id, colors_category) = definition_ids(topology, PartKind::Colors, &colors)?;

        debug!(topology:% = topology, layout = layout_id.as_str(); "Template bundle extracted");

        Ok(Self {
            topology,
            layout,
            style,
            colors,
            drawing,
            metadata: LayoutMetadata {
                layout_id,
                layout_category,
                style_id,
                style_category,
                colors_id,
                colors_category,
            },
        })
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn layout(&self) -> &[u8] {
        &self.layout
    }

    pub fn style(&self) -> &[u8] {
        &self.style
    }

    pub fn colors(&self) -> &[u8] {
        &self.colors
    }

    pub fn drawing(&self) -> &[u8] {
        &self.drawing
    }

    pub fn metadata(&self) -> &LayoutMetadata {
        &self.metadata
    }
}

/// `uniqueId` and first category `type` of a definition part.
fn definition_ids(
    topology: Topology,
    kind: PartKind,
    bytes: &[u8],
) -> Result<(Option<String>, Option<String>), TemplateError> {
    let malformed = |reason: String| TemplateError::Malformed {
        topology,
        part: kind.file_prefix(),
        reason,
    };
    let text = std::str::from_utf8(bytes).map_err(|err| malformed(err.to_string()))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let doc = Document::parse(text).map_err(|err| malformed(err.to_string()))?;
    let root = doc.root_element();

    let unique_id = root
        .attribute("uniqueId")
        .filter(|id| !id.is_empty())
        .map(str::to_string);
    let category = root
        .children()
        .find(|node| node.is_element() && node.tag_name().name() == "catLst")
        .and_then(|list| {
            list.children()
                .find(|node| node.is_element() && node.tag_name().name() == "cat")
        })
        .and_then(|cat| cat.attribute("type"))
        .map(str::to_string);

    Ok((unique_id, category))
}

/// A source of template bundles.
pub trait TemplateStore {
    fn load(&self, topology: Topology) -> Result<TemplateBundle, TemplateError>;
}

/// Templates stored as `<template_name>.docx` files in one directory.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Archive path for a topology.
    pub fn path_for(&self, topology: Topology) -> PathBuf {
        self.dir.join(format!("{}.docx", topology.template_name()))
    }
}

impl TemplateStore for DirectoryTemplates {
    fn load(&self, topology: Topology) -> Result<TemplateBundle, TemplateError> {
        let path = self.path_for(topology);
        let bytes = fs::read(&path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => TemplateError::NotFound {
                topology,
                path: path.clone(),
            },
            _ => TemplateError::Unreadable {
                topology,
                source: err.into(),
            },
        })?;
        TemplateBundle::from_archive(topology, &bytes)
    }
}

/// Template archives held in memory, keyed by topology.
#[derive(Debug, Clone, Default)]
pub struct MemoryTemplates {
    archives: HashMap<Topology, Vec<u8>>,
}

impl MemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, topology: Topology, archive: Vec<u8>) {
        self.archives.insert(topology, archive);
    }

    pub fn with(mut self, topology: Topology, archive: Vec<u8>) -> Self {
        self.insert(topology, archive);
        self
    }
}

impl TemplateStore for MemoryTemplates {
    fn load(&self, topology: Topology) -> Result<TemplateBundle, TemplateError> {
        let bytes = self
            .archives
            .get(&topology)
            .ok_or_else(|| TemplateError::NotFound {
                topology,
                path: PathBuf::from(format!("{}.docx", topology.template_name())),
            })?;
        TemplateBundle::from_archive(topology, bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::ArchiveWriter;

    const LAYOUT: &str = concat!(
        r#"<dgm:layoutDef xmlns:dgm="http://schemas.openxmlformats.org/drawingml/2006/diagram" "#,
        r#"uniqueId="urn:microsoft.com/office/officeart/2005/8/layout/default">"#,
        r#"<dgm:catLst><dgm:cat type="list" pri="400"/><dgm:cat type="other"/></dgm:catLst>"#,
        r#"</dgm:layoutDef>"#,
    );

    fn template(layout: &str, with_drawing: bool) -> Vec<u8> {
        let mut writer = ArchiveWriter::new();
        writer.write("word/document.xml", b"<w:document/>").unwrap();
        writer.write("word/diagrams/data1.xml", b"<dgm:dataModel/>").unwrap();
        writer.write("word/diagrams/layout1.xml", layout.as_bytes()).unwrap();
        writer
            .write(
                "word/diagrams/quickStyle1.xml",
                br#"<dgm:styleDef xmlns:dgm="d" uniqueId="qs"><dgm:catLst><dgm:cat type="simple"/></dgm:catLst></dgm:styleDef>"#,
            )
            .unwrap();
        writer
            .write(
                "word/diagrams/colors1.xml",
                br#"<dgm:colorsDef xmlns:dgm="d" uniqueId="cs"/>"#,
            )
            .unwrap();
        if with_drawing {
            writer.write("word/diagrams/drawing1.xml", b"<dsp:drawing/>").unwrap();
            writer
                .write("word/diagrams/_rels/drawing1.xml.rels", b"<Relationships/>")
                .unwrap();
        }
        writer.finish().unwrap()
    }

    #[test]
    fn test_extracts_static_parts_and_metadata() {
        let bundle = TemplateBundle::from_archive(Topology::List, &template(LAYOUT, true)).unwrap();

        assert_eq!(bundle.topology(), Topology::List);
        assert_eq!(bundle.layout(), LAYOUT.as_bytes());
        assert_eq!(bundle.drawing(), b"<dsp:drawing/>");

        let meta = bundle.metadata();
        assert_eq!(meta.layout_id, "urn:microsoft.com/office/officeart/2005/8/layout/default");
        assert_eq!(meta.layout_category.as_deref(), Some("list"));
        assert_eq!(meta.style_id.as_deref(), Some("qs"));
        assert_eq!(meta.style_category.as_deref(), Some("simple"));
        assert_eq!(meta.colors_id.as_deref(), Some("cs"));
        assert_eq!(meta.colors_category, None);
    }

    #[test]
    fn test_missing_drawing_is_missing_part() {
        let err = TemplateBundle::from_archive(Topology::Cycle, &template(LAYOUT, false)).unwrap_err();
        assert!(matches!(
            err,
            TemplateError::MissingPart {
                topology: Topology::Cycle,
                part: "drawing"
            }
        ));
    }

    #[test]
    fn test_layout_without_unique_id_is_malformed() {
        let layout = r#"<dgm:layoutDef xmlns:dgm="d"/>"#;
        let err = TemplateBundle::from_archive(Topology::List, &template(layout, true)).unwrap_err();
        assert!(matches!(err, TemplateError::Malformed { part: "layout", .. }));
    }

    #[test]
    fn test_garbage_is_unreadable() {
        let err = TemplateBundle::from_archive(Topology::Hub, b"garbage").unwrap_err();
        assert!(matches!(err, TemplateError::Unreadable { .. }));
        assert_eq!(err.topology(), Topology::Hub);
    }

    #[test]
    fn test_memory_store_loads_identically_twice() {
        let store = MemoryTemplates::new().with(Topology::Pyramid, template(LAYOUT, true));
        let first = store.load(Topology::Pyramid).unwrap();
        let second = store.load(Topology::Pyramid).unwrap();
        assert_eq!(first, second);
        assert!(matches!(
            store.load(Topology::Tree),
            Err(TemplateError::NotFound { .. })
        ));
    }

    #[test]
    fn test_directory_store_reports_missing_file() {
        let store = DirectoryTemplates::new("/definitely/not/here");
        let err = store.load(Topology::Process).unwrap_err();
        match err {
            TemplateError::NotFound { path, .. } => {
                assert!(path.ends_with("basic_process.docx"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
