//! TOML document manifests.
//!
//! A manifest lists the blocks of the output document in order:
//!
//! ```toml
//! title = "Quarterly review"
//!
//! [[block]]
//! kind = "paragraph"
//! text = "Where we are:"
//!
//! [[block]]
//! kind = "process"
//! title = "Release"
//! items = ["Plan", "Build", "Ship"]
//!
//! [[block]]
//! kind = "tree"
//! title = "Team"
//! nodes = [{ label = "Lead", children = [{ label = "Dev" }, { label = "QA" }] }]
//! height = 3000000
//! ```

use std::ops::Range;

use log::debug;
use serde::Deserialize;
use thiserror::Error;

use smartart::{Document, LabelTree, SmartArtError, Topology, geometry::Extent};

/// A manifest that could not be deserialized.
#[derive(Debug, Error)]
#[error("Invalid manifest {path}: {message}")]
pub struct ManifestError {
    pub path: String,
    pub message: String,
    pub span: Option<Range<usize>>,
    pub src: String,
}

/// A parsed document manifest.
#[derive(Debug, Deserialize)]
pub struct Manifest {
    /// Level-1 heading placed once, ahead of all blocks.
    #[serde(default)]
    pub title: Option<String>,

    #[serde(default, rename = "block")]
    pub blocks: Vec<Block>,
}

/// Labels of a flat diagram, with an optional size in EMU. A missing side
/// keeps the configured default for the topology.
#[derive(Debug, Deserialize)]
pub struct Flat {
    #[serde(default)]
    pub title: String,
    pub items: Vec<String>,
    #[serde(default)]
    pub width: Option<u64>,
    #[serde(default)]
    pub height: Option<u64>,
}

/// One entry of the `[[block]]` array.
#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Block {
    Heading {
        text: String,
        #[serde(default = "default_heading_level")]
        level: u8,
    },
    Paragraph {
        text: String,
    },
    List(Flat),
    Process(Flat),
    Cycle(Flat),
    Pyramid(Flat),
    Tree {
        #[serde(default)]
        title: String,
        nodes: Vec<LabelTree>,
        #[serde(default)]
        width: Option<u64>,
        #[serde(default)]
        height: Option<u64>,
    },
    Hub {
        #[serde(default)]
        title: String,
        center: String,
        spokes: Vec<String>,
        #[serde(default)]
        width: Option<u64>,
        #[serde(default)]
        height: Option<u64>,
    },
}

fn default_heading_level() -> u8 {
    1
}

impl Manifest {
    /// Parses manifest text read from `path`.
    pub fn parse(path: &str, src: &str) -> Result<Self, ManifestError> {
        toml::from_str(src).map_err(|err: toml::de::Error| ManifestError {
            path: path.to_string(),
            message: err.message().to_string(),
            span: err.span(),
            src: src.to_string(),
        })
    }

    /// Appends the manifest's blocks to `doc`, in order.
    ///
    /// Stops at the first block that fails.
    pub fn apply(self, doc: &mut Document) -> Result<(), SmartArtError> {
        if let Some(title) = self.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            doc.host_mut().add_heading(title, 1)?;
        }

        for (index, block) in self.blocks.into_iter().enumerate() {
            debug!(index; "Applying manifest block");
            block.apply(doc)?;
        }
        Ok(())
    }
}

impl Block {
    fn apply(self, doc: &mut Document) -> Result<(), SmartArtError> {
        match self {
            Block::Heading { text, level } => doc.host_mut().add_heading(text, level)?,
            Block::Paragraph { text } => doc.host_mut().add_paragraph(text)?,
            Block::List(flat) => {
                let extent = extent(doc, Topology::List, flat.width, flat.height);
                doc.add_basic_list(&flat.title, flat.items, extent)?;
            }
            Block::Process(flat) => {
                let extent = extent(doc, Topology::Process, flat.width, flat.height);
                doc.add_basic_process(&flat.title, flat.items, extent)?;
            }
            Block::Cycle(flat) => {
                let extent = extent(doc, Topology::Cycle, flat.width, flat.height);
                doc.add_cycle(&flat.title, flat.items, extent)?;
            }
            Block::Pyramid(flat) => {
                let extent = extent(doc, Topology::Pyramid, flat.width, flat.height);
                doc.add_pyramid(&flat.title, flat.items, extent)?;
            }
            Block::Tree {
                title,
                nodes,
                width,
                height,
            } => {
                let extent = extent(doc, Topology::Tree, width, height);
                doc.add_hierarchy(&title, nodes, extent)?;
            }
            Block::Hub {
                title,
                center,
                spokes,
                width,
                height,
            } => {
                let extent = extent(doc, Topology::Hub, width, height);
                doc.add_radial(&title, &center, spokes, extent)?;
            }
        }
        Ok(())
    }
}

fn extent(doc: &Document, topology: Topology, width: Option<u64>, height: Option<u64>) -> Option<Extent> {
    if width.is_none() && height.is_none() {
        return None;
    }
    let default = doc.config().extent().for_topology(topology);
    Some(Extent::new(
        width.unwrap_or(default.width()),
        height.unwrap_or(default.height()),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_every_block_kind() {
        let src = r#"
title = "Doc"

[[block]]
kind = "heading"
text = "Intro"
level = 2

[[block]]
kind = "paragraph"
text = "Body"

[[block]]
kind = "list"
title = "L"
items = ["a", "b"]

[[block]]
kind = "process"
items = ["a"]
width = 100

[[block]]
kind = "cycle"
items = ["a"]

[[block]]
kind = "pyramid"
items = ["a"]

[[block]]
kind = "tree"
nodes = [{ label = "root", children = [{ label = "leaf" }] }]

[[block]]
kind = "hub"
center = "c"
spokes = ["s"]
"#;
        let manifest = Manifest::parse("doc.toml", src).unwrap();
        assert_eq!(manifest.title.as_deref(), Some("Doc"));
        assert_eq!(manifest.blocks.len(), 8);
        assert!(matches!(&manifest.blocks[0], Block::Heading { level: 2, .. }));
        assert!(matches!(&manifest.blocks[3], Block::Process(Flat { width: Some(100), height: None, .. })));
        match &manifest.blocks[6] {
            Block::Tree { nodes, .. } => {
                assert_eq!(nodes[0].label(), "root");
                assert_eq!(nodes[0].children()[0].label(), "leaf");
            }
            other => panic!("unexpected block {other:?}"),
        }
    }

    #[test]
    fn test_unknown_kind_has_span() {
        let src = "[[block]]\nkind = \"table\"\ntext = \"x\"\n";
        let err = Manifest::parse("bad.toml", src).unwrap_err();
        assert_eq!(err.path, "bad.toml");
        let span = err.span.expect("span");
        assert!(span.end <= src.len());
    }

    #[test]
    fn test_missing_items_is_error() {
        let src = "[[block]]\nkind = \"list\"\ntitle = \"L\"\n";
        assert!(Manifest::parse("bad.toml", src).is_err());
    }

    #[test]
    fn test_partial_size_keeps_default_side() {
        use smartart::{HostDocument, MemoryTemplates, config::AppConfig};

        let doc = Document::with_host(HostDocument::blank().unwrap(), AppConfig::default(), MemoryTemplates::new());
        let extent = extent(&doc, Topology::Tree, None, Some(1000)).unwrap();
        assert_eq!(extent, Extent::new(5_486_400, 1000));
        assert_eq!(super::extent(&doc, Topology::List, None, None), None);
    }

    #[test]
    fn test_title_heading_is_added_once() {
        use smartart::{HostDocument, MemoryTemplates, config::AppConfig};

        let src = "title = \"Doc\"\n\n[[block]]\nkind = \"paragraph\"\ntext = \"a\"\n\n[[block]]\nkind = \"paragraph\"\ntext = \"b\"\n";
        let mut doc = Document::with_host(HostDocument::blank().unwrap(), AppConfig::default(), MemoryTemplates::new());
        Manifest::parse("doc.toml", src).unwrap().apply(&mut doc).unwrap();
        assert_eq!(doc.host().block_count(), 3);
    }

    #[test]
    fn test_control_character_paragraph_is_an_input_error() {
        use smartart::{HostDocument, InputError, MemoryTemplates, config::AppConfig};

        let src = "[[block]]\nkind = \"paragraph\"\ntext = \"bell\\u0007\"\n";
        let mut doc = Document::with_host(HostDocument::blank().unwrap(), AppConfig::default(), MemoryTemplates::new());
        let err = Manifest::parse("doc.toml", src).unwrap().apply(&mut doc).unwrap_err();
        assert!(matches!(err, SmartArtError::Input(InputError::InvalidText { code: 7 })));
    }
}
