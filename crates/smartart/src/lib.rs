//! SmartArt - native, editable diagrams for Word documents.
//!
//! Builds SmartArt diagrams (lists, processes, trees, cycles, pyramids and
//! hub-and-spoke) from plain labels and embeds them in `.docx` packages.
//! Diagrams stay editable in Word: the package carries a real diagram data
//! model plus the layout, style and color definitions of a pre-built
//! template for each topology.
//!
//! # Pipeline
//!
//! ```text
//! labels ─► DiagramSpec ─► DiagramGraph ─► data part ┐
//!                                   template bundle ─┼─► patched package
//!                          host body + slots (phase 1)┘
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use smartart::{Document, LabelTree, config::AppConfig};
//!
//! let mut doc = Document::new(AppConfig::default()).unwrap();
//! doc.host_mut().add_paragraph("Team structure:").unwrap();
//! doc.add_hierarchy(
//!     "Org",
//!     vec![LabelTree::new("CEO", vec![LabelTree::leaf("CTO"), LabelTree::leaf("CFO")])],
//!     None,
//! )
//! .unwrap();
//! doc.finalize("org.docx").unwrap();
//! ```

pub mod config;

mod document;
mod error;
mod export;
mod host;
mod templates;

pub use smartart_core::{InputError, geometry, graph, identifier, semantic};
pub use smartart_package::{PackagingError, TemplateBundle, TemplateError};
pub use smartart_package::template::{DirectoryTemplates, MemoryTemplates, TemplateStore};

pub use document::Document;
pub use error::SmartArtError;
pub use export::synthesize;
pub use host::{HostDocument, Serialized};
pub use semantic::{DiagramSpec, LabelArena, LabelTree, Topology};
pub use templates::TemplateCache;
