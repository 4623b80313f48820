//! SmartArt package plumbing.
//!
//! Office documents are ZIP archives following the Open Packaging
//! Conventions: every part is listed in `[Content_Types].xml` and wired to
//! its owner through a `_rels/*.rels` manifest. The usual document-writing
//! path cannot emit diagram parts correctly, so this crate works on the
//! finished archive instead:
//!
//! - [`template`] extracts the static diagram parts from pre-built template
//!   archives.
//! - [`placement`] finds where new body content belongs.
//! - [`patcher`] splices diagram parts, manifest entries and reference blocks
//!   into a finished archive.
//!
//! # Pipeline Position
//!
//! ```text
//! host document
//!     ↓ plain save (phase 1)
//! archive bytes + placeholder slots
//!     ↓ patch (phase 2, this crate)
//! archive bytes with diagram parts
//! ```

pub mod archive;
pub mod content_types;
pub mod parts;
pub mod patcher;
pub mod placement;
pub mod relationships;
pub mod settings;
pub mod template;

mod error;
mod xml;

pub use error::{PackagingError, TemplateError};
pub use patcher::{DiagramParts, PlaceholderToken, Slot, patch};
pub use template::TemplateBundle;
pub use xml::{escape_attr, escape_text};
