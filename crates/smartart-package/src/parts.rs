//! Names, content types and relationship types of the five diagram parts.

use std::fmt;

const REL_BASE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Relationship type of the main document part in `_rels/.rels`.
pub const OFFICE_DOCUMENT_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";

/// Relationship type of the settings part.
pub const SETTINGS_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";

/// Package-relative folder holding diagram parts, relative to the main part.
pub const DIAGRAM_FOLDER: &str = "diagrams";

/// One of the five parts making up a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartKind {
    Data,
    Layout,
    Style,
    Colors,
    Drawing,
}

impl PartKind {
    /// All kinds in the order parts are written to the archive.
    pub const ALL: [PartKind; 5] = [
        PartKind::Data,
        PartKind::Layout,
        PartKind::Style,
        PartKind::Colors,
        PartKind::Drawing,
    ];

    /// The four static kinds supplied by a template.
    pub const STATIC: [PartKind; 4] = [
        PartKind::Layout,
        PartKind::Style,
        PartKind::Colors,
        PartKind::Drawing,
    ];

    /// File name stem used inside the diagram folder.
    pub fn file_prefix(self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Layout => "layout",
            Self::Style => "quickStyle",
            Self::Colors => "colors",
            Self::Drawing => "drawing",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Data => "application/vnd.openxmlformats-officedocument.drawingml.diagramData+xml",
            Self::Layout => {
                "application/vnd.openxmlformats-officedocument.drawingml.diagramLayout+xml"
            }
            Self::Style => "application/vnd.openxmlformats-officedocument.drawingml.diagramStyle+xml",
            Self::Colors => {
                "application/vnd.openxmlformats-officedocument.drawingml.diagramColors+xml"
            }
            Self::Drawing => "application/vnd.ms-office.drawingml.diagramDrawing+xml",
        }
    }

    /// Relationship type from the main part, if the part is referenced directly.
    ///
    /// The cached drawing gets no relationship at all; it is stored and
    /// declared in the content types but nothing points at it.
    pub fn relationship_type(self) -> Option<String> {
        let suffix = match self {
            Self::Data => "diagramData",
            Self::Layout => "diagramLayout",
            Self::Style => "diagramQuickStyle",
            Self::Colors => "diagramColors",
            Self::Drawing => return None,
        };
        Some(format!("{REL_BASE}/{suffix}"))
    }

    /// File name for diagram number `n`, e.g. `quickStyle3.xml`.
    pub fn file_name(self, n: u32) -> String {
        format!("{}{n}.xml", self.file_prefix())
    }

    /// Recognizes a diagram file name and returns its kind and number.
    pub fn parse_file_name(name: &str) -> Option<(PartKind, u32)> {
        let stem = name.strip_suffix(".xml")?;
        Self::ALL.into_iter().find_map(|kind| {
            let digits = stem.strip_prefix(kind.file_prefix())?;
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            digits.parse().ok().map(|n| (kind, n))
        })
    }
}

impl fmt::Display for PartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_prefix())
    }
}

/// Minimal cached drawing; the viewer regenerates shapes from the data part.
pub const EMPTY_DRAWING: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
    "\n",
    r#"<dsp:drawing xmlns:dgm="http://schemas.openxmlformats.org/drawingml/2006/diagram" "#,
    r#"xmlns:dsp="http://schemas.microsoft.com/office/drawing/2008/diagram" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main">"#,
    r#"<dsp:spTree><dsp:nvGrpSpPr><dsp:cNvPr id="0" name=""/><dsp:cNvGrpSpPr/></dsp:nvGrpSpPr>"#,
    r#"<dsp:grpSpPr/></dsp:spTree></dsp:drawing>"#,
);
