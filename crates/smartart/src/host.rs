//! The host document: ordinary body content and the plain save path.
//!
//! A [`HostDocument`] is a base package plus a list of blocks to append to
//! its body. Saving splices the blocks in before the trailing section
//! properties and rewrites only the main document part; every other entry
//! is copied raw. Diagram blocks are written as empty slots whose byte
//! offsets are reported back, so the patcher can fill them in without
//! searching the text.

use std::{fs, path::Path};

use log::debug;

use smartart_package::{
    PackagingError, PlaceholderToken, Slot,
    archive::{ArchiveReader, ArchiveWriter},
    escape_attr, escape_text, placement, relationships,
};

use smartart_core::{InputError, semantic::first_invalid_char};

use crate::SmartArtError;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// A block appended to the host body.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Block {
    Paragraph { text: String, style: Option<String> },
    Diagram(PlaceholderToken),
}

impl Block {
    fn to_xml(&self) -> String {
        match self {
            Self::Paragraph { text, style } => {
                let properties = style
                    .as_deref()
                    .map(|style| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, escape_attr(style)))
                    .unwrap_or_default();
                format!(
                    r#"<w:p xmlns:w="{W_NS}">{properties}<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
                    escape_text(text)
                )
            }
            Self::Diagram(_) => String::new(),
        }
    }
}

/// Phase-1 output: the archive and where each diagram belongs.
#[derive(Debug)]
pub struct Serialized {
    pub archive: Vec<u8>,
    pub slots: Vec<Slot>,
}

/// An Office document being extended with new body content.
#[derive(Debug, Clone)]
pub struct HostDocument {
    base: Vec<u8>,
    blocks: Vec<Block>,
}

impl HostDocument {
    /// A minimal, empty WordprocessingML document.
    pub fn blank() -> Result<Self, SmartArtError> {
        let mut writer = ArchiveWriter::new();
        for (name, text) in blank::PARTS {
            writer.write(name, text.as_bytes()).map_err(PackagingError::from)?;
        }
        let base = writer.finish().map_err(PackagingError::from)?;
        Ok(Self {
            base,
            blocks: Vec::new(),
        })
    }

    /// Wraps an existing package.
    ///
    /// # Errors
    ///
    /// Fails if the bytes are not a ZIP archive or the main document part
    /// cannot be located.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SmartArtError> {
        {
            let mut reader = ArchiveReader::new(&bytes).map_err(PackagingError::from)?;
            let main_part = relationships::main_document_part(&mut reader)?;
            if !reader.contains(&main_part) {
                return Err(PackagingError::MissingPart(main_part).into());
            }
        }
        Ok(Self {
            base: bytes,
            blocks: Vec::new(),
        })
    }

    /// Reads a package from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SmartArtError> {
        Self::from_bytes(fs::read(path)?)
    }

    /// Appends a heading paragraph; `level` is clamped to 1..=9.
    ///
    /// # Errors
    ///
    /// [`InputError::InvalidText`] when `text` holds a character XML cannot
    /// carry; nothing is appended.
    pub fn add_heading(&mut self, text: impl Into<String>, level: u8) -> Result<(), SmartArtError> {
        self.push_paragraph(text.into(), Some(format!("Heading{}", level.clamp(1, 9))))
    }

    /// Appends a plain paragraph, rejected like [`Self::add_heading`].
    pub fn add_paragraph(&mut self, text: impl Into<String>) -> Result<(), SmartArtError> {
        self.push_paragraph(text.into(), None)
    }

    fn push_paragraph(&mut self, text: String, style: Option<String>) -> Result<(), SmartArtError> {
        if let Some(c) = first_invalid_char(&text) {
            return Err(InputError::InvalidText { code: u32::from(c) }.into());
        }
        self.blocks.push(Block::Paragraph { text, style });
        Ok(())
    }

    /// Reserves a body position for a diagram.
    pub(crate) fn reserve_slot(&mut self, token: PlaceholderToken) {
        self.blocks.push(Block::Diagram(token));
    }

    /// Number of blocks appended so far.
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Writes the package with all appended blocks, leaving diagram slots empty.
    pub fn serialize(&self) -> Result<Serialized, SmartArtError> {
        if self.blocks.is_empty() {
            return Ok(Serialized {
                archive: self.base.clone(),
                slots: Vec::new(),
            });
        }

        let mut reader = ArchiveReader::new(&self.base).map_err(PackagingError::from)?;
        let main_part = relationships::main_document_part(&mut reader)?;
        let bytes = reader
            .read(&main_part)
            .map_err(PackagingError::from)?
            .ok_or_else(|| PackagingError::MissingPart(main_part.clone()))?;
        let document = std::str::from_utf8(&bytes).map_err(|err| PackagingError::Malformed {
            part: main_part.clone(),
            reason: err.to_string(),
        })?;
        let document = document.strip_prefix('\u{feff}').unwrap_or(document);

        let at = placement::insertion_offset(&main_part, document)?;
        let mut out = String::with_capacity(document.len() + self.blocks.len() * 128);
        out.push_str(&document[..at]);
        let mut slots = Vec::new();
        for block in &self.blocks {
            if let Block::Diagram(token) = block {
                slots.push(Slot {
                    token: *token,
                    offset: out.len(),
                });
            }
            out.push_str(&block.to_xml());
        }
        out.push_str(&document[at..]);

        debug!(blocks = self.blocks.len(), slots = slots.len(); "Host body serialized");

        let mut writer = ArchiveWriter::new();
        let mut replacement = Some(out.into_bytes());
        writer
            .copy_from(&mut reader, |name| {
                if name == main_part {
                    replacement.take()
                } else {
                    None
                }
            })
            .map_err(PackagingError::from)?;
        let archive = writer.finish().map_err(PackagingError::from)?;

        Ok(Serialized { archive, slots })
    }

    /// Plain save: the serialized package with no diagram handling.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SmartArtError> {
        Ok(self.serialize()?.archive)
    }
}

mod blank {
    //! Parts of an empty document.

    pub(super) const PARTS: [(&str, &str); 6] = [
        ("[Content_Types].xml", CONTENT_TYPES),
        ("_rels/.rels", PACKAGE_RELS),
        ("word/document.xml", DOCUMENT),
        ("word/_rels/document.xml.rels", DOCUMENT_RELS),
        ("word/styles.xml", STYLES),
        ("word/settings.xml", SETTINGS),
    ];

    const CONTENT_TYPES: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"<Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/>"#,
        r#"<Override PartName="/word/settings.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml"/>"#,
        r#"</Types>"#,
    );

    const PACKAGE_RELS: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>"#,
        r#"</Relationships>"#,
    );

    const DOCUMENT: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
        r#"<w:body><w:sectPr><w:pgSz w:w="12240" w:h="15840"/>"#,
        r#"<w:pgMar w:top="1440" w:right="1440" w:bottom="1440" w:left="1440" w:header="720" w:footer="720" w:gutter="0"/>"#,
        r#"</w:sectPr></w:body></w:document>"#,
    );

    const DOCUMENT_RELS: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">"#,
        r#"<Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/>"#,
        r#"<Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings" Target="settings.xml"/>"#,
        r#"</Relationships>"#,
    );

    const STYLES: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
        r#"<w:pPr><w:keepNext/><w:spacing w:before="480" w:after="0"/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="32"/></w:rPr></w:style>"#,
        r#"<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/>"#,
        r#"<w:pPr><w:keepNext/><w:spacing w:before="200" w:after="0"/><w:outlineLvl w:val="1"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/></w:rPr></w:style>"#,
        r#"</w:styles>"#,
    );

    const SETTINGS: &str = concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        "\n",
        r#"<w:settings xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">"#,
        r#"<w:defaultTabStop w:val="720"/><w:characterSpacingControl w:val="doNotCompress"/>"#,
        r#"</w:settings>"#,
    );

    #[cfg(test)]
    mod tests {
        use super::*;

        const DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

        #[test]
        fn test_parts_are_well_formed() {
            for (name, text) in PARTS {
                assert!(text.starts_with(DECL), "{name} lacks a declaration");
                roxmltree::Document::parse(text).unwrap_or_else(|err| panic!("{name}: {err}"));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document_xml(archive: &[u8]) -> String {
        let mut reader = ArchiveReader::new(archive).unwrap();
        String::from_utf8(reader.read("word/document.xml").unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_blank_without_blocks_is_unchanged() {
        let host = HostDocument::blank().unwrap();
        assert_eq!(host.to_bytes().unwrap(), host.base);
    }

    #[test]
    fn test_blocks_land_before_sect_pr() {
        let mut host = HostDocument::blank().unwrap();
        host.add_heading("Title", 2).unwrap();
        host.add_paragraph("a < b").unwrap();

        let xml = document_xml(&host.to_bytes().unwrap());
        let heading = xml.find(r#"<w:pStyle w:val="Heading2"/>"#).unwrap();
        let paragraph = xml.find("a &lt; b").unwrap();
        let sect_pr = xml.find("<w:sectPr>").unwrap();
        assert!(heading < paragraph && paragraph < sect_pr);
        roxmltree::Document::parse(&xml).unwrap();
    }

    #[test]
    fn test_slots_point_between_blocks() {
        let mut host = HostDocument::blank().unwrap();
        host.add_paragraph("before").unwrap();
        host.reserve_slot(PlaceholderToken::new(0));
        host.add_paragraph("after").unwrap();
        host.reserve_slot(PlaceholderToken::new(1));

        let serialized = host.serialize().unwrap();
        let xml = document_xml(&serialized.archive);
        assert_eq!(serialized.slots.len(), 2);

        let first = serialized.slots[0];
        assert_eq!(first.token, PlaceholderToken::new(0));
        assert!(xml[..first.offset].ends_with("before</w:t></w:r></w:p>"));
        assert!(xml[first.offset..].starts_with(r#"<w:p xmlns:w"#));

        let second = serialized.slots[1];
        assert!(xml[second.offset..].starts_with("<w:sectPr>"));
    }

    #[test]
    fn test_from_bytes_rejects_non_archive() {
        assert!(HostDocument::from_bytes(b"plain text".to_vec()).is_err());
    }

    #[test]
    fn test_heading_level_is_clamped() {
        let mut host = HostDocument::blank().unwrap();
        host.add_heading("deep", 12).unwrap();
        let xml = document_xml(&host.to_bytes().unwrap());
        assert!(xml.contains(r#"w:val="Heading9""#));
    }

    #[test]
    fn test_control_characters_are_rejected_at_add_time() {
        let mut host = HostDocument::blank().unwrap();
        let err = host.add_paragraph("bell\u{7}").unwrap_err();
        assert!(matches!(err, SmartArtError::Input(InputError::InvalidText { code: 7 })));
        let err = host.add_heading("form\u{c}feed", 1).unwrap_err();
        assert!(matches!(err, SmartArtError::Input(InputError::InvalidText { code: 0xc })));
        assert_eq!(host.block_count(), 0);
    }

    #[test]
    fn test_carriage_return_is_kept() {
        let mut host = HostDocument::blank().unwrap();
        host.add_paragraph("one\r\ntwo").unwrap();
        let xml = document_xml(&host.to_bytes().unwrap());
        let doc = roxmltree::Document::parse(&xml).unwrap();
        let text = doc.descendants().find(|node| node.has_tag_name((W_NS, "t"))).unwrap();
        assert_eq!(text.text(), Some("one\r\ntwo"));
    }
}
