//! Shared fixtures: in-memory template archives and output inspection.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use smartart::{MemoryTemplates, Topology};
use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

pub const DGM_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";
pub const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";

/// Layout id declared by the fixture template for `topology`.
pub fn layout_id(topology: Topology) -> String {
    format!("urn:test/layout/{}", topology.template_name())
}

/// A template archive shaped like one saved by Word.
pub fn template_archive(topology: Topology) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    let mut add = |name: &str, body: String| {
        zip.start_file(name, options).unwrap();
        zip.write_all(body.as_bytes()).unwrap();
    };

    add(
        "word/document.xml",
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body/></w:document>"#.to_string(),
    );
    add(
        "word/diagrams/data1.xml",
        format!(r#"<dgm:dataModel xmlns:dgm="{DGM_NS}"/>"#),
    );
    add(
        "word/diagrams/layout1.xml",
        format!(
            r#"<dgm:layoutDef xmlns:dgm="{DGM_NS}" uniqueId="{}"><dgm:catLst><dgm:cat type="{}" pri="1000"/></dgm:catLst></dgm:layoutDef>"#,
            layout_id(topology),
            topology,
        ),
    );
    add(
        "word/diagrams/quickStyle1.xml",
        format!(r#"<dgm:styleDef xmlns:dgm="{DGM_NS}" uniqueId="urn:test/quickstyle/simple1"/>"#),
    );
    add(
        "word/diagrams/colors1.xml",
        format!(r#"<dgm:colorsDef xmlns:dgm="{DGM_NS}" uniqueId="urn:test/colors/accent1_2"/>"#),
    );
    add(
        "word/diagrams/drawing1.xml",
        format!(r#"<dsp:drawing xmlns:dsp="http://schemas.microsoft.com/office/drawing/2008/diagram" data-topology="{topology}"/>"#),
    );

    zip.finish().unwrap().into_inner()
}

/// Templates for every topology.
pub fn templates() -> MemoryTemplates {
    Topology::ALL
        .into_iter()
        .fold(MemoryTemplates::new(), |store, topology| {
            store.with(topology, template_archive(topology))
        })
}

/// Reads one archive entry as text, or `None` when absent.
pub fn entry(archive: &[u8], name: &str) -> Option<String> {
    let mut zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    let mut file = zip.by_name(name).ok()?;
    let mut text = String::new();
    file.read_to_string(&mut text).unwrap();
    Some(text)
}

pub fn entry_names(archive: &[u8]) -> Vec<String> {
    let zip = ZipArchive::new(Cursor::new(archive)).unwrap();
    zip.file_names().map(str::to_string).collect()
}

/// Label texts of the content points in a data part, in order.
pub fn content_labels(data: &str) -> Vec<String> {
    let doc = roxmltree::Document::parse(data).unwrap();
    doc.descendants()
        .filter(|node| node.has_tag_name((DGM_NS, "pt")) && node.attribute("type").is_none())
        .filter_map(|pt| {
            pt.descendants()
                .find(|node| node.has_tag_name((A_NS, "t")))
                .and_then(|t| t.text())
                .map(str::to_string)
        })
        .collect()
}

/// Number of `<dgm:cxn>` elements of the given type.
pub fn connections(data: &str, kind: &str) -> usize {
    let doc = roxmltree::Document::parse(data).unwrap();
    doc.descendants()
        .filter(|node| node.has_tag_name((DGM_NS, "cxn")) && node.attribute("type") == Some(kind))
        .count()
}
