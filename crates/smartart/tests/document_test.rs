//! Integration tests for the Document API: add, finalize, and the output
//! package.

mod common;

use std::fs;

use smartart::{
    Document, HostDocument, InputError, LabelTree, MemoryTemplates, PackagingError, SmartArtError, Topology,
    config::{AppConfig, DrawingConfig, DrawingPolicy, ExtentConfig, TemplateConfig},
    geometry::Extent,
};

use common::{connections, content_labels, entry, entry_names, templates};

fn document() -> Document {
    Document::with_host(HostDocument::blank().unwrap(), AppConfig::default(), templates())
}

#[test]
fn test_process_scenario() {
    let mut doc = document();
    doc.add_basic_process("P", ["a", "b", "c"], None).unwrap();
    let out = doc.to_bytes().unwrap();

    let data = entry(&out, "word/diagrams/data1.xml").expect("data part written");
    assert_eq!(content_labels(&data), ["a", "b", "c"]);
    assert_eq!(data.matches(r#"presName="node""#).count(), 3);
    assert_eq!(connections(&data, "parOf"), 3);
    assert!(data.contains(&common::layout_id(Topology::Process)));
}

#[test]
fn test_hierarchy_scenario() {
    let mut doc = document();
    doc.add_hierarchy(
        "H",
        vec![LabelTree::new("X", vec![LabelTree::leaf("Y"), LabelTree::leaf("Z")])],
        None,
    )
    .unwrap();
    let out = doc.to_bytes().unwrap();

    let data = entry(&out, "word/diagrams/data1.xml").unwrap();
    assert_eq!(content_labels(&data), ["X", "Y", "Z"]);
    // X hangs off the document point; Y and Z hang off X.
    assert_eq!(connections(&data, "parOf"), 3);
    assert_eq!(connections(&data, "presParOf"), 3);
}

#[test]
fn test_radial_scenario() {
    let mut doc = document();
    doc.add_radial("R", "Core", ["A", "B"], None).unwrap();
    let out = doc.to_bytes().unwrap();

    let data = entry(&out, "word/diagrams/data1.xml").unwrap();
    assert_eq!(content_labels(&data), ["Core", "A", "B"]);
    assert_eq!(data.matches(r#"presName="centerShape""#).count(), 1);
}

#[test]
fn test_manifest_counts_for_several_diagrams() {
    let mut doc = document();
    doc.add_basic_list("L", ["one", "two"], None).unwrap();
    doc.add_cycle("C", ["a", "b", "c"], None).unwrap();
    doc.add_pyramid("P", ["top", "base"], None).unwrap();

    let before = doc.host().to_bytes().unwrap();
    let types_before = entry(&before, "[Content_Types].xml").unwrap();
    let rels_before = entry(&before, "word/_rels/document.xml.rels").unwrap();

    let out = doc.to_bytes().unwrap();
    let types = entry(&out, "[Content_Types].xml").unwrap();
    let rels = entry(&out, "word/_rels/document.xml.rels").unwrap();

    assert_eq!(
        types.matches("<Override ").count() - types_before.matches("<Override ").count(),
        15
    );
    assert_eq!(
        rels.matches("<Relationship ").count() - rels_before.matches("<Relationship ").count(),
        12
    );

    let names = entry_names(&out);
    for n in 1..=3 {
        for prefix in ["data", "layout", "quickStyle", "colors", "drawing"] {
            let name = format!("word/diagrams/{prefix}{n}.xml");
            assert_eq!(names.iter().filter(|entry| **entry == name).count(), 1, "{name}");
        }
    }

    let body = entry(&out, "word/document.xml").unwrap();
    let ids: Vec<_> = body.match_indices(r#"r:dm=""#).collect();
    assert_eq!(ids.len(), 3);
    roxmltree::Document::parse(&body).unwrap();
}

#[test]
fn test_diagrams_follow_their_titles_in_order() {
    let mut doc = document();
    doc.host_mut().add_paragraph("Intro").unwrap();
    doc.add_basic_list("First", ["a"], None).unwrap();
    doc.host_mut().add_paragraph("Between").unwrap();
    doc.add_basic_process("Second", ["b"], None).unwrap();

    let body = entry(&doc.to_bytes().unwrap(), "word/document.xml").unwrap();
    let positions: Vec<usize> = ["Intro", "First", r#"name="Diagram 1""#, "Between", "Second", r#"name="Diagram 2""#, "<w:sectPr>"]
        .iter()
        .map(|needle| body.find(needle).unwrap_or_else(|| panic!("missing {needle}")))
        .collect();
    assert!(positions.windows(2).all(|pair| pair[0] < pair[1]), "{positions:?}");
}

#[test]
fn test_zero_diagrams_matches_plain_save() {
    let mut host = HostDocument::blank().unwrap();
    host.add_paragraph("Only text").unwrap();
    let plain = host.to_bytes().unwrap();

    let doc = Document::with_host(host, AppConfig::default(), templates());
    assert_eq!(doc.to_bytes().unwrap(), plain);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.docx");
    doc.finalize(&path).unwrap();
    assert_eq!(fs::read(&path).unwrap(), plain);
}

#[test]
fn test_compatibility_mode_is_forced() {
    let mut doc = document();
    doc.add_basic_list("L", ["x"], None).unwrap();
    let settings = entry(&doc.to_bytes().unwrap(), "word/settings.xml").unwrap();
    assert!(settings.contains(r#"w:name="compatibilityMode""#));
    assert!(settings.contains(r#"w:val="15""#));
}

#[test]
fn test_failed_add_leaves_document_untouched() {
    let mut doc = Document::with_host(
        HostDocument::blank().unwrap(),
        AppConfig::default(),
        MemoryTemplates::new().with(Topology::List, common::template_archive(Topology::List)),
    );

    let err = doc.add_basic_list("L", Vec::<String>::new(), None).unwrap_err();
    assert!(matches!(err, SmartArtError::Input(_)));

    let err = doc.add_basic_list("L", ["ok", "  "], None).unwrap_err();
    assert!(matches!(err, SmartArtError::Input(_)));

    let err = doc.add_cycle("C", ["a"], None).unwrap_err();
    assert!(matches!(err, SmartArtError::Template(_)));

    assert_eq!(doc.pending_count(), 0);
    assert_eq!(doc.host().block_count(), 0);
}

#[test]
fn test_control_characters_are_rejected_at_add_time() {
    let mut doc = document();

    let err = doc.add_basic_list("L", ["Step\u{1}One", "Tab\u{b}bed"], None).unwrap_err();
    assert!(matches!(
        err,
        SmartArtError::Input(InputError::InvalidCharacter { position: 0, code: 1 })
    ));
    let err = doc.add_cycle("Ti\u{2}tle", ["a"], None).unwrap_err();
    assert!(matches!(err, SmartArtError::Input(InputError::InvalidText { code: 2 })));
    let err = doc.host_mut().add_paragraph("bell\u{7}").unwrap_err();
    assert!(matches!(err, SmartArtError::Input(InputError::InvalidText { code: 7 })));

    assert_eq!(doc.pending_count(), 0);
    assert_eq!(doc.host().block_count(), 0);

    doc.add_basic_process("P", ["carriage\rreturn"], None).unwrap();
    let out = doc.to_bytes().unwrap();
    let data = entry(&out, "word/diagrams/data1.xml").unwrap();
    assert_eq!(content_labels(&data), ["carriage\rreturn"]);
}

#[test]
fn test_label_errors_win_over_missing_templates() {
    let mut doc = Document::with_host(HostDocument::blank().unwrap(), AppConfig::default(), MemoryTemplates::new());

    let err = doc.add_pyramid("P", ["top", " "], None).unwrap_err();
    assert!(matches!(err, SmartArtError::Input(InputError::EmptyLabel { position: 1 })));

    let err = doc.add_radial("R", "core\u{0}", ["a"], None).unwrap_err();
    assert!(matches!(
        err,
        SmartArtError::Input(InputError::InvalidCharacter { position: 0, code: 0 })
    ));

    let err = doc.add_pyramid("P", ["top"], None).unwrap_err();
    assert!(matches!(err, SmartArtError::Template(_)));
}

#[test]
fn test_failed_finalize_leaves_no_output() {
    // A host without a settings part cannot be patched.
    let blank = HostDocument::blank().unwrap().to_bytes().unwrap();
    let stripped = {
        use std::io::{Cursor, Write};
        let mut source = zip::ZipArchive::new(Cursor::new(&blank)).unwrap();
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for i in 0..source.len() {
            let file = source.by_index_raw(i).unwrap();
            if file.name() == "word/_rels/document.xml.rels" {
                continue;
            }
            zip.raw_copy_file(file).unwrap();
        }
        zip.start_file("word/_rels/document.xml.rels", zip::write::SimpleFileOptions::default())
            .unwrap();
        zip.write_all(br#"<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"/>"#)
            .unwrap();
        zip.finish().unwrap().into_inner()
    };

    let mut doc = Document::with_host(
        HostDocument::from_bytes(stripped).unwrap(),
        AppConfig::default(),
        templates(),
    );
    doc.add_basic_list("L", ["x"], None).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.docx");
    let err = doc.finalize(&path).unwrap_err();
    assert!(matches!(err, SmartArtError::Packaging(PackagingError::MissingPart(_))));
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_second_pass_continues_numbering() {
    let mut doc = document();
    doc.add_basic_list("L", ["x"], None).unwrap();
    let first = doc.to_bytes().unwrap();

    let mut doc = Document::with_host(
        HostDocument::from_bytes(first).unwrap(),
        AppConfig::default(),
        templates(),
    );
    doc.add_basic_process("P", ["y"], None).unwrap();
    let out = doc.to_bytes().unwrap();

    assert_eq!(content_labels(&entry(&out, "word/diagrams/data1.xml").unwrap()), ["x"]);
    assert_eq!(content_labels(&entry(&out, "word/diagrams/data2.xml").unwrap()), ["y"]);

    let body = entry(&out, "word/document.xml").unwrap();
    assert!(body.contains(r#"name="Diagram 2""#));
    let doc_pr_ids: Vec<_> = body.match_indices("<wp:docPr id=").collect();
    assert_eq!(doc_pr_ids.len(), 2);
}

#[test]
fn test_drawing_policy() {
    let mut doc = document();
    doc.add_basic_list("L", ["x"], None).unwrap();
    let drawing = entry(&doc.to_bytes().unwrap(), "word/diagrams/drawing1.xml").unwrap();
    assert_eq!(drawing, smartart_package::parts::EMPTY_DRAWING);

    let config = AppConfig::new(
        TemplateConfig::default(),
        DrawingConfig::new(DrawingPolicy::Template),
        ExtentConfig::default(),
    );
    let mut doc = Document::with_host(HostDocument::blank().unwrap(), config, templates());
    doc.add_basic_list("L", ["x"], None).unwrap();
    let out = doc.to_bytes().unwrap();
    let drawing = entry(&out, "word/diagrams/drawing1.xml").unwrap();
    assert!(drawing.contains(r#"data-topology="list""#));

    // Declared but unreferenced under either policy.
    assert!(entry(&out, "[Content_Types].xml").unwrap().contains("/word/diagrams/drawing1.xml"));
    assert!(!entry(&out, "word/_rels/document.xml.rels").unwrap().contains("drawing1.xml"));
    assert!(!entry(&out, "word/diagrams/data1.xml").unwrap().contains("drawing1.xml"));
}

#[test]
fn test_extents() {
    let mut doc = document();
    doc.add_basic_list("L", ["x"], None).unwrap();
    doc.add_hierarchy("T", vec![LabelTree::leaf("root")], None).unwrap();
    doc.add_cycle("C", ["a"], Some(Extent::from_inches(2.0, 1.0))).unwrap();

    let body = entry(&doc.to_bytes().unwrap(), "word/document.xml").unwrap();
    assert!(body.contains(r#"<wp:extent cx="5486400" cy="3200400"/>"#));
    assert!(body.contains(r#"<wp:extent cx="5486400" cy="4000000"/>"#));
    assert!(body.contains(r#"<wp:extent cx="1828800" cy="914400"/>"#));
}

#[test]
fn test_blank_title_adds_no_heading() {
    let mut doc = document();
    doc.add_basic_list("   ", ["x"], None).unwrap();
    assert_eq!(doc.host().block_count(), 1);

    doc.add_basic_list("Titled", ["y"], None).unwrap();
    assert_eq!(doc.host().block_count(), 3);
    assert_eq!(doc.pending_count(), 2);
}

#[test]
fn test_output_is_reproducible() {
    let build = || {
        let mut doc = document();
        doc.add_basic_process("P", ["a", "b"], None).unwrap();
        doc.to_bytes().unwrap()
    };
    assert_eq!(build(), build());
}

#[test]
fn test_directory_templates_load_identically_twice() {
    use smartart::{DirectoryTemplates, TemplateStore};

    let dir = tempfile::tempdir().unwrap();
    let store = DirectoryTemplates::new(dir.path());
    fs::write(store.path_for(Topology::Tree), common::template_archive(Topology::Tree)).unwrap();

    let first = store.load(Topology::Tree).unwrap();
    let second = store.load(Topology::Tree).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.metadata().layout_id, common::layout_id(Topology::Tree));
    assert_eq!(first.metadata().layout_category.as_deref(), Some("tree"));
}
