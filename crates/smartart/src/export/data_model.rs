//! The Data Model Synthesizer.
//!
//! Writes a [`DiagramGraph`] as a `dgm:dataModel` part. The viewer's parser
//! expects every point (`dgm:pt`) before any connection (`dgm:cxn`), with
//! the document point first. Output depends only on the graph and the
//! template metadata, so the same graph always yields the same bytes.

use std::fmt::Write;

use log::trace;

use smartart_core::{
    graph::{DiagramGraph, EdgeKind, GraphEdge, GraphNode, NodeKind, RoleHint},
    identifier::ModelId,
};
use smartart_package::{escape_attr, escape_text, template::LayoutMetadata};

const DGM_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/diagram";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Text body with no runs, used by the document and transition points.
const EMPTY_TEXT: &str =
    r#"<dgm:t><a:bodyPr/><a:lstStyle/><a:p><a:endParaRPr lang="en-US"/></a:p></dgm:t>"#;

/// Serializes `graph` into data-part bytes.
///
/// The document point declares the layout, style and color definitions
/// from `metadata`; presentation-of connections carry the layout id.
pub fn synthesize(graph: &DiagramGraph, metadata: &LayoutMetadata) -> Vec<u8> {
    let mut writer = DataModelWriter::new(graph, metadata);
    writer.write();
    let out = writer.finish();
    trace!(topology:% = graph.topology(), bytes = out.len(); "Data model synthesized");
    out.into_bytes()
}

struct DataModelWriter<'a> {
    graph: &'a DiagramGraph,
    metadata: &'a LayoutMetadata,
    out: String,
    /// Content nodes in order, for presentation style indices.
    content: Vec<ModelId>,
}

impl<'a> DataModelWriter<'a> {
    fn new(graph: &'a DiagramGraph, metadata: &'a LayoutMetadata) -> Self {
        Self {
            graph,
            metadata,
            out: String::with_capacity(graph.nodes_count() * 160),
            content: graph.content_nodes().map(GraphNode::id).collect(),
        }
    }

    fn write(&mut self) {
        self.out
            .push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        self.out.push('\n');
        let _ = write!(
            self.out,
            r#"<dgm:dataModel xmlns:dgm="{DGM_NS}" xmlns:a="{A_NS}" xmlns:r="{R_NS}">"#
        );

        self.out.push_str("<dgm:ptLst>");
        let root = self.graph.root().id();
        self.write_document_point(root);
        for node in self.graph.nodes().filter(|node| node.id() != root) {
            self.write_point(node);
        }
        self.out.push_str("</dgm:ptLst>");

        self.out.push_str("<dgm:cxnLst>");
        for edge in self.graph.edges() {
            self.write_connection(edge);
        }
        self.out.push_str("</dgm:cxnLst>");

        self.out.push_str("<dgm:bg/><dgm:whole/></dgm:dataModel>");
    }

    fn finish(self) -> String {
        self.out
    }

    fn write_document_point(&mut self, id: ModelId) {
        let meta = self.metadata;
        let mut attrs = format!(r#" loTypeId="{}""#, escape_attr(&meta.layout_id));
        let optional = [
            ("loCatId", &meta.layout_category),
            ("qsTypeId", &meta.style_id),
            ("qsCatId", &meta.style_category),
            ("csTypeId", &meta.colors_id),
            ("csCatId", &meta.colors_category),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                let _ = write!(attrs, r#" {name}="{}""#, escape_attr(value));
            }
        }

        let _ = write!(
            self.out,
            r#"<dgm:pt modelId="{id}" type="doc"><dgm:prSet{attrs} phldr="1"/><dgm:spPr/>{EMPTY_TEXT}</dgm:pt>"#
        );
    }

    fn write_point(&mut self, node: &GraphNode) {
        let id = node.id();
        match node.kind() {
            NodeKind::Document => {}
            NodeKind::Content => {
                let text = escape_text(node.text().unwrap_or_default());
                let _ = write!(
                    self.out,
                    concat!(
                        r#"<dgm:pt modelId="{id}"><dgm:prSet phldrT="[Text]"/><dgm:spPr/>"#,
                        r#"<dgm:t><a:bodyPr/><a:lstStyle/><a:p><a:r><a:rPr lang="en-US"/>"#,
                        r#"<a:t>{text}</a:t></a:r></a:p></dgm:t></dgm:pt>"#,
                    ),
                    id = id,
                    text = text,
                );
            }
            NodeKind::ParentTransition | NodeKind::SiblingTransition => {
                let kind = if node.kind() == NodeKind::ParentTransition {
                    "parTrans"
                } else {
                    "sibTrans"
                };
                let cxn = self
                    .graph
                    .edge_for_transition(id)
                    .map(|edge| format!(r#" cxnId="{}""#, edge.id()))
                    .unwrap_or_default();
                let _ = write!(
                    self.out,
                    r#"<dgm:pt modelId="{id}" type="{kind}"{cxn}><dgm:prSet/><dgm:spPr/>{EMPTY_TEXT}</dgm:pt>"#
                );
            }
            NodeKind::Presentation => self.write_presentation_point(node),
        }
    }

    fn write_presentation_point(&mut self, node: &GraphNode) {
        let id = node.id();
        let Some(source) = self.graph.presented_by(id) else {
            return;
        };

        if source.kind() == NodeKind::Document {
            let _ = write!(
                self.out,
                concat!(
                    r#"<dgm:pt modelId="{id}" type="pres"><dgm:prSet presAssocID="{source}" "#,
                    r#"presName="diagram" presStyleCnt="0"><dgm:presLayoutVars><dgm:dir/>"#,
                    r#"<dgm:resizeHandles val="exact"/></dgm:presLayoutVars></dgm:prSet>"#,
                    r#"<dgm:spPr/></dgm:pt>"#,
                ),
                id = id,
                source = source.id(),
            );
            return;
        }

        let name = match source.role() {
            Some(RoleHint::Center) => "centerShape",
            _ => "node",
        };
        let index = self
            .content
            .iter()
            .position(|content| *content == source.id())
            .unwrap_or_default();
        let _ = write!(
            self.out,
            concat!(
                r#"<dgm:pt modelId="{id}" type="pres"><dgm:prSet presAssocID="{source}" "#,
                r#"presName="{name}" presStyleLbl="node1" presStyleIdx="{index}" "#,
                r#"presStyleCnt="{count}"/><dgm:spPr/></dgm:pt>"#,
            ),
            id = id,
            source = source.id(),
            name = name,
            index = index,
            count = self.content.len(),
        );
    }

    fn write_connection(&mut self, edge: &GraphEdge) {
        let id = edge.id();
        let (src, dest) = (edge.source(), edge.destination());
        let (src_ord, dest_ord) = (edge.source_order(), edge.destination_order());

        match edge.kind() {
            EdgeKind::ParentOf => {
                let transitions = edge
                    .transitions()
                    .map(|pair| format!(r#" parTransId="{}" sibTransId="{}""#, pair.parent, pair.sibling))
                    .unwrap_or_default();
                let _ = write!(
                    self.out,
                    r#"<dgm:cxn modelId="{id}" type="parOf" srcId="{src}" destId="{dest}" srcOrd="{src_ord}" destOrd="{dest_ord}"{transitions}/>"#
                );
            }
            EdgeKind::PresentationOf => {
                // The document point is tied to its presentation by presAssocID.
                if src == self.graph.root().id() {
                    return;
                }
                let _ = write!(
                    self.out,
                    r#"<dgm:cxn modelId="{id}" type="presOf" srcId="{src}" destId="{dest}" srcOrd="{src_ord}" destOrd="{dest_ord}" presId="{}"/>"#,
                    escape_attr(&self.metadata.layout_id),
                );
            }
            EdgeKind::PresentationParentOf => {
                let _ = write!(
                    self.out,
                    r#"<dgm:cxn modelId="{id}" type="presParOf" srcId="{src}" destId="{dest}" srcOrd="{src_ord}" destOrd="{dest_ord}" presId="{}"/>"#,
                    escape_attr(&self.metadata.layout_id),
                );
            }
        }
    }
}
