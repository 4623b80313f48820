//! Typed diagram graph.
//!
//! A SmartArt data model is two interlocked graphs:
//!
//! - the **content graph**: a [`NodeKind::Document`] root, one
//!   [`NodeKind::Content`] node per label and [`EdgeKind::ParentOf`] edges
//!   giving the label structure. Every content node owns exactly one
//!   [`NodeKind::ParentTransition`] and one [`NodeKind::SiblingTransition`]
//!   node, referenced by the `ParentOf` edge that attaches it.
//! - the **presentation graph**: one [`NodeKind::Presentation`] node per
//!   content node (plus one for the document root), tied to its content by a
//!   [`EdgeKind::PresentationOf`] edge and arranged by
//!   [`EdgeKind::PresentationParentOf`] edges that mirror the content
//!   structure with the same order indices.
//!
//! Without the presentation graph the viewer lays the diagram out with zero
//! height.
//!
//! # Pipeline Position
//!
//! ```text
//! DiagramSpec
//!     ↓ build (this module)
//! DiagramGraph
//!     ↓ synthesize
//! data{N}.xml
//! ```

mod builder;
mod graph_base;

pub use builder::{build, validate};

use crate::{identifier::ModelId, semantic::Topology};

use graph_base::GraphBase;

/// What a graph vertex stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// The single root of the content graph.
    Document,
    /// A vertex carrying one label.
    Content,
    /// Bookkeeping vertex for the edge into a content node.
    ParentTransition,
    /// Bookkeeping vertex for the gap after a content node.
    SiblingTransition,
    /// Mirror of a content (or document) vertex in the presentation graph.
    Presentation,
}

/// Layout role consumed by the static layout part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RoleHint {
    /// First, top layer of a pyramid.
    Apex,
    /// Center item of a hub.
    Center,
}

/// A graph vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    id: ModelId,
    kind: NodeKind,
    text: Option<String>,
    role: Option<RoleHint>,
}

impl GraphNode {
    pub fn new(id: ModelId, kind: NodeKind, text: Option<String>, role: Option<RoleHint>) -> Self {
        Self {
            id,
            kind,
            text,
            role,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Label text, present on content nodes only.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn role(&self) -> Option<RoleHint> {
        self.role
    }
}

/// What a graph edge expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    /// Content structure: parent (document or content) to child content.
    ParentOf,
    /// Content (or document) to its presentation node.
    PresentationOf,
    /// Presentation structure mirroring a `ParentOf` edge.
    PresentationParentOf,
}

/// The transition node pair referenced by a `ParentOf` edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransitionPair {
    pub parent: ModelId,
    pub sibling: ModelId,
}

/// A directed, ordered graph edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    id: ModelId,
    kind: EdgeKind,
    source: ModelId,
    destination: ModelId,
    source_order: usize,
    destination_order: usize,
    transitions: Option<TransitionPair>,
}

impl GraphEdge {
    pub fn new(
        id: ModelId,
        kind: EdgeKind,
        source: ModelId,
        destination: ModelId,
        source_order: usize,
        destination_order: usize,
        transitions: Option<TransitionPair>,
    ) -> Self {
        Self {
            id,
            kind,
            source,
            destination,
            source_order,
            destination_order,
            transitions,
        }
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    pub fn source(&self) -> ModelId {
        self.source
    }

    pub fn destination(&self) -> ModelId {
        self.destination
    }

    /// Position of the destination among the source's children.
    pub fn source_order(&self) -> usize {
        self.source_order
    }

    pub fn destination_order(&self) -> usize {
        self.destination_order
    }

    /// Transition pair; set on `ParentOf` edges only.
    pub fn transitions(&self) -> Option<TransitionPair> {
        self.transitions
    }
}

/// A complete content + presentation graph for one diagram.
#[derive(Debug)]
pub struct DiagramGraph {
    topology: Topology,
    root: ModelId,
    base: GraphBase,
}

impl DiagramGraph {
    fn new(topology: Topology, root: ModelId, base: GraphBase) -> Self {
        Self {
            topology,
            root,
            base,
        }
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// The document root node.
    pub fn root(&self) -> &GraphNode {
        self.base
            .node(self.root)
            .expect("Root node is inserted first by the builder")
    }

    pub fn node(&self, id: ModelId) -> Option<&GraphNode> {
        self.base.node(id)
    }

    /// All nodes in serialization order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.base.nodes()
    }

    pub fn nodes_count(&self) -> usize {
        self.base.nodes_count()
    }

    /// All edges in serialization order.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.base.edges()
    }

    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &GraphNode> {
        self.base.nodes().filter(move |node| node.kind() == kind)
    }

    pub fn edges_of_kind(&self, kind: EdgeKind) -> impl Iterator<Item = &GraphEdge> {
        self.base.edges().filter(move |edge| edge.kind() == kind)
    }

    /// Content nodes in depth-first label order.
    pub fn content_nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes_of_kind(NodeKind::Content)
    }

    /// Content children of `parent`, ordered by their order index.
    pub fn children(&self, parent: ModelId) -> Vec<&GraphNode> {
        let mut edges: Vec<_> = self
            .base
            .outgoing_edges(parent)
            .filter(|edge| edge.kind() == EdgeKind::ParentOf)
            .collect();
        edges.sort_by_key(|edge| edge.source_order());
        edges
            .into_iter()
            .filter_map(|edge| self.base.node(edge.destination()))
            .collect()
    }

    /// The `ParentOf` edge attaching `node` to its parent.
    pub fn parent_edge(&self, node: ModelId) -> Option<&GraphEdge> {
        self.base
            .incoming_edges(node)
            .find(|edge| edge.kind() == EdgeKind::ParentOf)
    }

    /// The presentation node mirroring a content or document node.
    pub fn presentation_of(&self, node: ModelId) -> Option<&GraphNode> {
        self.base
            .outgoing_edges(node)
            .find(|edge| edge.kind() == EdgeKind::PresentationOf)
            .and_then(|edge| self.base.node(edge.destination()))
    }

    /// The content or document node a presentation node mirrors.
    pub fn presented_by(&self, presentation: ModelId) -> Option<&GraphNode> {
        self.base
            .incoming_edges(presentation)
            .find(|edge| edge.kind() == EdgeKind::PresentationOf)
            .and_then(|edge| self.base.node(edge.source()))
    }

    /// The `ParentOf` edge that references `transition` in its pair.
    pub fn edge_for_transition(&self, transition: ModelId) -> Option<&GraphEdge> {
        self.base.edge_for_transition(transition)
    }

    /// `ParentOf` edges whose source is a content node.
    ///
    /// These are the label-to-label links; the remaining `ParentOf` edges
    /// attach top-level labels to the document root.
    pub fn content_links(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges_of_kind(EdgeKind::ParentOf)
            .filter(move |edge| edge.source() != self.root)
    }
}
