//! Diagram graph builder.
//!
//! Turns a [`DiagramSpec`] into a [`DiagramGraph`]. Labels are validated up
//! front, so identifiers are only drawn from the allocator for requests that
//! will succeed.

use std::collections::HashMap;

use log::{debug, trace};

use super::{
    DiagramGraph, EdgeKind, GraphEdge, GraphNode, NodeKind, RoleHint, TransitionPair,
    graph_base::GraphBase,
};
use crate::{
    InputError,
    identifier::{IdAllocator, ModelId},
    semantic::{DiagramSpec, LabelTree, Payload, Topology, first_invalid_char},
};

/// Builds the content and presentation graph for a diagram request.
///
/// # Errors
///
/// Returns the errors of [`validate`]. Structural emptiness is rejected earlier, when the
/// [`DiagramSpec`] is constructed.
///
/// # Examples
///
/// ```
/// use smartart_core::{
///     graph::{self, EdgeKind},
///     identifier::IdAllocator,
///     semantic::{DiagramSpec, Topology},
/// };
///
/// let spec = DiagramSpec::sequence(Topology::Process, "P", ["a", "b", "c"]).unwrap();
/// let graph = graph::build(&spec, &mut IdAllocator::new()).unwrap();
///
/// assert_eq!(graph.content_nodes().count(), 3);
/// assert_eq!(graph.edges_of_kind(EdgeKind::ParentOf).count(), 3);
/// ```
pub fn build(spec: &DiagramSpec, ids: &mut IdAllocator) -> Result<DiagramGraph, InputError> {
    validate(spec)?;

    let mut builder = GraphBuilder::new(ids);
    let root = builder.add_node(NodeKind::Document, None, None);

    match spec.payload() {
        Payload::Sequence(items) => {
            let apex = spec.topology() == Topology::Pyramid;
            for (order, label) in items.iter().enumerate() {
                let role = (apex && order == 0).then_some(RoleHint::Apex);
                builder.attach(root, order, label, role);
            }
        }
        Payload::Tree(roots) => {
            for (order, tree) in roots.iter().enumerate() {
                builder.attach_tree(root, order, tree);
            }
        }
        Payload::Hub { center, spokes } => {
            let center = builder.attach(root, 0, center, Some(RoleHint::Center));
            for (order, label) in spokes.iter().enumerate() {
                builder.attach(center, order, label, None);
            }
        }
    }

    builder.derive_presentation(root);

    let graph = DiagramGraph::new(spec.topology(), root, builder.base);
    debug!(
        topology:% = spec.topology(),
        nodes = graph.nodes_count(),
        content = graph.content_nodes().count();
        "Diagram graph built"
    );
    Ok(graph)
}

/// Checks every label of a request without allocating identifiers.
///
/// # Errors
///
/// Returns [`InputError::EmptyLabel`] for a label that is blank after
/// trimming and [`InputError::InvalidCharacter`] for one holding a character
/// XML 1.0 cannot carry. Both report the depth-first position of the first
/// offending label.
pub fn validate(spec: &DiagramSpec) -> Result<(), InputError> {
    let mut labels: Vec<&str> = Vec::new();
    match spec.payload() {
        Payload::Sequence(items) => labels.extend(items.iter().map(String::as_str)),
        Payload::Tree(roots) => {
            for root in roots {
                collect_tree_labels(root, &mut labels);
            }
        }
        Payload::Hub { center, spokes } => {
            labels.push(center);
            labels.extend(spokes.iter().map(String::as_str));
        }
    }

    for (position, label) in labels.iter().enumerate() {
        if label.trim().is_empty() {
            return Err(InputError::EmptyLabel { position });
        }
        if let Some(c) = first_invalid_char(label) {
            return Err(InputError::InvalidCharacter {
                position,
                code: u32::from(c),
            });
        }
    }
    Ok(())
}

fn collect_tree_labels<'a>(tree: &'a LabelTree, out: &mut Vec<&'a str>) {
    out.push(tree.label());
    for child in tree.children() {
        collect_tree_labels(child, out);
    }
}

struct GraphBuilder<'a> {
    ids: &'a mut IdAllocator,
    base: GraphBase,
    /// `ParentOf` edges in attach order, as (source, destination, order).
    links: Vec<(ModelId, ModelId, usize)>,
}

impl<'a> GraphBuilder<'a> {
    fn new(ids: &'a mut IdAllocator) -> Self {
        Self {
            ids,
            base: GraphBase::new(),
            links: Vec::new(),
        }
    }

    fn add_node(&mut self, kind: NodeKind, text: Option<&str>, role: Option<RoleHint>) -> ModelId {
        let id = self.ids.next_id();
        self.base.add_node(GraphNode::new(
            id,
            kind,
            text.map(|text| text.trim().to_string()),
            role,
        ));
        id
    }

    /// Adds a content node under `parent` with its transition pair.
    fn attach(&mut self, parent: ModelId, order: usize, label: &str, role: Option<RoleHint>) -> ModelId {
        let node = self.add_node(NodeKind::Content, Some(label), role);
        let pair = TransitionPair {
            parent: self.add_node(NodeKind::ParentTransition, None, None),
            sibling: self.add_node(NodeKind::SiblingTransition, None, None),
        };

        let edge_id = self.ids.next_id();
        self.base.add_edge(GraphEdge::new(
            edge_id,
            EdgeKind::ParentOf,
            parent,
            node,
            order,
            0,
            Some(pair),
        ));
        self.links.push((parent, node, order));
        trace!(label, order; "Attached content node");
        node
    }

    fn attach_tree(&mut self, parent: ModelId, order: usize, tree: &LabelTree) {
        let node = self.attach(parent, order, tree.label(), None);
        for (child_order, child) in tree.children().iter().enumerate() {
            self.attach_tree(node, child_order, child);
        }
    }

    /// Mirrors the content graph into presentation nodes and edges.
    fn derive_presentation(&mut self, root: ModelId) {
        let mirrored: Vec<ModelId> = std::iter::once(root)
            .chain(
                self.base
                    .nodes()
                    .filter(|node| node.kind() == NodeKind::Content)
                    .map(GraphNode::id),
            )
            .collect();

        let mut presentations = Vec::with_capacity(mirrored.len());
        for &source in &mirrored {
            let pres = self.add_node(NodeKind::Presentation, None, None);
            presentations.push((source, pres));
        }

        for &(source, pres) in &presentations {
            let id = self.ids.next_id();
            self.base.add_edge(GraphEdge::new(
                id,
                EdgeKind::PresentationOf,
                source,
                pres,
                0,
                0,
                None,
            ));
        }

        let pres_of: HashMap<ModelId, ModelId> = presentations.into_iter().collect();
        let links = std::mem::take(&mut self.links);
        for (parent, child, order) in links {
            let (Some(&parent_pres), Some(&child_pres)) = (pres_of.get(&parent), pres_of.get(&child)) else {
                continue;
            };
            let id = self.ids.next_id();
            self.base.add_edge(GraphEdge::new(
                id,
                EdgeKind::PresentationParentOf,
                parent_pres,
                child_pres,
                order,
                0,
                None,
            ));
        }
    }
}
