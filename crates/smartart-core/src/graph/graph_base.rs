//! Low-level graph storage.
//!
//! [`GraphBase`] keeps nodes in insertion order (serialization order matters
//! to the viewer's parser) and indexes edges by source and destination for
//! ordered traversal, and transition nodes by the edge that owns them. It is
//! internal; [`super::DiagramGraph`] is the public
//! face.

use std::collections::HashMap;

use indexmap::IndexMap;

use super::{GraphEdge, GraphNode};
use crate::identifier::ModelId;

/// Index of an edge inside a [`GraphBase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(super) struct EdgeIndex(usize);

/// Insertion-ordered node and edge storage.
#[derive(Debug, Default)]
pub(super) struct GraphBase {
    nodes: IndexMap<ModelId, GraphNode>,
    edges: Vec<GraphEdge>,
    incoming: HashMap<ModelId, Vec<EdgeIndex>>,
    outgoing: HashMap<ModelId, Vec<EdgeIndex>>,
    /// Transition node to the edge whose pair references it.
    transitions: HashMap<ModelId, EdgeIndex>,
}

impl GraphBase {
    pub(super) fn new() -> Self {
        Self::default()
    }

    pub(super) fn node(&self, id: ModelId) -> Option<&GraphNode> {
        self.nodes.get(&id)
    }

    /// Nodes in insertion order.
    pub(super) fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    pub(super) fn nodes_count(&self) -> usize {
        self.nodes.len()
    }

    /// Edges in insertion order.
    pub(super) fn edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter()
    }

    /// Edges leaving `source`, in insertion order.
    pub(super) fn outgoing_edges(&self, source: ModelId) -> impl Iterator<Item = &GraphEdge> {
        self.outgoing
            .get(&source)
            .into_iter()
            .flatten()
            .map(|idx| &self.edges[idx.0])
    }

    /// Edges arriving at `destination`, in insertion order.
    pub(super) fn incoming_edges(&self, destination: ModelId) -> impl Iterator<Item = &GraphEdge> {
        self.incoming
            .get(&destination)
            .into_iter()
            .flatten()
            .map(|idx| &self.edges[idx.0])
    }

    /// The edge whose transition pair references `transition`.
    pub(super) fn edge_for_transition(&self, transition: ModelId) -> Option<&GraphEdge> {
        self.transitions.get(&transition).map(|idx| &self.edges[idx.0])
    }

    /// Adds a node, keyed by its own identifier.
    ///
    /// Identifiers come from a single allocator, so a duplicate is a bug.
    pub(super) fn add_node(&mut self, node: GraphNode) {
        let previous = self.nodes.insert(node.id(), node);
        debug_assert!(previous.is_none(), "Duplicate node identifier");
    }

    /// Adds a directed edge between two existing nodes.
    ///
    /// # Panics
    /// Panics in debug builds if either endpoint is missing.
    pub(super) fn add_edge(&mut self, edge: GraphEdge) -> EdgeIndex {
        #[cfg(debug_assertions)]
        {
            assert!(
                self.nodes.contains_key(&edge.source()),
                "Adding edge: source node {} does not exist for {edge:?}",
                edge.source(),
            );
            assert!(
                self.nodes.contains_key(&edge.destination()),
                "Adding edge: destination node {} does not exist for {edge:?}",
                edge.destination(),
            );
        }

        let idx = EdgeIndex(self.edges.len());
        self.outgoing.entry(edge.source()).or_default().push(idx);
        self.incoming.entry(edge.destination()).or_default().push(idx);
        if let Some(pair) = edge.transitions() {
            self.transitions.insert(pair.parent, idx);
            self.transitions.insert(pair.sibling, idx);
        }
        self.edges.push(edge);
        idx
    }
}
