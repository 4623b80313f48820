//! Semantic diagram request types.
//!
//! A [`DiagramSpec`] is one immutable request to draw a diagram: which of the
//! six fixed [`Topology`] shapes to use, the title shown above it and the
//! labels it carries. Specs are validated against their topology when they
//! are constructed, so a spec that exists is always buildable modulo label
//! content (checked by the graph builder).
//!
//! # Tree payloads
//!
//! Tree diagrams take an explicit ordered structure, [`LabelTree`], rather than
//! an associative mapping: child order is part of the value and an owned tree
//! cannot contain itself. Callers that hold indexed or shared structure can
//! build a [`LabelArena`] instead; resolving the arena walks it with a
//! visited-ancestor set and rejects genuine cycles while allowing labels and
//! even whole subtrees to be reused in unrelated branches.

use std::fmt;

use serde::Deserialize;

use crate::InputError;

/// One of the six fixed diagram shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topology {
    /// Unordered block list.
    List,
    /// Left-to-right ordered process.
    Process,
    /// Org chart style hierarchy.
    Tree,
    /// Circular process.
    Cycle,
    /// Layered pyramid, apex first.
    Pyramid,
    /// Center item with radiating spokes.
    Hub,
}

impl Topology {
    /// All topologies in catalog order.
    pub const ALL: [Topology; 6] = [
        Topology::List,
        Topology::Process,
        Topology::Tree,
        Topology::Cycle,
        Topology::Pyramid,
        Topology::Hub,
    ];

    /// File stem of the pre-built template archive for this topology.
    pub fn template_name(self) -> &'static str {
        match self {
            Topology::List => "basic_list",
            Topology::Process => "basic_process",
            Topology::Tree => "hierarchy",
            Topology::Cycle => "cycle",
            Topology::Pyramid => "pyramid",
            Topology::Hub => "radial",
        }
    }

    /// Returns `true` for topologies whose payload is a flat label sequence.
    pub fn is_flat(self) -> bool {
        matches!(
            self,
            Topology::List | Topology::Process | Topology::Cycle | Topology::Pyramid
        )
    }
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Topology::List => "list",
            Topology::Process => "process",
            Topology::Tree => "tree",
            Topology::Cycle => "cycle",
            Topology::Pyramid => "pyramid",
            Topology::Hub => "hub",
        };
        f.write_str(name)
    }
}

/// A labelled tree node with ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LabelTree {
    label: String,
    #[serde(default)]
    children: Vec<LabelTree>,
}

impl LabelTree {
    /// Creates a childless node.
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
        }
    }

    /// Creates a node with the given children, in order.
    pub fn new(label: impl Into<String>, children: Vec<LabelTree>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Appends a child and returns the node, for chained construction.
    pub fn with_child(mut self, child: LabelTree) -> Self {
        self.children.push(child);
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn children(&self) -> &[LabelTree] {
        &self.children
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(LabelTree::node_count).sum::<usize>()
    }
}

/// Whether XML 1.0 can carry `c` as character data.
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{fffd}' | '\u{10000}'..)
}

/// The first character of `text` that XML 1.0 cannot carry.
pub fn first_invalid_char(text: &str) -> Option<char> {
    text.chars().find(|&c| !is_xml_char(c))
}

/// Index of a node inside a [`LabelArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArenaIndex(usize);

/// Index-addressed tree input that may share or (erroneously) loop structure.
///
/// # Examples
///
/// ```
/// use smartart_core::semantic::LabelArena;
///
/// let mut arena = LabelArena::new();
/// let root = arena.add_root("CEO");
/// let cto = arena.add("CTO");
/// arena.link(root, cto).unwrap();
///
/// let forest = arena.resolve().unwrap();
/// assert_eq!(forest[0].children()[0].label(), "CTO");
/// ```
#[derive(Debug, Default, Clone)]
pub struct LabelArena {
    labels: Vec<String>,
    children: Vec<Vec<ArenaIndex>>,
    roots: Vec<ArenaIndex>,
}

impl LabelArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a detached node and returns its index.
    pub fn add(&mut self, label: impl Into<String>) -> ArenaIndex {
        self.labels.push(label.into());
        self.children.push(Vec::new());
        ArenaIndex(self.labels.len() - 1)
    }

    /// Adds a node and registers it as a top-level root.
    pub fn add_root(&mut self, label: impl Into<String>) -> ArenaIndex {
        let idx = self.add(label);
        self.roots.push(idx);
        idx
    }

    /// Appends `child` to `parent`'s ordered child list.
    ///
    /// A `child` outside the arena is kept and reported by [`Self::resolve`].
    ///
    /// # Errors
    ///
    /// Returns [`InputError::UnknownNode`] when `parent` was not allocated
    /// by this arena.
    pub fn link(&mut self, parent: ArenaIndex, child: ArenaIndex) -> Result<(), InputError> {
        let children = self
            .children
            .get_mut(parent.0)
            .ok_or(InputError::UnknownNode { index: parent.0 })?;
        children.push(child);
        Ok(())
    }

    /// Resolves the arena into owned trees, rejecting cycles.
    ///
    /// A node may appear under several parents; it is copied into each
    /// branch. Only a node that is its own ancestor is an error.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::CyclicTree`] when a node re-enters its own
    /// ancestor chain and [`InputError::DanglingChild`] when a link points
    /// outside the arena.
    pub fn resolve(&self) -> Result<Vec<LabelTree>, InputError> {
        let mut on_path = vec![false; self.labels.len()];
        self.roots
            .iter()
            .map(|&root| self.resolve_node(root, &mut on_path))
            .collect()
    }

    fn resolve_node(&self, idx: ArenaIndex, on_path: &mut [bool]) -> Result<LabelTree, InputError> {
        let label = &self.labels[idx.0];
        if on_path[idx.0] {
            return Err(InputError::CyclicTree {
                label: label.clone(),
            });
        }
        on_path[idx.0] = true;

        let mut children = Vec::with_capacity(self.children[idx.0].len());
        for &child in &self.children[idx.0] {
            if child.0 >= self.labels.len() {
                return Err(InputError::DanglingChild {
                    label: label.clone(),
                    child: child.0,
                });
            }
            children.push(self.resolve_node(child, on_path)?);
        }

        on_path[idx.0] = false;
        Ok(LabelTree::new(label.clone(), children))
    }
}

/// Topology-specific diagram content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Ordered labels, for list, process, cycle and pyramid diagrams.
    Sequence(Vec<String>),
    /// Ordered root nodes, for tree diagrams.
    Tree(Vec<LabelTree>),
    /// Center label and ordered spoke labels, for hub diagrams.
    Hub { center: String, spokes: Vec<String> },
}

impl Payload {
    fn kind_name(&self) -> &'static str {
        match self {
            Payload::Sequence(_) => "sequence",
            Payload::Tree(_) => "tree",
            Payload::Hub { .. } => "hub",
        }
    }
}

/// One validated diagram request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSpec {
    topology: Topology,
    title: String,
    payload: Payload,
}

impl DiagramSpec {
    /// Creates a spec after checking that the payload fits the topology.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::TopologyMismatch`] when the payload shape does
    /// not belong to the topology, and the matching emptiness error when
    /// the payload has nothing to draw.
    pub fn new(
        topology: Topology,
        title: impl Into<String>,
        payload: Payload,
    ) -> Result<Self, InputError> {
        match (&payload, topology) {
            (Payload::Sequence(items), t) if t.is_flat() => {
                if items.is_empty() {
                    return Err(InputError::EmptyLabels { topology });
                }
            }
            (Payload::Tree(roots), Topology::Tree) => {
                if roots.is_empty() {
                    return Err(InputError::EmptyTree);
                }
            }
            (Payload::Hub { spokes, .. }, Topology::Hub) => {
                if spokes.is_empty() {
                    return Err(InputError::EmptySpokes);
                }
            }
            _ => {
                return Err(InputError::TopologyMismatch {
                    topology,
                    payload: payload.kind_name(),
                });
            }
        }

        Ok(Self {
            topology,
            title: title.into(),
            payload,
        })
    }

    /// Creates a flat spec (list, process, cycle or pyramid) from labels.
    pub fn sequence<I, S>(topology: Topology, title: impl Into<String>, items: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items = items.into_iter().map(Into::into).collect();
        Self::new(topology, title, Payload::Sequence(items))
    }

    /// Creates a tree spec from ordered root nodes.
    pub fn tree(title: impl Into<String>, roots: Vec<LabelTree>) -> Result<Self, InputError> {
        Self::new(Topology::Tree, title, Payload::Tree(roots))
    }

    /// Creates a hub spec from a center label and ordered spokes.
    pub fn hub<I, S>(title: impl Into<String>, center: impl Into<String>, spokes: I) -> Result<Self, InputError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let payload = Payload::Hub {
            center: center.into(),
            spokes: spokes.into_iter().map(Into::into).collect(),
        };
        Self::new(Topology::Hub, title, payload)
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}
