//! Input validation errors.
//!
//! [`InputError`] covers every way a diagram request can be rejected before
//! anything is registered on a document: empty payloads, blank labels,
//! characters XML cannot carry, cyclic trees and payloads that do not fit
//! the requested topology.

use thiserror::Error;

use crate::semantic::Topology;

/// A diagram request that cannot produce a valid diagram.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    /// A flat diagram was requested with no labels.
    #[error("{topology} diagram needs at least one label")]
    EmptyLabels { topology: Topology },

    /// A label is empty or whitespace only.
    ///
    /// `position` is the label's index in depth-first order.
    #[error("label at position {position} is empty after trimming")]
    EmptyLabel { position: usize },

    /// A label holds a character XML 1.0 cannot carry, such as a C0 control.
    ///
    /// `position` is the label's index in depth-first order.
    #[error("label at position {position} contains invalid character U+{code:04X}")]
    InvalidCharacter { position: usize, code: u32 },

    /// Body text holds a character XML 1.0 cannot carry.
    #[error("text contains invalid character U+{code:04X}")]
    InvalidText { code: u32 },

    /// A tree diagram was requested with no root nodes.
    #[error("tree diagram needs at least one root node")]
    EmptyTree,

    /// A tree re-enters one of its own ancestors.
    #[error("tree node `{label}` contains one of its own ancestors")]
    CyclicTree { label: String },

    /// A tree node refers to a child slot that does not exist.
    #[error("tree node `{label}` refers to missing child #{child}")]
    DanglingChild { label: String, child: usize },

    /// An arena link names a node the arena never allocated.
    #[error("arena link refers to missing node #{index}")]
    UnknownNode { index: usize },

    /// A hub diagram was requested with no spokes.
    #[error("hub diagram needs at least one spoke")]
    EmptySpokes,

    /// The payload shape does not match the requested topology.
    #[error("{topology} diagram cannot take a {payload} payload")]
    TopologyMismatch {
        topology: Topology,
        payload: &'static str,
    },
}
