//! SmartArt Core Types and Definitions
//!
//! This crate provides the foundational types for synthesizing SmartArt
//! diagrams. It includes:
//!
//! - **Semantic**: The diagram request model ([`semantic::DiagramSpec`], [`semantic::Topology`])
//! - **Geometry**: Diagram extents in English Metric Units ([`geometry::Extent`])
//! - **Identifiers**: Model identifiers and their per-document allocator ([`identifier::ModelId`])
//! - **Graph**: The typed content/presentation graph and its builder ([`graph`] module)
//! - **Errors**: Input validation failures ([`InputError`])

pub mod geometry;
pub mod graph;
pub mod identifier;
pub mod semantic;

mod error;

pub use error::InputError;
