//! Serialization of diagram graphs into package parts.

mod data_model;

pub use data_model::synthesize;
