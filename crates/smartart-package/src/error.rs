//! Error types for template extraction and package patching.

use std::{io, path::PathBuf};

use thiserror::Error;
use zip::result::ZipError;

use smartart_core::semantic::Topology;

/// A template archive that cannot supply its static parts.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("no template for {topology} diagrams at {path}")]
    NotFound { topology: Topology, path: PathBuf },

    #[error("template for {topology} diagrams is unreadable: {source}")]
    Unreadable {
        topology: Topology,
        #[source]
        source: ZipError,
    },

    #[error("template for {topology} diagrams has no {part} part")]
    MissingPart {
        topology: Topology,
        part: &'static str,
    },

    #[error("{part} part of the {topology} template is malformed: {reason}")]
    Malformed {
        topology: Topology,
        part: &'static str,
        reason: String,
    },
}

impl TemplateError {
    /// The topology whose template failed.
    pub fn topology(&self) -> Topology {
        match self {
            Self::NotFound { topology, .. }
            | Self::Unreadable { topology, .. }
            | Self::MissingPart { topology, .. }
            | Self::Malformed { topology, .. } => *topology,
        }
    }
}

/// A failure while rewriting or writing the output package.
#[derive(Debug, Error)]
pub enum PackagingError {
    #[error("archive error: {0}")]
    Archive(#[from] ZipError),

    #[error("package has no {0} part")]
    MissingPart(String),

    #[error("{part} is malformed: {reason}")]
    Malformed { part: String, reason: String },

    #[error("part {0} already exists in the package")]
    PartCollision(String),

    #[error("relationship id {0} already exists in the package")]
    RelationshipCollision(String),

    #[error("placeholder for diagram #{0} was never resolved")]
    UnresolvedPlaceholder(usize),

    #[error("failed to write package to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PackagingError {
    pub(crate) fn malformed(part: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            part: part.into(),
            reason: reason.to_string(),
        }
    }
}
