//! Error types for SmartArt operations.
//!
//! [`SmartArtError`] wraps the error of each stage: input validation and
//! template loading fail at add time, packaging fails at finalize time.

use std::io;

use thiserror::Error;

use smartart_core::InputError;
use smartart_package::{PackagingError, TemplateError};

/// The main error type for SmartArt operations.
#[derive(Debug, Error)]
pub enum SmartArtError {
    #[error("Invalid diagram input: {0}")]
    Input(#[from] InputError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
