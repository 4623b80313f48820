//! CLI logic for the SmartArt document builder.
//!
//! Reads a TOML document manifest, builds the document through the
//! [`smartart`] library and writes the finished `.docx`.

pub mod error_adapter;

mod args;
mod config;
mod manifest;

pub use args::Args;
pub use manifest::{Manifest, ManifestError};

use std::fs;

use log::info;
use thiserror::Error;

use smartart::{DirectoryTemplates, Document, HostDocument, SmartArtError};

/// Failures of a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error(transparent)]
    SmartArt(#[from] SmartArtError),
}

/// Run the SmartArt CLI application
///
/// Loads the configuration, parses the manifest, appends its blocks to a
/// blank or existing host document and finalizes it at the output path.
///
/// # Errors
///
/// Returns [`CliError`] for:
/// - Configuration loading errors
/// - Manifest read or parse errors
/// - Invalid diagram input and missing templates
/// - Packaging and write errors
pub fn run(args: &Args) -> Result<(), CliError> {
    info!(
        manifest_path = args.manifest,
        output_path = args.output;
        "Building document"
    );

    let mut app_config = config::load_config(args.config.as_ref())?;
    if let Some(dir) = &args.templates {
        app_config = app_config.with_templates_dir(dir);
    }

    let source = fs::read_to_string(&args.manifest).map_err(SmartArtError::from)?;
    let manifest = Manifest::parse(&args.manifest, &source)?;

    let mut doc = match &args.host {
        Some(path) => {
            info!(host_path = path; "Appending to existing document");
            let store = DirectoryTemplates::new(app_config.templates().dir());
            Document::with_host(HostDocument::open(path)?, app_config, store)
        }
        None => Document::new(app_config)?,
    };

    manifest.apply(&mut doc)?;
    let diagrams = doc.pending_count();
    doc.finalize(&args.output)?;

    info!(output_file = args.output, diagrams; "Document written");

    Ok(())
}
