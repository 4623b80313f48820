//! Command-line argument definitions for the SmartArt CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the document manifest, the output path,
//! an optional host document to extend, configuration and template
//! locations, and logging verbosity.

use clap::Parser;

/// Command-line arguments for the SmartArt document builder
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the TOML document manifest
    #[arg(help = "Path to the document manifest")]
    pub manifest: String,

    /// Path to the output .docx file
    #[arg(short, long, default_value = "out.docx")]
    pub output: String,

    /// Existing .docx to append to instead of a blank document
    #[arg(long)]
    pub host: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Directory holding the template archives, overriding the configuration
    #[arg(long)]
    pub templates: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
