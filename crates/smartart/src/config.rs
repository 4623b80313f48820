//! Configuration types for SmartArt document generation.
//!
//! All types implement [`serde::Deserialize`] so a configuration can be
//! loaded from TOML; every section falls back to its defaults when absent.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration.
//! - [`TemplateConfig`] - Where the per-topology template archives live.
//! - [`DrawingConfig`] - Which drawing bytes are stored for each diagram.
//! - [`ExtentConfig`] - Default diagram sizes per topology.
//!
//! # Example
//!
//! ```
//! # use smartart::config::{AppConfig, DrawingPolicy};
//! let config = AppConfig::default();
//! assert_eq!(config.drawing().policy(), DrawingPolicy::Regenerate);
//! assert_eq!(config.templates().dir().to_str(), Some("templates"));
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use smartart_core::{geometry::Extent, semantic::Topology};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Template archive location.
    #[serde(default)]
    templates: TemplateConfig,

    /// Cached drawing policy.
    #[serde(default)]
    drawing: DrawingConfig,

    /// Default diagram extents.
    #[serde(default)]
    extent: ExtentConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(templates: TemplateConfig, drawing: DrawingConfig, extent: ExtentConfig) -> Self {
        Self {
            templates,
            drawing,
            extent,
        }
    }

    /// Returns the template configuration.
    pub fn templates(&self) -> &TemplateConfig {
        &self.templates
    }

    /// Returns the drawing configuration.
    pub fn drawing(&self) -> &DrawingConfig {
        &self.drawing
    }

    /// Returns the extent configuration.
    pub fn extent(&self) -> &ExtentConfig {
        &self.extent
    }

    /// Replaces the template directory.
    pub fn with_templates_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.templates.dir = dir.into();
        self
    }
}

/// Location of the template archives.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateConfig {
    /// Directory holding `<template_name>.docx` archives.
    #[serde(default = "default_templates_dir")]
    dir: PathBuf,
}

impl TemplateConfig {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            dir: default_templates_dir(),
        }
    }
}

fn default_templates_dir() -> PathBuf {
    PathBuf::from("templates")
}

/// Which bytes are stored as each diagram's `drawing{N}.xml`.
///
/// The part is declared in the content types but no relationship points at
/// it, so the viewer lays every diagram out from the data part under either
/// policy. The choice only affects what the archive carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawingPolicy {
    /// Store an empty shape tree.
    #[default]
    Regenerate,
    /// Store the template's drawing part unchanged.
    Template,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DrawingConfig {
    #[serde(default)]
    policy: DrawingPolicy,
}

impl DrawingConfig {
    pub fn new(policy: DrawingPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DrawingPolicy {
        self.policy
    }
}

/// Default extent for each topology, in EMU.
///
/// Flat lists and processes default to 6.0 × 3.5 in; the taller shapes
/// get 4 000 000 EMU of height.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtentConfig {
    list: Extent,
    process: Extent,
    tree: Extent,
    cycle: Extent,
    pyramid: Extent,
    hub: Extent,
}

impl ExtentConfig {
    /// Default extent for diagrams of `topology`.
    pub fn for_topology(&self, topology: Topology) -> Extent {
        match topology {
            Topology::List => self.list,
            Topology::Process => self.process,
            Topology::Tree => self.tree,
            Topology::Cycle => self.cycle,
            Topology::Pyramid => self.pyramid,
            Topology::Hub => self.hub,
        }
    }
}

impl Default for ExtentConfig {
    fn default() -> Self {
        let tall = Extent::new(5_486_400, 4_000_000);
        Self {
            list: Extent::default(),
            process: Extent::default(),
            tree: tall,
            cycle: tall,
            pyramid: tall,
            hub: tall,
        }
    }
}
