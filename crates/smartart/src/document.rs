//! The document context: pending diagrams and the two-phase save.

use std::{
    io::Write,
    path::{Path, PathBuf},
    rc::Rc,
};

use log::{debug, info};
use tempfile::NamedTempFile;

use smartart_core::{
    InputError,
    geometry::Extent,
    graph,
    identifier::IdAllocator,
    semantic::{DiagramSpec, LabelTree, Topology, first_invalid_char},
};
use smartart_package::{
    DiagramParts, PackagingError, PlaceholderToken, TemplateBundle,
    parts::EMPTY_DRAWING,
    template::{DirectoryTemplates, TemplateStore},
};

use crate::{
    SmartArtError,
    config::{AppConfig, DrawingPolicy},
    export,
    host::{HostDocument, Serialized},
    templates::TemplateCache,
};

/// A diagram waiting for the finalize pass.
#[derive(Debug)]
struct PendingDiagram {
    spec: DiagramSpec,
    data: Vec<u8>,
    bundle: Rc<TemplateBundle>,
    token: PlaceholderToken,
    extent: Extent,
}

/// A host document plus the diagrams to be embedded in it.
///
/// Each `add_*` call validates its input, builds and serializes the diagram
/// graph and reserves a position in the body. Nothing touches the package
/// until [`Document::finalize`], which saves the host normally and then
/// patches the diagram parts in.
///
/// # Examples
///
/// ```rust,no_run
/// use smartart::{Document, config::AppConfig};
///
/// let mut doc = Document::new(AppConfig::default()).unwrap();
/// doc.add_basic_process("Release", ["Plan", "Build", "Ship"], None).unwrap();
/// doc.finalize("release.docx").unwrap();
/// ```
#[derive(Debug)]
pub struct Document {
    host: HostDocument,
    config: AppConfig,
    templates: TemplateCache,
    ids: IdAllocator,
    pending: Vec<PendingDiagram>,
}

impl Document {
    /// A blank document loading templates from the configured directory.
    pub fn new(config: AppConfig) -> Result<Self, SmartArtError> {
        let store = DirectoryTemplates::new(config.templates().dir());
        Ok(Self::with_host(HostDocument::blank()?, config, store))
    }

    /// A document over an existing host, loading templates from `store`.
    pub fn with_host(
        host: HostDocument,
        config: AppConfig,
        store: impl TemplateStore + 'static,
    ) -> Self {
        Self {
            host,
            config,
            templates: TemplateCache::new(store),
            ids: IdAllocator::new(),
            pending: Vec::new(),
        }
    }

    pub fn host(&self) -> &HostDocument {
        &self.host
    }

    /// The host, for appending ordinary paragraphs and headings.
    pub fn host_mut(&mut self) -> &mut HostDocument {
        &mut self.host
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Number of diagrams waiting for finalize.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Specs of the pending diagrams, in add order.
    pub fn pending_specs(&self) -> impl Iterator<Item = &DiagramSpec> {
        self.pending.iter().map(|pending| &pending.spec)
    }

    /// Adds an unordered bullet-style list.
    pub fn add_basic_list<I, S>(
        &mut self,
        title: &str,
        items: I,
        extent: Option<Extent>,
    ) -> Result<(), SmartArtError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = DiagramSpec::sequence(Topology::List, title, items)?;
        self.add_diagram(spec, extent)
    }

    /// Adds an ordered left-to-right process.
    pub fn add_basic_process<I, S>(
        &mut self,
        title: &str,
        items: I,
        extent: Option<Extent>,
    ) -> Result<(), SmartArtError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = DiagramSpec::sequence(Topology::Process, title, items)?;
        self.add_diagram(spec, extent)
    }

    /// Adds a tree; `roots` are the top-level labels in order.
    pub fn add_hierarchy(
        &mut self,
        title: &str,
        roots: Vec<LabelTree>,
        extent: Option<Extent>,
    ) -> Result<(), SmartArtError> {
        let spec = DiagramSpec::tree(title, roots)?;
        self.add_diagram(spec, extent)
    }

    pub fn add_cycle<I, S>(
        &mut self,
        title: &str,
        items: I,
        extent: Option<Extent>,
    ) -> Result<(), SmartArtError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = DiagramSpec::sequence(Topology::Cycle, title, items)?;
        self.add_diagram(spec, extent)
    }

    /// Adds a pyramid; the first item is the apex.
    pub fn add_pyramid<I, S>(
        &mut self,
        title: &str,
        items: I,
        extent: Option<Extent>,
    ) -> Result<(), SmartArtError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = DiagramSpec::sequence(Topology::Pyramid, title, items)?;
        self.add_diagram(spec, extent)
    }

    /// Adds a hub-and-spoke diagram around `center`.
    pub fn add_radial<I, S>(
        &mut self,
        title: &str,
        center: &str,
        spokes: I,
        extent: Option<Extent>,
    ) -> Result<(), SmartArtError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = DiagramSpec::hub(title, center, spokes)?;
        self.add_diagram(spec, extent)
    }

    /// Queues a diagram and reserves its place in the body.
    ///
    /// On error the document is left as it was.
    ///
    /// # Errors
    ///
    /// [`SmartArtError::Input`] when a label is blank or the title or a
    /// label holds a character XML cannot carry, checked before anything
    /// else; [`SmartArtError::Template`] when the topology's template cannot
    /// be loaded.
    pub fn add_diagram(&mut self, spec: DiagramSpec, extent: Option<Extent>) -> Result<(), SmartArtError> {
        let topology = spec.topology();
        graph::validate(&spec)?;
        let title = spec.title().trim();
        if let Some(c) = first_invalid_char(title) {
            return Err(InputError::InvalidText { code: u32::from(c) }.into());
        }

        let bundle = self.templates.get(topology)?;
        let graph = graph::build(&spec, &mut self.ids)?;
        let data = export::synthesize(&graph, bundle.metadata());

        let extent = extent.unwrap_or_else(|| self.config.extent().for_topology(topology));
        let token = PlaceholderToken::new(self.pending.len());

        if !title.is_empty() {
            self.host.add_heading(title, 2)?;
        }
        self.host.reserve_slot(token);

        info!(
            topology:% = topology,
            nodes = graph.nodes_count(),
            pending = self.pending.len() + 1;
            "Diagram added"
        );
        self.pending.push(PendingDiagram {
            spec,
            data,
            bundle,
            token,
            extent,
        });
        Ok(())
    }

    /// The finished package, with every pending diagram embedded.
    ///
    /// With no pending diagrams this is exactly the host's plain save.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SmartArtError> {
        if self.pending.is_empty() {
            return self.host.to_bytes();
        }

        let Serialized { archive, slots } = self.host.serialize()?;
        let policy = self.config.drawing().policy();
        let parts: Vec<DiagramParts<'_>> = self
            .pending
            .iter()
            .map(|pending| DiagramParts {
                token: pending.token,
                data: &pending.data,
                bundle: pending.bundle.as_ref(),
                drawing: match policy {
                    DrawingPolicy::Regenerate => EMPTY_DRAWING.as_bytes(),
                    DrawingPolicy::Template => pending.bundle.drawing(),
                },
                extent: pending.extent,
            })
            .collect();

        Ok(smartart_package::patch(&archive, &slots, &parts)?)
    }

    /// Writes the finished package to `path`.
    ///
    /// The bytes go to a temporary file next to `path` which is renamed into
    /// place only once complete; on error `path` is untouched.
    pub fn finalize(self, path: impl AsRef<Path>) -> Result<(), SmartArtError> {
        let path = path.as_ref();
        info!(path:? = path, diagrams = self.pending.len(); "Finalizing document");
        let bytes = self.to_bytes()?;
        write_atomically(path, &bytes)?;
        debug!(bytes = bytes.len(); "Document written");
        Ok(())
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), PackagingError> {
    let write_error = |source| PackagingError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let mut file = NamedTempFile::new_in(&dir).map_err(write_error)?;
    file.write_all(bytes).map_err(write_error)?;
    file.as_file().sync_all().map_err(write_error)?;
    file.persist(path).map_err(|err| write_error(err.error))?;
    Ok(())
}
