//! Per-document template cache.

use std::{collections::HashMap, fmt, rc::Rc};

use log::debug;

use smartart_core::semantic::Topology;
use smartart_package::{TemplateBundle, TemplateError, template::TemplateStore};

/// Loads each topology's bundle at most once per document.
pub struct TemplateCache {
    store: Box<dyn TemplateStore>,
    bundles: HashMap<Topology, Rc<TemplateBundle>>,
}

impl TemplateCache {
    pub fn new(store: impl TemplateStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            bundles: HashMap::new(),
        }
    }

    /// Returns the bundle for `topology`, loading it on first use.
    ///
    /// Failed loads are not cached.
    pub fn get(&mut self, topology: Topology) -> Result<Rc<TemplateBundle>, TemplateError> {
        if let Some(bundle) = self.bundles.get(&topology) {
            return Ok(Rc::clone(bundle));
        }

        let bundle = Rc::new(self.store.load(topology)?);
        debug!(topology:% = topology; "Template loaded");
        self.bundles.insert(topology, Rc::clone(&bundle));
        Ok(bundle)
    }

    pub fn loaded(&self) -> usize {
        self.bundles.len()
    }
}

impl fmt::Debug for TemplateCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemplateCache")
            .field("bundles", &self.bundles.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
