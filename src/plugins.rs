//! Extension registry passed through the planner.
//!
//! Planning accepts a registry so plugin-contributed behaviour has a place to
//! hook in later; the current algorithm never inspects it.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

pub trait Plugin: Send + Sync {
    fn name(&self) -> &str;
}

#[derive(Clone, Default)]
pub struct PluginRegistry {
    plugins: IndexMap<String, Arc<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a plugin, replacing any earlier one with the same name
    pub fn register(&mut self, plugin: Arc<dyn Plugin>) -> Option<Arc<dyn Plugin>> {
        let name = plugin.name().to_string();
        debug!("Registering plugin: {}", name);
        self.plugins.insert(name, plugin)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Plugin>> {
        self.plugins.get(name)
    }

    /// Plugin names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish()
    }
}
