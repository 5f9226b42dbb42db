use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use warden_core::config::StoreConfig;

use super::{EmptyStore, MemoryStore, SecurityStore};
use crate::error::DbResult;

/// Builds a store from its configuration.
pub type StoreFactory = fn(&StoreConfig) -> DbResult<Arc<dyn SecurityStore>>;

/// Maps the configured backend name to the function that builds it.
///
/// Resolved once at startup; the resulting store is shared for the lifetime
/// of the process.
pub struct StoreRegistry {
    factories: BTreeMap<&'static str, StoreFactory>,
}

impl Default for StoreRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("memory", memory_store)
            .register("empty", empty_store);
        registry
    }
}

fn memory_store(config: &StoreConfig) -> DbResult<Arc<dyn SecurityStore>> {
    let store = match &config.seed_file {
        Some(path) => MemoryStore::from_seed_file(Path::new(path))?,
        None => MemoryStore::new(),
    };
    Ok(Arc::new(store))
}

#[expect(
    clippy::unnecessary_wraps,
    reason = "must match the StoreFactory signature"
)]
fn empty_store(_config: &StoreConfig) -> DbResult<Arc<dyn SecurityStore>> {
    Ok(Arc::new(EmptyStore::default()))
}

impl StoreRegistry {
    /// A registry with the built-in `memory` and `empty` backends.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with no backends at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, name: &'static str, factory: StoreFactory) -> &mut Self {
        self.factories.insert(name, factory);
        self
    }

    #[must_use]
    pub fn backends(&self) -> Vec<&'static str> {
        self.factories.keys().copied().collect()
    }

    /// ## Summary
    /// Builds the configured backend. An unknown backend name is logged and
    /// replaced by the empty store.
    ///
    /// ## Errors
    /// Returns an error if the selected factory fails.
    #[tracing::instrument(skip(self), fields(backend = %config.backend))]
    pub fn create(&self, config: &StoreConfig) -> DbResult<Arc<dyn SecurityStore>> {
        let Some(factory) = self.factories.get(config.backend.as_str()) else {
            tracing::error!(
                backend = %config.backend,
                known = ?self.backends(),
                "Unknown store backend, falling back to the empty store"
            );
            return Ok(Arc::new(EmptyStore::default()));
        };

        let store = factory(config)?;
        tracing::info!(store = store.name(), "Security store created");
        Ok(store)
    }
}
