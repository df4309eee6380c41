//! Per-category registries, created on first use.

use super::PathRegistry;
use crate::config::{Category, RegistryOptions};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};
use tracing::debug;

/// One [`PathRegistry`] per category.
///
/// Independently loaded components reach the same registry by asking for the
/// same category. Use [`RegistrySet::global`] for the process-wide set, or
/// build a private set with [`RegistrySet::new`] (tests, embedding).
#[derive(Debug, Default)]
pub struct RegistrySet {
    options: RegistryOptions,
    registries: RwLock<HashMap<Category, Arc<PathRegistry>>>,
}

static GLOBAL: OnceLock<RegistrySet> = OnceLock::new();

impl RegistrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set whose registries all canonicalize with `options`.
    pub fn with_options(options: RegistryOptions) -> Self {
        Self {
            options,
            registries: RwLock::default(),
        }
    }

    /// The process-wide set. Lives until the process exits.
    pub fn global() -> &'static RegistrySet {
        GLOBAL.get_or_init(RegistrySet::new)
    }

    /// The registry for `category`, created empty on first request.
    pub fn get(&self, category: impl Into<Category>) -> Arc<PathRegistry> {
        let category = category.into();

        if let Some(registry) = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&category)
        {
            return Arc::clone(registry);
        }

        let mut registries = self
            .registries
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let registry = registries.entry(category).or_insert_with_key(|category| {
            debug!("Creating {} path registry", category);
            Arc::new(PathRegistry::with_options(category.clone(), self.options))
        });
        Arc::clone(registry)
    }

    /// Registry of `data` directories.
    pub fn data(&self) -> Arc<PathRegistry> {
        self.get(Category::DATA)
    }

    /// Registry of `static` directories.
    pub fn static_content(&self) -> Arc<PathRegistry> {
        self.get(Category::STATIC)
    }

    /// Categories requested so far, sorted by name.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<_> = self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        categories.sort();
        categories
    }

    /// Empty every registry in the set.
    ///
    /// Handles returned by [`get`](Self::get) stay valid and see the cleared
    /// state.
    pub fn reset(&self) {
        for registry in self
            .registries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
        {
            registry.clear();
        }
    }
}
