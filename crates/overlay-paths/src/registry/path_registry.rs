//! Ordered, de-duplicated set of layer directories for one category.

use crate::config::{Category, RegistryOptions};
use crate::error::{OverlayError, Result};
use crate::paths::{self, is_absent};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, info};

/// Identifies one [`Owner`](crate::Owner) within a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(u64);

/// The registered directories of a single category.
///
/// Entries keep first-registration order, which is the shadowing order used
/// by every resolver: earlier layers win first-match queries.
///
/// An entry stays registered while anything still holds it: a direct
/// [`register`](Self::register) call, or at least one owner.
#[derive(Debug)]
pub struct PathRegistry {
    category: Category,
    options: RegistryOptions,
    state: RwLock<RegistryState>,
    next_owner: AtomicU64,
}

#[derive(Debug, Default)]
struct RegistryState {
    entries: Vec<Entry>,
}

#[derive(Debug)]
struct Entry {
    path: PathBuf,
    /// Registered through the registry itself rather than an owner.
    direct: bool,
    owners: BTreeSet<OwnerId>,
}

impl Entry {
    fn is_held(&self) -> bool {
        self.direct || !self.owners.is_empty()
    }
}

impl RegistryState {
    fn position(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|entry| entry.path == path)
    }

    /// Insert `path` if absent and return its entry.
    fn entry(&mut self, path: &Path) -> (&mut Entry, bool) {
        match self.position(path) {
            Some(index) => (&mut self.entries[index], false),
            None => {
                self.entries.push(Entry {
                    path: path.to_path_buf(),
                    direct: false,
                    owners: BTreeSet::new(),
                });
                let last = self.entries.len() - 1;
                (&mut self.entries[last], true)
            }
        }
    }
}

impl PathRegistry {
    /// Create an empty registry with lexical canonicalization.
    pub fn new(category: impl Into<Category>) -> Self {
        Self::with_options(category, RegistryOptions::default())
    }

    pub fn with_options(category: impl Into<Category>, options: RegistryOptions) -> Self {
        Self {
            category: category.into(),
            options,
            state: RwLock::new(RegistryState::default()),
            next_owner: AtomicU64::new(1),
        }
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn options(&self) -> RegistryOptions {
        self.options
    }

    /// Canonicalize `path` with this registry's options.
    pub fn canonicalize(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        paths::canonicalize(path, self.options)
    }

    /// Register a layer directory.
    ///
    /// Returns the canonical path. Registering a path that is already present
    /// keeps its original position and is not an error.
    ///
    /// # Errors
    ///
    /// [`OverlayError::NotADirectory`] when the path does not exist or is not
    /// a directory. The registry is left unchanged.
    pub fn register(&self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let canonical = self.checked_directory(path.as_ref())?;

        let mut state = self.write();
        let (entry, inserted) = state.entry(&canonical);
        entry.direct = true;
        drop(state);

        if inserted {
            info!("Registered {} directory {}", self.category, canonical.display());
        } else {
            debug!(
                "{} directory {} already registered",
                self.category,
                canonical.display()
            );
        }

        Ok(canonical)
    }

    /// Remove a layer directory, whoever registered it.
    ///
    /// Returns the removed canonical path, or `None` if it was not registered.
    pub fn unregister(&self, path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let canonical = self.canonicalize(path)?;

        let mut state = self.write();
        let removed = state
            .position(&canonical)
            .map(|index| state.entries.remove(index).path);
        drop(state);

        if let Some(path) = &removed {
            info!("Unregistered {} directory {}", self.category, path.display());
        }

        Ok(removed)
    }

    /// Snapshot of the registered directories in registration order.
    ///
    /// The returned list is a copy; later registrations do not affect it.
    pub fn list(&self) -> Vec<PathBuf> {
        self.read()
            .entries
            .iter()
            .map(|entry| entry.path.clone())
            .collect()
    }

    /// Check whether `path` is currently registered.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.canonicalize(path)
            .map(|canonical| self.read().position(&canonical).is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entries.is_empty()
    }

    /// Drop every entry, including those held by owners.
    ///
    /// Owners created before the reset keep their local lists; releasing
    /// those paths later is a no-op.
    pub fn clear(&self) {
        let removed = std::mem::take(&mut self.write().entries);
        if !removed.is_empty() {
            debug!(
                "Cleared {} {} directories",
                removed.len(),
                self.category
            );
        }
    }

    pub(crate) fn new_owner_id(&self) -> OwnerId {
        OwnerId(self.next_owner.fetch_add(1, Ordering::Relaxed))
    }

    /// Register `path` on behalf of `owner`.
    ///
    /// Acquiring a path the owner already holds does not add a second
    /// reference.
    pub(crate) fn acquire(&self, owner: OwnerId, path: &Path) -> Result<PathBuf> {
        let canonical = self.checked_directory(path)?;

        let mut state = self.write();
        let (entry, inserted) = state.entry(&canonical);
        let added = entry.owners.insert(owner);
        let references = entry.owners.len() + usize::from(entry.direct);
        drop(state);

        if inserted {
            info!("Registered {} directory {}", self.category, canonical.display());
        } else if added {
            debug!(
                "{} directory {} now has {} references",
                self.category,
                canonical.display(),
                references
            );
        }

        Ok(canonical)
    }

    /// Drop `owner`'s reference to an already canonical path.
    ///
    /// Returns `true` when this was the last reference and the directory left
    /// the registry.
    pub(crate) fn release(&self, owner: OwnerId, canonical: &Path) -> bool {
        let mut state = self.write();
        let Some(index) = state.position(canonical) else {
            return false;
        };

        let entry = &mut state.entries[index];
        if !entry.owners.remove(&owner) {
            return false;
        }

        if entry.is_held() {
            debug!(
                "{} directory {} still referenced after release",
                self.category,
                canonical.display()
            );
            return false;
        }

        state.entries.remove(index);
        drop(state);

        info!(
            "Unregistered {} directory {}",
            self.category,
            canonical.display()
        );
        true
    }

    fn checked_directory(&self, path: &Path) -> Result<PathBuf> {
        let canonical = self.canonicalize(path)?;

        match std::fs::metadata(&canonical) {
            Ok(metadata) if metadata.is_dir() => Ok(canonical),
            Ok(_) => Err(OverlayError::NotADirectory(canonical)),
            Err(e) if is_absent(&e) => Err(OverlayError::NotADirectory(canonical)),
            Err(e) => Err(OverlayError::io_with_path(e, canonical)),
        }
    }

    // Mutations are single-step, so a poisoned lock still guards a
    // consistent list.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
