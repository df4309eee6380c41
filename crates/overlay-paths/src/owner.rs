//! Owner-scoped registration.
//!
//! An [`Owner`] is a consumer (a plugin, a component, a single instance) that
//! contributes layer directories to a shared [`PathRegistry`] and remembers
//! which ones it added. Releasing its paths only removes a directory from the
//! registry once nobody else holds it.

use crate::error::Result;
use crate::registry::{OwnerId, PathRegistry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// A consumer's private view of the directories it registered.
///
/// Dropping an owner does not release its paths; call
/// [`unregister_all_local`](Self::unregister_all_local) for that.
#[derive(Debug)]
pub struct Owner {
    id: OwnerId,
    registry: Arc<PathRegistry>,
    local: Vec<PathBuf>,
}

impl Owner {
    pub fn new(registry: Arc<PathRegistry>) -> Self {
        Self {
            id: registry.new_owner_id(),
            registry,
            local: Vec::new(),
        }
    }

    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// The shared registry this owner writes through to.
    pub fn registry(&self) -> &Arc<PathRegistry> {
        &self.registry
    }

    /// Directories registered by this owner, in registration order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.local
    }

    /// Check whether this owner holds `path`.
    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        self.registry
            .canonicalize(path)
            .map(|canonical| self.local.contains(&canonical))
            .unwrap_or(false)
    }

    /// Register a directory in the shared registry on behalf of this owner.
    ///
    /// Returns the canonical path. On error neither the owner nor the
    /// registry changes.
    pub fn register_local(&mut self, path: impl AsRef<Path>) -> Result<PathBuf> {
        let canonical = self.registry.acquire(self.id, path.as_ref())?;

        if !self.local.contains(&canonical) {
            self.local.push(canonical.clone());
        }

        Ok(canonical)
    }

    /// Release this owner's hold on a directory.
    ///
    /// The directory leaves the shared registry only if no other owner, and
    /// no direct registration, still holds it. Returns the canonical path if
    /// this owner held it.
    pub fn unregister_local(&mut self, path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let canonical = self.registry.canonicalize(path)?;

        let held = self.local.contains(&canonical);
        self.local.retain(|p| *p != canonical);
        self.registry.release(self.id, &canonical);

        Ok(held.then_some(canonical))
    }

    /// Release every directory this owner registered.
    ///
    /// Returns the released paths in registration order.
    pub fn unregister_all_local(&mut self) -> Vec<PathBuf> {
        let released = std::mem::take(&mut self.local);
        let removed = released
            .iter()
            .filter(|path| self.registry.release(self.id, path))
            .count();

        debug!(
            "Owner {:?} released {} {} directories ({} removed from registry)",
            self.id,
            released.len(),
            self.registry.category(),
            removed
        );

        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Category;
    use crate::error::OverlayError;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Arc<PathRegistry>) {
        let temp_dir = TempDir::new().unwrap();
        for name in ["shared", "a", "b"] {
            std::fs::create_dir_all(temp_dir.path().join(name)).unwrap();
        }
        (temp_dir, Arc::new(PathRegistry::new(Category::DATA)))
    }

    #[test]
    fn test_register_local_writes_through() {
        let (temp_dir, registry) = setup();
        let mut owner = Owner::new(Arc::clone(&registry));

        let canonical = owner.register_local(temp_dir.path().join("a")).unwrap();

        assert_eq!(owner.paths(), &[canonical.clone()]);
        assert_eq!(registry.list(), vec![canonical]);
    }

    #[test]
    fn test_register_local_is_idempotent() {
        let (temp_dir, registry) = setup();
        let mut owner = Owner::new(Arc::clone(&registry));

        owner.register_local(temp_dir.path().join("a")).unwrap();
        owner.register_local(temp_dir.path().join("a/.")).unwrap();

        assert_eq!(owner.paths().len(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_local_failure_leaves_owner_unchanged() {
        let (temp_dir, registry) = setup();
        let mut owner = Owner::new(Arc::clone(&registry));

        let err = owner
            .register_local(temp_dir.path().join("lol"))
            .unwrap_err();

        assert!(matches!(err, OverlayError::NotADirectory(_)));
        assert!(owner.paths().is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_local_keeps_path_held_by_other_owner() {
        let (temp_dir, registry) = setup();
        let shared = temp_dir.path().join("shared");
        let mut a = Owner::new(Arc::clone(&registry));
        let mut b = Owner::new(Arc::clone(&registry));

        a.register_local(&shared).unwrap();
        b.register_local(&shared).unwrap();

        assert_eq!(a.unregister_local(&shared).unwrap(), Some(shared.clone()));
        assert!(!a.contains(&shared));
        assert!(registry.contains(&shared));

        b.unregister_local(&shared).unwrap();
        assert!(!registry.contains(&shared));
    }

    #[test]
    fn test_unregister_local_of_foreign_path_is_noop() {
        let (temp_dir, registry) = setup();
        let mut a = Owner::new(Arc::clone(&registry));
        let mut b = Owner::new(Arc::clone(&registry));

        b.register_local(temp_dir.path().join("b")).unwrap();
        let released = a.unregister_local(temp_dir.path().join("b")).unwrap();

        assert_eq!(released, None);
        assert!(registry.contains(temp_dir.path().join("b")));
    }

    #[test]
    fn test_unregister_all_local_spares_other_owners() {
        let (temp_dir, registry) = setup();
        let mut a = Owner::new(Arc::clone(&registry));
        let mut b = Owner::new(Arc::clone(&registry));

        a.register_local(temp_dir.path().join("a")).unwrap();
        a.register_local(temp_dir.path().join("shared")).unwrap();
        b.register_local(temp_dir.path().join("shared")).unwrap();
        b.register_local(temp_dir.path().join("b")).unwrap();

        let released = a.unregister_all_local();

        assert_eq!(
            released,
            vec![temp_dir.path().join("a"), temp_dir.path().join("shared")]
        );
        assert!(a.paths().is_empty());
        assert_eq!(
            registry.list(),
            vec![temp_dir.path().join("shared"), temp_dir.path().join("b")]
        );
    }

    #[test]
    fn test_owner_release_after_direct_unregister() {
        let (temp_dir, registry) = setup();
        let mut owner = Owner::new(Arc::clone(&registry));
        let dir = temp_dir.path().join("a");

        owner.register_local(&dir).unwrap();
        registry.unregister(&dir).unwrap();

        assert_eq!(owner.unregister_all_local(), vec![dir]);
        assert!(registry.is_empty());
    }
}
