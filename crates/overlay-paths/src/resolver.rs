//! Resolution of relative paths and glob patterns across registered layers.
//!
//! Every function takes a fresh snapshot of the registry, so results reflect
//! the registrations at call time and no cursor is shared between calls.
//! Layers are visited in registration order:
//!
//! - `resolve_first*` return the match from the earliest layer (shadowing)
//! - `resolve_all*` and `resolve_glob` return matches from every layer
//! - `resolve_glob_first_nonempty` stops at the first layer with matches
//!
//! A query that matches nothing yields `None` or an empty `Vec`. Probe
//! failures other than "not there" (permission denied, for instance) are
//! returned as [`OverlayError::Io`].

use crate::config::GlobConfig;
use crate::error::{OverlayError, Result};
use crate::paths::{is_absent, join_relative};
use crate::registry::PathRegistry;
use std::fs::Metadata;
use std::iter::FusedIterator;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};

/// Filesystem type filter for typed lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    File,
    Directory,
}

impl EntryKind {
    fn matches(self, metadata: &Metadata) -> bool {
        match self {
            EntryKind::File => metadata.is_file(),
            EntryKind::Directory => metadata.is_dir(),
        }
    }
}

/// Lazy walk over the layers that contain a relative path.
///
/// Created by [`resolve_each`] and [`resolve_each_of_kind`]. Cloning the
/// iterator restarts the walk over the same snapshot.
#[derive(Debug, Clone)]
pub struct ResolveEach {
    layers: std::vec::IntoIter<PathBuf>,
    rel_path: PathBuf,
    kind: Option<EntryKind>,
}

impl ResolveEach {
    fn new(registry: &PathRegistry, rel_path: &Path, kind: Option<EntryKind>) -> Self {
        Self {
            layers: registry.list().into_iter(),
            rel_path: rel_path.to_path_buf(),
            kind,
        }
    }
}

impl Iterator for ResolveEach {
    type Item = Result<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        for layer in self.layers.by_ref() {
            let candidate = join_relative(&layer, &self.rel_path);

            let metadata = match std::fs::metadata(&candidate) {
                Ok(metadata) => metadata,
                Err(e) if is_absent(&e) => {
                    trace!("No {} in {}", self.rel_path.display(), layer.display());
                    continue;
                }
                Err(e) => return Some(Err(OverlayError::io_with_path(e, candidate))),
            };

            if self.kind.is_some_and(|kind| !kind.matches(&metadata)) {
                trace!("Skipping {}: wrong entry kind", candidate.display());
                continue;
            }

            return Some(Ok(candidate));
        }

        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.layers.len()))
    }
}

impl FusedIterator for ResolveEach {}

/// Existing `layer/rel_path` entries of any type, in layer order.
pub fn resolve_each(registry: &PathRegistry, rel_path: impl AsRef<Path>) -> ResolveEach {
    ResolveEach::new(registry, rel_path.as_ref(), None)
}

/// Like [`resolve_each`], keeping only entries of the given kind.
///
/// Existence is checked first and the kind filter applied afterwards, so a
/// path that is a file in one layer and a directory in another is found in
/// whichever layer has the requested kind.
pub fn resolve_each_of_kind(
    registry: &PathRegistry,
    rel_path: impl AsRef<Path>,
    kind: EntryKind,
) -> ResolveEach {
    ResolveEach::new(registry, rel_path.as_ref(), Some(kind))
}

/// The match in the earliest layer, if any.
pub fn resolve_first(registry: &PathRegistry, rel_path: impl AsRef<Path>) -> Result<Option<PathBuf>> {
    resolve_each(registry, rel_path).next().transpose()
}

/// The earliest match of the given kind, if any.
pub fn resolve_first_of_kind(
    registry: &PathRegistry,
    rel_path: impl AsRef<Path>,
    kind: EntryKind,
) -> Result<Option<PathBuf>> {
    resolve_each_of_kind(registry, rel_path, kind).next().transpose()
}

/// Every match, one per layer at most, in layer order.
pub fn resolve_all(registry: &PathRegistry, rel_path: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    resolve_each(registry, rel_path).collect()
}

/// Every match of the given kind, in layer order.
pub fn resolve_all_of_kind(
    registry: &PathRegistry,
    rel_path: impl AsRef<Path>,
    kind: EntryKind,
) -> Result<Vec<PathBuf>> {
    resolve_each_of_kind(registry, rel_path, kind).collect()
}

/// Expand `pattern` inside every layer and concatenate the results.
///
/// Matches are grouped by layer in registration order, and ordered within a
/// layer the way the glob engine returns them. The same relative match in two
/// layers appears twice.
///
/// Layers whose path is not valid UTF-8 cannot be expressed as a glob pattern
/// and are skipped, even though [`resolve_each`] still finds entries in them.
pub fn resolve_glob(registry: &PathRegistry, pattern: &str) -> Result<Vec<PathBuf>> {
    validate_pattern(pattern)?;

    let mut matches = Vec::new();
    for layer in registry.list() {
        matches.extend(glob_layer(&layer, pattern)?);
    }
    Ok(matches)
}

/// Expand `pattern` layer by layer and return the first non-empty result.
///
/// Non UTF-8 layers are skipped, as in [`resolve_glob`].
pub fn resolve_glob_first_nonempty(registry: &PathRegistry, pattern: &str) -> Result<Vec<PathBuf>> {
    validate_pattern(pattern)?;

    for layer in registry.list() {
        let matches = glob_layer(&layer, pattern)?;
        if !matches.is_empty() {
            return Ok(matches);
        }
    }
    Ok(Vec::new())
}

fn validate_pattern(pattern: &str) -> Result<()> {
    glob::Pattern::new(pattern)
        .map(|_| ())
        .map_err(|e| OverlayError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn glob_layer(layer: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let Some(layer_str) = layer.to_str() else {
        warn!("Skipping non UTF-8 layer {} for glob", layer.display());
        return Ok(Vec::new());
    };

    // The layer itself is matched literally; only `pattern` is expanded.
    let full_pattern = format!(
        "{}/{}",
        glob::Pattern::escape(layer_str.trim_end_matches('/')),
        pattern.trim_start_matches('/')
    );

    let paths = glob::glob_with(&full_pattern, GlobConfig::match_options()).map_err(|e| {
        OverlayError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        }
    })?;

    let matches = paths
        .map(|entry| entry.map_err(OverlayError::from))
        .collect::<Result<Vec<_>>>()?;

    trace!(
        "Glob {} matched {} entries in {}",
        pattern,
        matches.len(),
        layer.display()
    );
    Ok(matches)
}
