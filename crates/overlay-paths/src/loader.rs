//! Loading structured files from the layer stack.
//!
//! The parser is supplied by the caller as a function over the raw bytes.
//! JSON and YAML shortcuts deserialize into any `DeserializeOwned` type.

use crate::error::{BoxError, OverlayError, Result};
use crate::registry::PathRegistry;
use crate::resolver::{resolve_all_of_kind, resolve_first_of_kind, EntryKind};
use serde::de::DeserializeOwned;
use std::path::Path;
use tracing::debug;

/// Parse the first file found for `rel_path`.
///
/// Returns `Ok(None)` when no layer has a regular file there. Parser errors
/// come back as [`OverlayError::Parse`] with the original error as source.
pub fn load_structured_first<T, E, F>(
    registry: &PathRegistry,
    rel_path: impl AsRef<Path>,
    parse: F,
) -> Result<Option<T>>
where
    F: FnOnce(&[u8]) -> std::result::Result<T, E>,
    E: Into<BoxError>,
{
    let Some(path) = resolve_first_of_kind(registry, rel_path, EntryKind::File)? else {
        return Ok(None);
    };

    read_and_parse(&path, parse).map(Some)
}

/// Parse every file found for `rel_path`, in layer order.
///
/// Stops at the first file that fails to read or parse.
pub fn load_structured_all<T, E, F>(
    registry: &PathRegistry,
    rel_path: impl AsRef<Path>,
    mut parse: F,
) -> Result<Vec<T>>
where
    F: FnMut(&[u8]) -> std::result::Result<T, E>,
    E: Into<BoxError>,
{
    resolve_all_of_kind(registry, rel_path, EntryKind::File)?
        .iter()
        .map(|path| read_and_parse(path, &mut parse))
        .collect()
}

pub fn load_json_first<T: DeserializeOwned>(
    registry: &PathRegistry,
    rel_path: impl AsRef<Path>,
) -> Result<Option<T>> {
    load_structured_first(registry, rel_path, |bytes| serde_json::from_slice(bytes))
}

pub fn load_json_all<T: DeserializeOwned>(
    registry: &PathRegistry,
    rel_path: impl AsRef<Path>,
) -> Result<Vec<T>> {
    load_structured_all(registry, rel_path, |bytes| serde_json::from_slice(bytes))
}

pub fn load_yaml_first<T: DeserializeOwned>(
    registry: &PathRegistry,
    rel_path: impl AsRef<Path>,
) -> Result<Option<T>> {
    load_structured_first(registry, rel_path, |bytes| serde_yaml::from_slice(bytes))
}

pub fn load_yaml_all<T: DeserializeOwned>(
    registry: &PathRegistry,
    rel_path: impl AsRef<Path>,
) -> Result<Vec<T>> {
    load_structured_all(registry, rel_path, |bytes| serde_yaml::from_slice(bytes))
}

fn read_and_parse<T, E, F>(path: &Path, parse: F) -> Result<T>
where
    F: FnOnce(&[u8]) -> std::result::Result<T, E>,
    E: Into<BoxError>,
{
    let bytes = std::fs::read(path).map_err(|e| OverlayError::io_with_path(e, path))?;
    let value = parse(&bytes).map_err(|e| OverlayError::parse(path, e))?;

    debug!("Loaded {} ({} bytes)", path.display(), bytes.len());
    Ok(value)
}
