//! Path canonicalization and layer-relative joins.

use crate::config::RegistryOptions;
use crate::error::{OverlayError, Result};
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against the current working directory and remove
/// `.` and `..` components without touching the filesystem.
///
/// An empty path names the current working directory.
pub fn absolute(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let path = if path.as_os_str().is_empty() {
        Path::new(".")
    } else {
        path
    };
    let absolute = std::path::absolute(path).map_err(|e| OverlayError::io_with_path(e, path))?;
    Ok(normalize(&absolute))
}

/// Canonicalize `path` the way a registry configured with `options` does.
///
/// With `resolve_symlinks` the filesystem is consulted. A path that does not
/// exist keeps its lexical form so it can still be compared and removed.
pub fn canonicalize(path: impl AsRef<Path>, options: RegistryOptions) -> Result<PathBuf> {
    let lexical = absolute(path)?;
    if !options.resolve_symlinks {
        return Ok(lexical);
    }

    match std::fs::canonicalize(&lexical) {
        Ok(resolved) => Ok(resolved),
        Err(e) if is_absent(&e) => Ok(lexical),
        Err(e) => Err(OverlayError::io_with_path(e, lexical)),
    }
}

/// Join a query onto a layer directory.
///
/// Root and prefix components of `rel` are dropped, so `/sub/file.txt` and
/// `sub/file.txt` address the same entry inside every layer.
pub fn join_relative(dir: &Path, rel: impl AsRef<Path>) -> PathBuf {
    let mut joined = dir.to_path_buf();
    for component in rel.as_ref().components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {}
            other => joined.push(other.as_os_str()),
        }
    }
    joined
}

/// Whether an I/O error only says that the probed entry is not there.
///
/// `NotADirectory` shows up when a leading component of the probed path is a
/// regular file in that layer.
pub(crate) fn is_absent(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory)
}

fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `pop` refuses to remove the root, matching `/..` == `/`
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_absolute_removes_dot_components() {
        let path = absolute("/srv/./data/../static/").unwrap();
        assert_eq!(path, PathBuf::from("/srv/static"));
    }

    #[test]
    fn test_absolute_parent_of_root_is_root() {
        assert_eq!(absolute("/../..").unwrap(), PathBuf::from("/"));
    }

    #[test]
    fn test_absolute_uses_current_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute("some/dir").unwrap(), normalize(&cwd.join("some/dir")));
    }

    #[test]
    fn test_absolute_empty_is_current_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute("").unwrap(), normalize(&cwd));
    }

    #[test]
    fn test_is_absent_classification() {
        assert!(is_absent(&std::io::Error::from(ErrorKind::NotFound)));
        assert!(is_absent(&std::io::Error::from(ErrorKind::NotADirectory)));
        assert!(!is_absent(&std::io::Error::from(ErrorKind::PermissionDenied)));
    }

    #[test]
    fn test_join_relative_keeps_query_inside_layer() {
        let dir = Path::new("/srv/data");
        assert_eq!(
            join_relative(dir, "/sub/file.txt"),
            PathBuf::from("/srv/data/sub/file.txt")
        );
        assert_eq!(
            join_relative(dir, "sub/file.txt"),
            PathBuf::from("/srv/data/sub/file.txt")
        );
    }

    #[test]
    fn test_canonicalize_missing_path_stays_lexical() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("gone/../missing");
        let options = RegistryOptions::default().resolve_symlinks(true);

        let canonical = canonicalize(&missing, options).unwrap();
        assert!(canonical.ends_with("missing"));
        assert!(!canonical.to_string_lossy().contains(".."));
    }

    #[cfg(unix)]
    #[test]
    fn test_canonicalize_resolves_symlinks_when_enabled() {
        let temp_dir = TempDir::new().unwrap();
        let real = temp_dir.path().join("real");
        let link = temp_dir.path().join("link");
        std::fs::create_dir(&real).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let lexical = canonicalize(&link, RegistryOptions::default()).unwrap();
        assert!(lexical.ends_with("link"));

        let resolved = canonicalize(&link, RegistryOptions::default().resolve_symlinks(true)).unwrap();
        assert_eq!(resolved, std::fs::canonicalize(&real).unwrap());
    }
}
