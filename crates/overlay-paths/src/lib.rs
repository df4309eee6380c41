//! Overlay Paths - layered search paths for data and static content.
//!
//! Independent components register directories into a category ("data",
//! "static", or any other name). Together the directories of a category form
//! an overlay: a relative path is looked up in every directory, in
//! registration order, and earlier directories shadow later ones.
//!
//! # Example
//!
//! ```rust,ignore
//! use overlay_paths::{resolver, Owner, RegistrySet};
//!
//! fn main() -> overlay_paths::Result<()> {
//!     let registries = RegistrySet::global();
//!
//!     // A plugin contributes its bundled data directory
//!     let mut plugin = Owner::new(registries.data());
//!     plugin.register_local("/usr/share/myplugin/data")?;
//!
//!     // Look the file up across every registered data directory
//!     if let Some(path) = resolver::resolve_first(&registries.data(), "templates/page.html")? {
//!         println!("Using {}", path.display());
//!     }
//!
//!     plugin.unregister_all_local();
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod loader;
pub mod owner;
pub mod paths;
pub mod registry;
pub mod resolver;

// Re-export commonly used types
pub use config::{Category, GlobConfig, RegistryOptions};
pub use error::{BoxError, OverlayError, Result};
pub use loader::{
    load_json_all, load_json_first, load_structured_all, load_structured_first, load_yaml_all,
    load_yaml_first,
};
pub use owner::Owner;
pub use registry::{OwnerId, PathRegistry, RegistrySet};
pub use resolver::{
    resolve_all, resolve_all_of_kind, resolve_each, resolve_each_of_kind, resolve_first,
    resolve_first_of_kind, resolve_glob, resolve_glob_first_nonempty, EntryKind, ResolveEach,
};
