//! Category-scoped registries of layer directories.
//!
//! This module provides:
//! - **`PathRegistry`**: the ordered, de-duplicated directories of one
//!   category, with reference tracking for owner registrations
//! - **`RegistrySet`**: lazily created registries keyed by category, plus the
//!   process-wide instance
//!
//! Registration order is resolution order. A directory registered earlier
//! shadows the same relative path in any directory registered later.

pub mod path_registry;
pub mod set;

pub use path_registry::{OwnerId, PathRegistry};
pub use set::RegistrySet;
