//! Centralized configuration for overlay path registries.
//!
//! Categories name the independent registries ("data", "static", ...), while
//! `RegistryOptions` and `GlobConfig` fix how paths are canonicalized and
//! how glob patterns are matched inside each layer.

use std::borrow::Cow;
use std::fmt;

/// A named partition of the registry.
///
/// Categories are independent namespaces that share the same mechanism.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(Cow<'static, str>);

impl Category {
    /// Directories holding data content.
    pub const DATA: Category = Category(Cow::Borrowed("data"));
    /// Directories holding static content.
    pub const STATIC: Category = Category(Cow::Borrowed("static"));

    /// Create a category with an arbitrary name.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Category(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Category {
    fn from(name: &'static str) -> Self {
        Category(Cow::Borrowed(name))
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Category(Cow::Owned(name))
    }
}

/// Per-registry canonicalization settings.
///
/// The options are fixed when a registry is created so every path it stores
/// or removes is canonicalized the same way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryOptions {
    /// Resolve symlinks through the filesystem instead of normalizing the
    /// path lexically.
    pub resolve_symlinks: bool,
}

impl RegistryOptions {
    pub fn resolve_symlinks(mut self, enabled: bool) -> Self {
        self.resolve_symlinks = enabled;
        self
    }
}

/// Glob matching defaults applied inside every layer.
pub struct GlobConfig;

impl GlobConfig {
    pub const CASE_SENSITIVE: bool = true;
    /// `*` and `?` never match `/`; use `**` to descend.
    pub const REQUIRE_LITERAL_SEPARATOR: bool = true;
    /// Hidden entries are only matched by patterns that spell out the dot.
    pub const REQUIRE_LITERAL_LEADING_DOT: bool = true;

    pub fn match_options() -> glob::MatchOptions {
        glob::MatchOptions {
            case_sensitive: Self::CASE_SENSITIVE,
            require_literal_separator: Self::REQUIRE_LITERAL_SEPARATOR,
            require_literal_leading_dot: Self::REQUIRE_LITERAL_LEADING_DOT,
        }
    }
}
