//! Acquisition configuration
//!
//! The cache root and owner identity come from the environment the buildpack
//! runs in. An unset or empty cache root disables caching; that is a normal
//! state, not an error.

use std::path::{Path, PathBuf};

/// Environment variable naming the cache root.
pub const CACHE_DIR_ENV: &str = "BUILDPACK_CACHE_DIR";

/// Environment variable naming the owner identity cache entries are filed under.
pub const OWNER_ENV: &str = "BUILDPACK_ID";

/// Owner used when none is configured.
pub const DEFAULT_OWNER: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcquireConfig {
    cache_root: Option<PathBuf>,
    owner: String,
}

impl Default for AcquireConfig {
    fn default() -> Self {
        Self {
            cache_root: None,
            owner: DEFAULT_OWNER.to_string(),
        }
    }
}

impl AcquireConfig {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            cache_root: None,
            owner: owner.into(),
        }
    }

    /// Read configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (used by tests and by
    /// callers that keep their own environment map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cache_root = lookup(CACHE_DIR_ENV)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from);
        let owner = lookup(OWNER_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_OWNER.to_string());
        Self { cache_root, owner }
    }

    /// Set (or with an empty path, clear) the cache root.
    pub fn with_cache_root(mut self, root: Option<PathBuf>) -> Self {
        self.cache_root = root.filter(|p| !p.as_os_str().is_empty());
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Cache root, if caching is enabled.
    pub fn cache_root(&self) -> Option<&Path> {
        self.cache_root.as_deref()
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }
}
