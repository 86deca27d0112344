//! Cache location resolution: merging the configuration with the environment.

use crate::types::ShaderbinConfig;
use shaderbin_common::KeyScheme;
use std::path::PathBuf;

/// Overrides the cache directory, taking precedence over the configuration.
pub const CACHE_DIR_VAR: &str = "SHADERBIN_CACHE_DIR";

/// Set to `1` to turn the cache off.
pub const DISABLE_VAR: &str = "SHADERBIN_DISABLE";

/// Last-resort cache root when neither `XDG_CACHE_DIR` nor `HOME` is set.
pub const FALLBACK_ROOT: &str = "/tmp/.cache";

const SUBDIR: &str = "shaderbin";

/// Where the cache lives and how it is used, after applying the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCache {
    /// Cache directory. Not created here.
    pub root: PathBuf,
    /// Whether the cache should be consulted at all.
    pub enabled: bool,
    /// Key derivation scheme.
    pub key: KeyScheme,
}

/// Resolves the cache location from `config` and an environment lookup.
///
/// The directory is the first of: `SHADERBIN_CACHE_DIR` verbatim, the
/// configured `cache.dir`, `$XDG_CACHE_DIR/shaderbin`,
/// `$HOME/.cache/shaderbin`, `/tmp/.cache/shaderbin`. Empty variables count
/// as unset.
pub fn resolve_cache<F>(config: &ShaderbinConfig, env: F) -> ResolvedCache
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| env(name).filter(|v| !v.is_empty());

    let root = if let Some(dir) = var(CACHE_DIR_VAR) {
        PathBuf::from(dir)
    } else if let Some(dir) = &config.cache.dir {
        dir.clone()
    } else if let Some(xdg) = var("XDG_CACHE_DIR") {
        PathBuf::from(xdg).join(SUBDIR)
    } else if let Some(home) = var("HOME") {
        PathBuf::from(home).join(".cache").join(SUBDIR)
    } else {
        PathBuf::from(FALLBACK_ROOT).join(SUBDIR)
    };

    let disabled = var(DISABLE_VAR).is_some_and(|v| v == "1");

    ResolvedCache {
        root,
        enabled: config.cache.enabled && !disabled,
        key: config.cache.key,
    }
}

/// [`resolve_cache`] over the process environment.
pub fn resolve_cache_from_env(config: &ShaderbinConfig) -> ResolvedCache {
    resolve_cache(config, |name| std::env::var(name).ok())
}
