//! Configuration lookup shared by the subcommands.
//!
//! An explicit `--config` must exist. Without it, `shaderbin.toml` in the
//! working directory is used if present, and the defaults otherwise.

use std::path::Path;

use shaderbin_cache::ProgramCache;
use shaderbin_config::{ResolvedCache, ShaderbinConfig, CONFIG_FILE};
use tracing::debug;

use crate::GlobalArgs;

/// Loads the configuration selected by the global flags.
pub fn load(global: &GlobalArgs) -> Result<ShaderbinConfig, shaderbin_config::ConfigError> {
    if let Some(path) = &global.config {
        return shaderbin_config::load_config(path);
    }
    let local = Path::new(CONFIG_FILE);
    if local.is_file() {
        shaderbin_config::load_config(local)
    } else {
        Ok(ShaderbinConfig::default())
    }
}

/// Resolves the cache location, applying `--cache-dir` last.
pub fn resolve(global: &GlobalArgs) -> Result<ResolvedCache, shaderbin_config::ConfigError> {
    let config = load(global)?;
    let mut resolved = shaderbin_config::resolve_cache_from_env(&config);
    if let Some(dir) = &global.cache_dir {
        resolved.root = dir.clone();
    }
    debug!(
        root = %resolved.root.display(),
        enabled = resolved.enabled,
        key = %resolved.key,
        "resolved cache"
    );
    Ok(resolved)
}

/// A cache handle for the resolved location. Does not create the directory.
pub fn cache(resolved: &ResolvedCache) -> ProgramCache {
    ProgramCache::new(&resolved.root)
        .with_key_scheme(resolved.key)
        .with_enabled(resolved.enabled)
}
