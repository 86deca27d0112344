//! Configuration types deserialized from `shaderbin.toml`.

use serde::Deserialize;
use shaderbin_common::KeyScheme;
use std::path::PathBuf;

/// The top-level configuration parsed from `shaderbin.toml`.
///
/// Every section is optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShaderbinConfig {
    /// Program cache settings.
    #[serde(default)]
    pub cache: CacheSettings,
}

/// The `[cache]` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    /// Whether programs are looked up in and stored to the cache.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Explicit cache directory. Overrides the XDG and home fallbacks but
    /// not `SHADERBIN_CACHE_DIR`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// How keys are derived from shader sources.
    #[serde(default)]
    pub key: KeyScheme,
}

fn default_enabled() -> bool {
    true
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            dir: None,
            key: KeyScheme::default(),
        }
    }
}
