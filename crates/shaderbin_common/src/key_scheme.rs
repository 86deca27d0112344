//! Selection of the cache key derivation scheme.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How cache keys are derived from shader sources.
///
/// `Checksum` is the legacy 32-bit rolling checksum rendered in decimal. It is
/// short and stable but weak: two sources that collide silently share one
/// cache entry. `Digest` uses a 128-bit [`ContentHash`](crate::ContentHash)
/// per source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyScheme {
    /// Decimal rolling checksum per source.
    #[default]
    Checksum,
    /// Hex XXH3-128 digest per source.
    Digest,
}

impl KeyScheme {
    /// Lowercase name as used in configuration files.
    pub fn name(self) -> &'static str {
        match self {
            KeyScheme::Checksum => "checksum",
            KeyScheme::Digest => "digest",
        }
    }
}

impl fmt::Display for KeyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error type for parsing key scheme names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseKeySchemeError {
    /// The input string that failed to parse.
    pub input: String,
}

impl fmt::Display for ParseKeySchemeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid key scheme: '{}' (expected 'checksum' or 'digest')",
            self.input
        )
    }
}

impl std::error::Error for ParseKeySchemeError {}

impl FromStr for KeyScheme {
    type Err = ParseKeySchemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "checksum" => Ok(KeyScheme::Checksum),
            "digest" => Ok(KeyScheme::Digest),
            _ => Err(ParseKeySchemeError {
                input: s.to_string(),
            }),
        }
    }
}
