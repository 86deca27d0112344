//! Results reported by cache lookups and stores.

use std::fmt;

use shaderbin_codec::DeserializeError;
use shaderbin_program::UnsupportedFeature;

/// Numeric result codes surfaced by the cache layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ResultCode {
    /// The entry was loaded or stored.
    Success = 0,
    /// The entry is truncated or corrupt.
    ReadError = -1,
    /// The entry belongs to another build, driver, GPU or profile.
    VersionMismatch = -2,
    /// No entry exists under the key.
    Miss = 1,
    /// The cache was not consulted.
    Skipped = 2,
}

impl ResultCode {
    /// The raw integer value.
    pub fn as_i32(self) -> i32 {
        self as i32
    }
}

/// Why the cache was not consulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Caching is turned off.
    Disabled,
    /// The program is already linked; relinking through the cache is not
    /// supported.
    AlreadyLinked,
    /// The program did not link successfully, so there is nothing to store.
    NotLinked,
    /// A source is missing or empty, or the key is too short.
    NoKey,
    /// The program uses a feature the format cannot store.
    Unsupported(UnsupportedFeature),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Disabled => f.write_str("cache disabled"),
            SkipReason::AlreadyLinked => f.write_str("program already linked"),
            SkipReason::NotLinked => f.write_str("program not linked"),
            SkipReason::NoKey => f.write_str("no usable cache key"),
            SkipReason::Unsupported(feature) => write!(f, "unsupported: {feature}"),
        }
    }
}

/// Result of looking a program or shader up in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The entry was found and loaded; the object is ready to use.
    Hit,
    /// No entry exists under the key.
    Miss,
    /// The cache was not consulted.
    Skipped(SkipReason),
    /// An entry exists but could not be loaded. The object's link state has
    /// been cleared and the caller must compile from source.
    LoadFailed(DeserializeError),
}

impl LookupOutcome {
    /// Whether the object was restored from the cache.
    pub fn is_hit(&self) -> bool {
        matches!(self, LookupOutcome::Hit)
    }

    /// The result code for this outcome.
    pub fn code(&self) -> ResultCode {
        match self {
            LookupOutcome::Hit => ResultCode::Success,
            LookupOutcome::Miss => ResultCode::Miss,
            LookupOutcome::Skipped(_) => ResultCode::Skipped,
            LookupOutcome::LoadFailed(err) if err.is_version() => ResultCode::VersionMismatch,
            LookupOutcome::LoadFailed(_) => ResultCode::ReadError,
        }
    }
}

/// Result of storing a program or shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOutcome {
    /// A new entry was written.
    Stored,
    /// An entry already existed under the key and was left untouched.
    AlreadyCached,
    /// Nothing was written.
    Skipped(SkipReason),
}

impl StoreOutcome {
    /// The result code for this outcome.
    pub fn code(&self) -> ResultCode {
        match self {
            StoreOutcome::Stored | StoreOutcome::AlreadyCached => ResultCode::Success,
            StoreOutcome::Skipped(_) => ResultCode::Skipped,
        }
    }
}
