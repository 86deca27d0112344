//! On-disk cache of linked shader programs.
//!
//! Programs are keyed by their shader sources and stored one file per entry
//! under a cache root, `<root>/<key>.bin`. The first program stored under a
//! key wins; later stores of the same key leave the file untouched. All
//! lookups are fail-safe: a missing, foreign or corrupt entry is reported as
//! an outcome and the caller links from source.

#![warn(missing_docs)]

pub mod error;
pub mod key;
pub mod outcome;
pub mod store;

pub use error::CacheError;
pub use key::{source_checksum, CacheKey, MIN_KEY_LEN};
pub use outcome::{LookupOutcome, ResultCode, SkipReason, StoreOutcome};
pub use shaderbin_common::KeyScheme;
pub use store::{CacheEntry, EntryKind, ProgramCache};
