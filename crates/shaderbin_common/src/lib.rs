//! Shared foundational types used across the shaderbin crates.
//!
//! This crate provides the content digest used by cache key schemes and by
//! tooling that needs a stable fingerprint of source text, and the key scheme
//! selector shared by configuration and the cache.

#![warn(missing_docs)]

pub mod hash;
pub mod key_scheme;

pub use hash::ContentHash;
pub use key_scheme::{KeyScheme, ParseKeySchemeError};
