//! Cache key derivation from shader sources.
//!
//! A key is the concatenation of one token per source, in attach order.
//! Any source that is missing or empty means the program has no key and is
//! never cached. Keys shorter than [`MIN_KEY_LEN`] are rejected as too weak.

use std::fmt;

use shaderbin_common::{ContentHash, KeyScheme};
use shaderbin_program::{Shader, ShaderProgram};

/// Shortest key accepted.
pub const MIN_KEY_LEN: usize = 7;

/// A file-name-safe cache key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey(String);

impl CacheKey {
    /// Derives a key from sources given in attach order.
    ///
    /// Returns `None` if any source is absent or empty, or if the resulting
    /// key is shorter than [`MIN_KEY_LEN`].
    pub fn derive<'a, I>(sources: I, scheme: KeyScheme) -> Option<Self>
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut key = String::new();
        for source in sources {
            let source = source.filter(|s| !s.is_empty())?;
            match scheme {
                KeyScheme::Checksum => key.push_str(&source_checksum(source).to_string()),
                KeyScheme::Digest => key.push_str(&ContentHash::from_text(source).to_string()),
            }
        }

        (key.len() >= MIN_KEY_LEN).then_some(Self(key))
    }

    /// The key of a program, from its attached shaders' sources.
    pub fn for_program(program: &ShaderProgram, scheme: KeyScheme) -> Option<Self> {
        Self::derive(program.shaders.iter().map(|s| s.source.as_deref()), scheme)
    }

    /// The key of a single shader, from its own source.
    pub fn for_shader(shader: &Shader, scheme: KeyScheme) -> Option<Self> {
        Self::derive([shader.source.as_deref()], scheme)
    }

    /// The key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The legacy 32-bit checksum of one source.
///
/// A positional string checksum, then one XOR and rotate-left-by-5 round per
/// byte so that small edits such as `mat3` to `mat4` still change the value.
/// Bytes are sign-extended before mixing.
pub fn source_checksum(source: &str) -> u32 {
    let mut sum = str_checksum(source);
    for &byte in source.as_bytes() {
        sum ^= signed(byte);
        sum = sum.rotate_left(5);
    }
    sum
}

fn str_checksum(source: &str) -> u32 {
    let mut sum: u32 = 1;
    let mut i: u32 = 1;
    for &byte in source.as_bytes() {
        sum = sum.wrapping_add(signed(byte).wrapping_mul(i % 100));
        i = i.wrapping_add(1);
    }
    sum.wrapping_add(i)
}

fn signed(byte: u8) -> u32 {
    byte as i8 as u32
}
