//! Error types for cache operations.

use std::path::PathBuf;

use shaderbin_codec::SerializeError;

/// Errors that can occur while writing to or maintaining the cache.
///
/// Lookups never return these: a lookup that cannot read or decode an entry
/// reports a miss or a load failure instead.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The program or shader could not be encoded.
    #[error("failed to serialize cache entry: {0}")]
    Serialize(#[from] SerializeError),
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CacheError::Io { path, source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shaderbin_program::UnsupportedFeature;

    #[test]
    fn io_error_display() {
        let err = CacheError::Io {
            path: PathBuf::from("/tmp/cache/12345678.bin"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("cache I/O error"));
        assert!(msg.contains("12345678.bin"));
    }

    #[test]
    fn serialize_error_display() {
        let err = CacheError::from(SerializeError::Unsupported(UnsupportedFeature::GeometryStage));
        assert!(err.to_string().contains("geometry"));
    }
}
