//! Error types for wire-level reads and writes.

/// Errors raised by [`ByteCursor`](crate::ByteCursor) and
/// [`ByteSink`](crate::ByteSink).
///
/// Every variant records the byte offset at which the problem was detected so
/// corrupt blobs can be diagnosed from logs alone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WireError {
    /// A read would run past the end of the buffer.
    #[error("read of {len} bytes at offset {offset} overruns {size}-byte buffer")]
    Overrun {
        /// Cursor position when the read was attempted.
        offset: usize,
        /// Number of bytes requested.
        len: usize,
        /// Total size of the buffer.
        size: usize,
    },

    /// A length-prefixed string does not end with a null byte.
    #[error("string at offset {offset} is not null-terminated")]
    Unterminated {
        /// Offset of the first string byte.
        offset: usize,
    },

    /// A string payload is not valid UTF-8.
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 {
        /// Offset of the first string byte.
        offset: usize,
    },

    /// A boolean byte held something other than 0 or 1.
    #[error("invalid boolean byte {value:#04x} at offset {offset}")]
    InvalidBool {
        /// Offset of the byte.
        offset: usize,
        /// The byte that was found.
        value: u8,
    },

    /// A name/value table entry has a null key.
    #[error("table entry at offset {offset} has no key")]
    MissingKey {
        /// Offset of the entry.
        offset: usize,
    },

    /// A patch targets bytes that have not been written yet.
    #[error("patch of {len} bytes at offset {at} exceeds {written} written bytes")]
    PatchOutOfBounds {
        /// Offset the patch was aimed at.
        at: usize,
        /// Length of the patch.
        len: usize,
        /// Bytes written so far.
        written: usize,
    },

    /// A length does not fit the 32-bit length prefix.
    #[error("length {len} does not fit in a u32 prefix")]
    TooLong {
        /// The offending length.
        len: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrun_display() {
        let err = WireError::Overrun {
            offset: 12,
            len: 4,
            size: 14,
        };
        assert_eq!(
            err.to_string(),
            "read of 4 bytes at offset 12 overruns 14-byte buffer"
        );
    }

    #[test]
    fn invalid_bool_display() {
        let err = WireError::InvalidBool {
            offset: 3,
            value: 7,
        };
        assert!(err.to_string().contains("0x07"));
    }

    #[test]
    fn patch_display() {
        let err = WireError::PatchOutOfBounds {
            at: 8,
            len: 4,
            written: 10,
        };
        let msg = err.to_string();
        assert!(msg.contains("offset 8"));
        assert!(msg.contains("10 written"));
    }
}
