//! Append-only growable byte buffer.

use crate::error::WireError;
use crate::fixed::Fixed;

/// An append-only byte buffer with patch support.
///
/// Values are appended at the end. A length field whose value is only known
/// after a section has been written is reserved with
/// [`reserve_u32`](Self::reserve_u32) and filled in with
/// [`patch_u32`](Self::patch_u32). [`release`](Self::release) consumes the
/// sink and hands the finished buffer to the caller.
#[derive(Debug, Default)]
pub struct ByteSink {
    buf: Vec<u8>,
}

impl ByteSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.buf.len()
    }

    /// The bytes written so far.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Appends one fixed-width little-endian scalar.
    pub fn write_fixed<T: Fixed>(&mut self, value: T) {
        value.encode(&mut self.buf);
    }

    /// Appends a `u8`.
    pub fn write_u8(&mut self, value: u8) {
        self.write_fixed(value);
    }

    /// Appends a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.write_fixed(value);
    }

    /// Appends a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.write_fixed(value);
    }

    /// Appends a boolean as a single `0`/`1` byte.
    pub fn write_bool(&mut self, value: bool) {
        self.write_u8(u8::from(value));
    }

    /// Appends raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Appends a length-prefixed, null-terminated string.
    ///
    /// `None` writes a zero length and nothing else. `Some(s)` writes
    /// `len(s) + 1`, the bytes of `s`, and a trailing null.
    pub fn write_string(&mut self, value: Option<&str>) -> Result<(), WireError> {
        let Some(text) = value else {
            self.write_u32(0);
            return Ok(());
        };
        let len = text
            .len()
            .checked_add(1)
            .and_then(|len| u32::try_from(len).ok())
            .ok_or(WireError::TooLong { len: text.len() })?;
        self.write_u32(len);
        self.write_bytes(text.as_bytes());
        self.write_u8(0);
        Ok(())
    }

    /// Writes a zero `u32` placeholder and returns its offset.
    pub fn reserve_u32(&mut self) -> usize {
        let at = self.position();
        self.write_u32(0);
        at
    }

    /// Overwrites already-written bytes at `at`.
    pub fn patch(&mut self, at: usize, bytes: &[u8]) -> Result<(), WireError> {
        let written = self.buf.len();
        let target = at
            .checked_add(bytes.len())
            .filter(|&end| end <= written)
            .map(|end| &mut self.buf[at..end]);
        match target {
            Some(slot) => {
                slot.copy_from_slice(bytes);
                Ok(())
            }
            None => Err(WireError::PatchOutOfBounds {
                at,
                len: bytes.len(),
                written,
            }),
        }
    }

    /// Overwrites a previously reserved `u32`.
    pub fn patch_u32(&mut self, at: usize, value: u32) -> Result<(), WireError> {
        self.patch(at, &value.to_le_bytes())
    }

    /// Consumes the sink and returns the finished buffer.
    pub fn release(mut self) -> Vec<u8> {
        self.buf.shrink_to_fit();
        self.buf
    }
}
