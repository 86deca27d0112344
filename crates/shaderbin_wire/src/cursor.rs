//! Bounds-checked reader over a borrowed byte buffer.

use crate::error::WireError;
use crate::fixed::Fixed;

/// A read cursor over a byte buffer it does not own.
///
/// Every read is bounds-checked. The first failing read records a sticky
/// fault; from then on every read returns a clone of that fault without
/// moving the cursor, so a corrupt stream is never consumed past the point
/// where the corruption was detected. Callers check [`failed`](Self::failed)
/// or [`check`](Self::check) at natural checkpoints such as the end of a
/// table or record.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    fault: Option<WireError>,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            fault: None,
        }
    }

    /// Bytes consumed so far (or the last seek target).
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Total size of the underlying buffer.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the underlying buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The unread tail of the buffer, empty if the cursor is at or past the end.
    pub fn remaining(&self) -> &'a [u8] {
        self.data.get(self.pos..).unwrap_or(&[])
    }

    /// Whether any read has failed.
    pub fn failed(&self) -> bool {
        self.fault.is_some()
    }

    /// The recorded fault, if any.
    pub fn fault(&self) -> Option<&WireError> {
        self.fault.as_ref()
    }

    /// Returns the sticky fault as an error, for use at checkpoints.
    pub fn check(&self) -> Result<(), WireError> {
        match &self.fault {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    /// Records a fault detected by a caller and returns it.
    ///
    /// The first fault wins: if the cursor has already failed, the earlier
    /// fault stays recorded and is the one returned.
    pub fn poison(&mut self, err: WireError) -> WireError {
        self.fault.get_or_insert(err).clone()
    }

    /// Moves the cursor to an absolute offset.
    ///
    /// No bounds check happens here; an out-of-range position makes the next
    /// read fail.
    pub fn seek(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// Moves the cursor forward by `len` bytes without a bounds check.
    pub fn skip(&mut self, len: usize) {
        self.pos = self.pos.saturating_add(len);
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        self.check()?;
        match self.pos.checked_add(len) {
            Some(end) if end <= self.data.len() => {
                let bytes = &self.data[self.pos..end];
                self.pos = end;
                Ok(bytes)
            }
            _ => Err(self.poison(WireError::Overrun {
                offset: self.pos,
                len,
                size: self.data.len(),
            })),
        }
    }

    /// Reads one fixed-width little-endian scalar.
    pub fn read_fixed<T: Fixed>(&mut self) -> Result<T, WireError> {
        self.take(T::SIZE).map(T::decode)
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> Result<u8, WireError> {
        self.read_fixed()
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        self.read_fixed()
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> Result<i32, WireError> {
        self.read_fixed()
    }

    /// Reads a boolean stored as a single `0` or `1` byte.
    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        let offset = self.pos;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            value => {
                self.pos = offset;
                Err(self.poison(WireError::InvalidBool { offset, value }))
            }
        }
    }

    /// Borrows the next `len` bytes and advances past them.
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        self.take(len)
    }

    /// Copies exactly `dst.len()` bytes into `dst`.
    ///
    /// On failure `dst` is left untouched.
    pub fn read_into(&mut self, dst: &mut [u8]) -> Result<(), WireError> {
        let bytes = self.take(dst.len())?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    /// Reads a length-prefixed, null-terminated string.
    ///
    /// The `u32` prefix counts the terminator. A prefix of zero is the
    /// encoding of "no string" and yields `Ok(None)`.
    pub fn read_string(&mut self) -> Result<Option<String>, WireError> {
        let len = self.read_u32()? as usize;
        if len == 0 {
            return Ok(None);
        }

        let offset = self.pos;
        let bytes = self.take(len)?;
        let Some((&0, text)) = bytes.split_last() else {
            self.pos = offset;
            return Err(self.poison(WireError::Unterminated { offset }));
        };

        match std::str::from_utf8(text) {
            Ok(s) => Ok(Some(s.to_owned())),
            Err(_) => {
                self.pos = offset;
                Err(self.poison(WireError::InvalidUtf8 { offset }))
            }
        }
    }
}
