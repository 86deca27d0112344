//! The validation header at the front of every cache blob.
//!
//! The header identifies the build, driver and GPU that produced a blob.
//! Verification rebuilds the header the running process would write and
//! compares it byte-for-byte against the front of the blob: any differing
//! byte is a version-class failure, while a blob that ends inside an
//! otherwise matching header is truncated and therefore read-class.

use serde::Serialize;
use shaderbin_program::{MAX_SAMPLERS, STAGE_COUNT};
use shaderbin_wire::{ByteCursor, ByteSink, WireError};

use crate::context::CodecContext;
use crate::error::{CodecError, DeserializeError, VersionMismatch};

/// Version of the blob layout. Increment on any change to field order or
/// encoding.
pub const FORMAT_VERSION: u32 = 1;

/// Number of fields in the encoded program metadata block.
pub const PROGRAM_FIELDS: u32 = 14;

/// Number of fields in the encoded shader metadata block.
pub const SHADER_FIELDS: u32 = 9;

/// Number of fields in the encoded uniform record, excluding its name.
pub const UNIFORM_FIELDS: u32 = 10;

/// Number of `u32` words in the layout fingerprint.
pub const FINGERPRINT_LEN: usize = 7;

/// Build, driver and GPU identity stored ahead of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationHeader {
    /// Layout fingerprint: format version, stage count, per-record field
    /// counts, sampler slots and instruction-tree format version.
    pub fingerprint: [u32; FINGERPRINT_LEN],
    /// Build magic.
    pub magic: String,
    /// Device vendor.
    pub vendor: String,
    /// Device renderer.
    pub renderer: String,
}

impl ValidationHeader {
    /// The header this process writes, and expects to read, under `ctx`.
    pub fn current(ctx: &CodecContext<'_>) -> Self {
        Self {
            fingerprint: [
                FORMAT_VERSION,
                STAGE_COUNT as u32,
                PROGRAM_FIELDS,
                SHADER_FIELDS,
                UNIFORM_FIELDS,
                MAX_SAMPLERS as u32,
                ctx.ir.format_version(),
            ],
            magic: ctx.magic.to_string(),
            vendor: ctx.driver.vendor().to_string(),
            renderer: ctx.driver.renderer().to_string(),
        }
    }

    /// Appends the encoded header to `sink`.
    pub fn write(&self, sink: &mut ByteSink) -> Result<(), WireError> {
        for word in self.fingerprint {
            sink.write_u32(word);
        }
        sink.write_string(Some(self.magic.as_str()))?;
        sink.write_string(Some(self.vendor.as_str()))?;
        sink.write_string(Some(self.renderer.as_str()))?;
        Ok(())
    }

    /// The encoded header as a standalone byte vector.
    pub fn to_bytes(&self) -> Result<Vec<u8>, WireError> {
        let mut sink = ByteSink::new();
        self.write(&mut sink)?;
        Ok(sink.release())
    }

    /// Decodes whatever header is at the cursor without judging it.
    ///
    /// Used to report which field of a rejected header differs, and by
    /// tooling that inspects blobs produced elsewhere.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self, CodecError> {
        let mut fingerprint = [0; FINGERPRINT_LEN];
        for word in &mut fingerprint {
            *word = cursor.read_u32()?;
        }
        Ok(Self {
            fingerprint,
            magic: read_required(cursor, "build magic")?,
            vendor: read_required(cursor, "vendor string")?,
            renderer: read_required(cursor, "renderer string")?,
        })
    }

    /// Checks that the blob at `cursor` starts with exactly this header and
    /// advances past it.
    pub fn verify(&self, cursor: &mut ByteCursor<'_>) -> Result<(), DeserializeError> {
        let expected = self.to_bytes()?;
        let available = cursor.remaining();
        let common = expected.len().min(available.len());

        if available[..common] != expected[..common] {
            return Err(self.explain_mismatch(available).into());
        }

        // Matching prefix but too short: truncated, not foreign.
        cursor.read_bytes(expected.len())?;
        Ok(())
    }

    fn explain_mismatch(&self, blob: &[u8]) -> VersionMismatch {
        let Ok(found) = Self::read(&mut ByteCursor::new(blob)) else {
            return VersionMismatch::MalformedHeader;
        };

        if found.fingerprint != self.fingerprint {
            VersionMismatch::Fingerprint {
                expected: self.fingerprint.to_vec(),
                found: found.fingerprint.to_vec(),
            }
        } else if found.magic != self.magic {
            VersionMismatch::Magic {
                expected: self.magic.clone(),
                found: found.magic,
            }
        } else if found.vendor != self.vendor {
            VersionMismatch::Vendor {
                expected: self.vendor.clone(),
                found: found.vendor,
            }
        } else if found.renderer != self.renderer {
            VersionMismatch::Renderer {
                expected: self.renderer.clone(),
                found: found.renderer,
            }
        } else {
            VersionMismatch::MalformedHeader
        }
    }
}

fn read_required(cursor: &mut ByteCursor<'_>, what: &'static str) -> Result<String, CodecError> {
    cursor
        .read_string()?
        .ok_or(CodecError::MissingString { what })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ConstantInitializers, FlatIrCodec, HeadlessDriver};

    fn header(vendor: &str) -> ValidationHeader {
        let driver = HeadlessDriver::new(vendor, "softpipe");
        let ctx = CodecContext::new(&driver, &FlatIrCodec, &ConstantInitializers);
        ValidationHeader::current(&ctx)
    }

    #[test]
    fn verify_accepts_own_header() {
        let h = header("Mesa");
        let mut bytes = h.to_bytes().unwrap();
        bytes.extend_from_slice(&[9, 9]);

        let mut cursor = ByteCursor::new(&bytes);
        h.verify(&mut cursor).unwrap();
        assert_eq!(cursor.remaining(), &[9, 9]);
    }

    #[test]
    fn vendor_change_is_reported_by_field() {
        let bytes = header("Acme").to_bytes().unwrap();
        let err = header("Mesa")
            .verify(&mut ByteCursor::new(&bytes))
            .unwrap_err();
        assert_eq!(
            err,
            DeserializeError::Version(VersionMismatch::Vendor {
                expected: "Mesa".to_string(),
                found: "Acme".to_string(),
            })
        );
    }

    #[test]
    fn fingerprint_change_is_reported_first() {
        let h = header("Mesa");
        let mut bytes = h.to_bytes().unwrap();
        bytes[0] ^= 0xff;
        let err = h.verify(&mut ByteCursor::new(&bytes)).unwrap_err();
        assert!(matches!(
            err,
            DeserializeError::Version(VersionMismatch::Fingerprint { .. })
        ));
    }

    #[test]
    fn truncated_header_is_read_class() {
        let h = header("Mesa");
        let bytes = h.to_bytes().unwrap();
        let err = h
            .verify(&mut ByteCursor::new(&bytes[..bytes.len() - 1]))
            .unwrap_err();
        assert!(!err.is_version());
    }

    #[test]
    fn empty_blob_is_read_class() {
        let err = header("Mesa").verify(&mut ByteCursor::new(&[])).unwrap_err();
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn read_decodes_foreign_header() {
        let h = header("Acme");
        let bytes = h.to_bytes().unwrap();
        let decoded = ValidationHeader::read(&mut ByteCursor::new(&bytes)).unwrap();
        assert_eq!(decoded, h);
        assert_eq!(decoded.fingerprint[0], FORMAT_VERSION);
    }
}
