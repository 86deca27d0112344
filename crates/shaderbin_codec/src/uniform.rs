//! Uniform storage records.
//!
//! Only the plain fields, the name and the storage element count are
//! persisted. The type is re-derived from the loaded shaders, storage is
//! zero-filled, and driver storage is left for the driver to rebuild.

use shaderbin_program::UniformStorage;
use shaderbin_wire::{ByteCursor, ByteSink, WireError};

use crate::error::CodecError;

/// Largest storage element count accepted from a blob, for one uniform and
/// summed over a program.
pub const MAX_STORAGE_ELEMENTS: u32 = 1 << 24;

/// Components of the widest uniform type, `mat4`.
pub const MAX_COMPONENTS: u32 = 16;

/// Largest remap table accepted from a blob.
pub const MAX_REMAP_SLOTS: u32 = 1 << 20;

/// Encoder and decoder for one [`UniformStorage`] record.
pub struct UniformRecordCodec;

impl UniformRecordCodec {
    /// Appends `uniform` to `sink`.
    pub fn write(uniform: &UniformStorage, sink: &mut ByteSink) -> Result<(), WireError> {
        sink.write_u32(uniform.array_elements);
        sink.write_u32(uniform.remap_location);
        sink.write_u32(uniform.sampler_index);
        sink.write_bool(uniform.sampler_active);
        sink.write_bool(uniform.initialized);
        sink.write_bool(uniform.row_major);
        sink.write_i32(uniform.block_index);
        sink.write_i32(uniform.offset);
        sink.write_i32(uniform.array_stride);
        sink.write_i32(uniform.matrix_stride);
        sink.write_string(Some(uniform.name.as_str()))?;
        sink.write_u32(uniform.storage_elements());
        Ok(())
    }

    /// Reads one record. The type is left unresolved.
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<UniformStorage, CodecError> {
        Self::read_within(cursor, MAX_STORAGE_ELEMENTS)
    }

    /// Reads one record whose storage must fit in `remaining` elements.
    ///
    /// The element count is checked against the uniform's array size and
    /// against `remaining` before any storage is allocated.
    pub fn read_within(
        cursor: &mut ByteCursor<'_>,
        remaining: u32,
    ) -> Result<UniformStorage, CodecError> {
        let array_elements = cursor.read_u32()?;
        let remap_location = cursor.read_u32()?;
        let sampler_index = cursor.read_u32()?;
        let sampler_active = cursor.read_bool()?;
        let initialized = cursor.read_bool()?;
        let row_major = cursor.read_bool()?;
        let block_index = cursor.read_i32()?;
        let offset = cursor.read_i32()?;
        let array_stride = cursor.read_i32()?;
        let matrix_stride = cursor.read_i32()?;
        let name = cursor
            .read_string()?
            .ok_or(CodecError::MissingString { what: "uniform name" })?;

        let elements = cursor.read_u32()?;
        let limit = array_elements
            .max(1)
            .saturating_mul(MAX_COMPONENTS)
            .min(MAX_STORAGE_ELEMENTS);
        if elements > limit {
            return Err(CodecError::StorageTooLarge {
                name,
                elements,
                limit,
            });
        }
        if elements > remaining {
            return Err(CodecError::StorageBudgetExceeded {
                name,
                elements,
                remaining,
            });
        }

        Ok(UniformStorage {
            name,
            ty: None,
            array_elements,
            remap_location,
            sampler_index,
            sampler_active,
            initialized,
            row_major,
            block_index,
            offset,
            array_stride,
            matrix_stride,
            storage: vec![0; elements as usize],
            driver_storage: Vec::new(),
        })
    }

    /// Rebuilds a remap table of `table_len` slots from the uniforms' remap
    /// locations and array sizes.
    pub fn rebuild_remap_table(
        uniforms: &[UniformStorage],
        table_len: u32,
    ) -> Result<Vec<Option<usize>>, CodecError> {
        let available: u64 = uniforms.iter().map(|u| u64::from(u.remap_slots())).sum();
        if table_len > MAX_REMAP_SLOTS || u64::from(table_len) > available {
            return Err(CodecError::RemapTableTooLarge {
                declared: table_len,
                available,
            });
        }

        let mut table = vec![None; table_len as usize];
        for (index, uniform) in uniforms.iter().enumerate() {
            let start = u64::from(uniform.remap_location);
            let end = start + u64::from(uniform.remap_slots());
            if end > u64::from(table_len) {
                return Err(CodecError::RemapOutOfRange {
                    name: uniform.name.clone(),
                    start,
                    end,
                    table_len,
                });
            }
            for slot in &mut table[start as usize..end as usize] {
                *slot = Some(index);
            }
        }
        Ok(table)
    }
}
