//! Shader records.
//!
//! A record is a `u32` byte length, the API type tag, the shader metadata
//! block and the encoded instruction tree. The length covers everything
//! after itself and is patched in once the record is complete.

use shaderbin_program::{Shader, ShaderMetadata, Stage, UnsupportedFeature, MAX_SAMPLERS};
use shaderbin_wire::{ByteCursor, ByteSink, WireError};

use crate::context::CodecContext;
use crate::error::{CodecError, DeserializeError, SerializeError};
use crate::header::ValidationHeader;

/// Encoder and decoder for shader records and standalone shader blobs.
pub struct ShaderRecordCodec;

impl ShaderRecordCodec {
    /// Appends a record for `shader` using its own metadata.
    pub fn write(
        ctx: &CodecContext<'_>,
        shader: &Shader,
        sink: &mut ByteSink,
    ) -> Result<(), SerializeError> {
        Self::write_with_metadata(ctx, shader, &shader.metadata, sink)
    }

    /// Appends a record for `shader`, encoding `metadata` in place of the
    /// shader's own.
    pub(crate) fn write_with_metadata(
        ctx: &CodecContext<'_>,
        shader: &Shader,
        metadata: &ShaderMetadata,
        sink: &mut ByteSink,
    ) -> Result<(), SerializeError> {
        let len_at = sink.reserve_u32();
        sink.write_u32(metadata.stage.type_tag());
        write_metadata(metadata, sink);
        ctx.ir.write_tree(shader, sink)?;

        let len = sink.position() - len_at - 4;
        let len = u32::try_from(len).map_err(|_| WireError::TooLong { len })?;
        sink.patch_u32(len_at, len)?;
        Ok(())
    }

    /// Reads one record into a shader freshly allocated by the driver.
    ///
    /// Source, label and info log are left empty. On failure the partially
    /// built shader is handed back to the driver for deletion.
    pub fn read(ctx: &CodecContext<'_>, cursor: &mut ByteCursor<'_>) -> Result<Shader, CodecError> {
        let _record_len = cursor.read_u32()?;
        let declared = Stage::from_type_tag(cursor.read_u32()?)?;

        let mut shader = ctx
            .driver
            .new_shader(declared)
            .ok_or(CodecError::DriverAllocation {
                stage: declared,
                object: "shader",
            })?;

        match Self::populate(ctx, declared, &mut shader, cursor) {
            Ok(()) => Ok(shader),
            Err(err) => {
                ctx.driver.delete_shader(shader);
                Err(err)
            }
        }
    }

    fn populate(
        ctx: &CodecContext<'_>,
        declared: Stage,
        shader: &mut Shader,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(), CodecError> {
        let metadata = read_metadata(cursor)?;
        if metadata.stage != declared {
            return Err(CodecError::StageMismatch {
                declared,
                found: metadata.stage,
            });
        }

        shader.metadata = metadata;
        shader.source = None;
        shader.label = None;
        shader.info_log.clear();

        let program = ctx
            .driver
            .new_program(declared, shader.name)
            .ok_or(CodecError::DriverAllocation {
                stage: declared,
                object: "program",
            })?;
        shader.program = Some(program);

        ctx.ir.read_tree(shader, cursor)?;
        Ok(())
    }

    /// Whether a single shader of `stage` can be cached on its own.
    pub fn supported_by_shader_cache(stage: Stage) -> bool {
        stage != Stage::Geometry
    }

    /// Encodes one compiled shader as a standalone blob: validation header
    /// followed by a single record.
    pub fn serialize_standalone(
        ctx: &CodecContext<'_>,
        shader: &Shader,
    ) -> Result<Vec<u8>, SerializeError> {
        if !Self::supported_by_shader_cache(shader.stage()) {
            return Err(UnsupportedFeature::GeometryStage.into());
        }

        let mut sink = ByteSink::new();
        ValidationHeader::current(ctx).write(&mut sink)?;
        Self::write(ctx, shader, &mut sink)?;
        Ok(sink.release())
    }

    /// Decodes a blob written by [`serialize_standalone`](Self::serialize_standalone).
    pub fn deserialize_standalone(
        ctx: &CodecContext<'_>,
        blob: &[u8],
    ) -> Result<Shader, DeserializeError> {
        let mut cursor = ByteCursor::new(blob);
        ValidationHeader::current(ctx).verify(&mut cursor)?;
        Ok(Self::read(ctx, &mut cursor)?)
    }
}

fn write_metadata(metadata: &ShaderMetadata, sink: &mut ByteSink) {
    sink.write_u32(metadata.stage.type_tag());
    sink.write_u32(metadata.version);
    sink.write_bool(metadata.is_es);
    sink.write_bool(metadata.compile_status);
    sink.write_u32(metadata.num_samplers);
    sink.write_u32(metadata.num_uniform_components);
    sink.write_u32(metadata.active_sampler_mask);
    sink.write_u32(metadata.shadow_samplers);
    sink.write_bytes(&metadata.sampler_units);
}

fn read_metadata(cursor: &mut ByteCursor<'_>) -> Result<ShaderMetadata, CodecError> {
    let stage = Stage::from_type_tag(cursor.read_u32()?)?;
    let version = cursor.read_u32()?;
    let is_es = cursor.read_bool()?;
    let compile_status = cursor.read_bool()?;
    let num_samplers = cursor.read_u32()?;
    let num_uniform_components = cursor.read_u32()?;
    let active_sampler_mask = cursor.read_u32()?;
    let shadow_samplers = cursor.read_u32()?;
    let mut sampler_units = [0; MAX_SAMPLERS];
    cursor.read_into(&mut sampler_units)?;

    Ok(ShaderMetadata {
        stage,
        version,
        is_es,
        compile_status,
        num_samplers,
        num_uniform_components,
        active_sampler_mask,
        shadow_samplers,
        sampler_units,
    })
}
