//! Whole-program serialization.
//!
//! Blob layout, in order:
//!
//! 1. [`ValidationHeader`]
//! 2. program metadata block
//! 3. attribute, fragment data, fragment data index and uniform name tables
//! 4. one uniform record per entry in the uniform storage table
//! 5. a `u32` stage count, then per stage its slot index and a shader record
//!
//! All integers are little-endian.

use shaderbin_program::{
    FragDepthLayout, GeometryInfo, ProgramMetadata, Shader, ShaderProgram, Stage, UniformStorage,
    VertexInfo,
};
use shaderbin_wire::{read_map_into, write_map, ByteCursor, ByteSink};
use tracing::trace;

use crate::collab::Api;
use crate::context::CodecContext;
use crate::error::{CodecError, DeserializeError, SerializeError, VersionMismatch};
use crate::header::ValidationHeader;
use crate::shader::ShaderRecordCodec;
use crate::uniform::{UniformRecordCodec, MAX_STORAGE_ELEMENTS};

/// Encoder and decoder for linked programs.
pub struct ProgramCodec;

impl ProgramCodec {
    /// Encodes a linked program.
    ///
    /// Programs with a geometry stage, uniform blocks or transform feedback
    /// varyings are refused. Each stage is written with the program's
    /// language version and profile in place of its own.
    pub fn serialize(
        ctx: &CodecContext<'_>,
        program: &ShaderProgram,
    ) -> Result<Vec<u8>, SerializeError> {
        if let Some(feature) = program.unsupported_feature() {
            return Err(feature.into());
        }
        if program.metadata.num_user_uniform_storage as usize != program.uniform_storage.len() {
            return Err(SerializeError::Inconsistent(format!(
                "{} uniforms recorded but {} stored",
                program.metadata.num_user_uniform_storage,
                program.uniform_storage.len()
            )));
        }

        let mut sink = ByteSink::new();
        ValidationHeader::current(ctx).write(&mut sink)?;
        write_metadata(&program.metadata, &mut sink);

        write_map(&mut sink, &program.attribute_bindings)?;
        write_map(&mut sink, &program.frag_data_bindings)?;
        write_map(&mut sink, &program.frag_data_index_bindings)?;
        write_map(&mut sink, &program.uniform_hash)?;

        for uniform in &program.uniform_storage {
            UniformRecordCodec::write(uniform, &mut sink)?;
        }

        let count_at = sink.reserve_u32();
        let mut stages = 0;
        for stage in Stage::ALL {
            let Some(shader) = program.linked_shader(stage) else {
                continue;
            };
            let mut metadata = shader.metadata.clone();
            metadata.version = program.metadata.version;
            metadata.is_es = program.metadata.is_es;

            sink.write_u32(stage.index() as u32);
            ShaderRecordCodec::write_with_metadata(ctx, shader, &metadata, &mut sink)?;
            stages += 1;
        }
        sink.patch_u32(count_at, stages)?;

        trace!(program = program.name, stages, bytes = sink.position(), "serialized program");
        Ok(sink.release())
    }

    /// Restores link state into `program` from `blob`.
    ///
    /// On success the program is linked exactly as if the linker had run.
    /// On any failure its link state is cleared so the caller can link from
    /// source; attached shaders and application bindings survive either way.
    pub fn deserialize(
        ctx: &CodecContext<'_>,
        program: &mut ShaderProgram,
        blob: &[u8],
    ) -> Result<(), DeserializeError> {
        let result = Self::load(ctx, program, blob);
        if result.is_err() {
            program.clear_link_state();
        }
        result
    }

    fn load(
        ctx: &CodecContext<'_>,
        program: &mut ShaderProgram,
        blob: &[u8],
    ) -> Result<(), DeserializeError> {
        let mut cursor = ByteCursor::new(blob);
        ValidationHeader::current(ctx).verify(&mut cursor)?;

        let linked = read_metadata(&mut cursor)?;
        if linked.is_es && ctx.driver.api() == Api::Desktop {
            return Err(VersionMismatch::EsProfile.into());
        }

        Self::restore(ctx, program, &linked, &mut cursor)?;
        Ok(())
    }

    fn restore(
        ctx: &CodecContext<'_>,
        program: &mut ShaderProgram,
        linked: &ProgramMetadata,
        cursor: &mut ByteCursor<'_>,
    ) -> Result<(), CodecError> {
        program.metadata.copy_link_results(linked);

        program.uniform_hash.clear();
        read_map_into(cursor, &mut program.attribute_bindings)?;
        read_map_into(cursor, &mut program.frag_data_bindings)?;
        read_map_into(cursor, &mut program.frag_data_index_bindings)?;
        read_map_into(cursor, &mut program.uniform_hash)?;

        program.uniform_storage.clear();
        let mut remaining = MAX_STORAGE_ELEMENTS;
        for _ in 0..linked.num_user_uniform_storage {
            let uniform = UniformRecordCodec::read_within(cursor, remaining)?;
            remaining -= uniform.storage.len() as u32;
            program.uniform_storage.push(uniform);
        }
        program.uniform_remap_table = UniformRecordCodec::rebuild_remap_table(
            &program.uniform_storage,
            linked.num_uniform_remap_table,
        )?;

        let stage_count = cursor.read_u32()?;
        program.linked_shaders = Default::default();
        program.link_status = true;

        for _ in 0..stage_count {
            let stage = Stage::from_index(cursor.read_u32()?)?;
            if program.linked_shaders[stage.index()].is_some() {
                return Err(CodecError::DuplicateStage(stage));
            }

            let mut shader = ShaderRecordCodec::read(ctx, cursor)?;
            resolve_uniform_types(&mut program.uniform_storage, &shader);
            ctx.driver.materialize_stage(stage, program, &mut shader);
            trace!(program = program.name, %stage, shader = shader.name, "restored stage");
            program.linked_shaders[stage.index()] = Some(shader);
        }

        ctx.linker.apply_uniform_initializers(program);
        program.linked = true;
        Ok(())
    }
}

/// Re-derives uniform types from the declarations in a loaded stage.
fn resolve_uniform_types(uniforms: &mut [UniformStorage], shader: &Shader) {
    let Some(tree) = &shader.ir else {
        return;
    };
    for uniform in uniforms.iter_mut() {
        if let Some(decl) = tree.find_variable(&uniform.name) {
            uniform.ty = Some(decl.ty.element_type());
        }
    }
}

fn write_metadata(metadata: &ProgramMetadata, sink: &mut ByteSink) {
    sink.write_u32(metadata.version);
    sink.write_bool(metadata.is_es);
    sink.write_u32(metadata.num_user_uniform_storage);
    sink.write_u32(metadata.num_uniform_remap_table);
    sink.write_u32(metadata.last_clip_distance_array_size);
    sink.write_u32(metadata.frag_depth_layout.tag());
    sink.write_i32(metadata.geometry.vertices_out);
    sink.write_u32(metadata.geometry.input_type);
    sink.write_u32(metadata.geometry.output_type);
    sink.write_i32(metadata.geometry.invocations);
    sink.write_bool(metadata.geometry.uses_end_primitive);
    sink.write_bool(metadata.vertex.uses_clip_distance);
    sink.write_u32(metadata.vertex.clip_distance_array_size);
    sink.write_bool(metadata.validate_status);
}

fn read_metadata(cursor: &mut ByteCursor<'_>) -> Result<ProgramMetadata, CodecError> {
    let version = cursor.read_u32()?;
    let is_es = cursor.read_bool()?;
    let num_user_uniform_storage = cursor.read_u32()?;
    let num_uniform_remap_table = cursor.read_u32()?;
    let last_clip_distance_array_size = cursor.read_u32()?;
    let depth_tag = cursor.read_u32()?;
    let frag_depth_layout = FragDepthLayout::from_tag(depth_tag).ok_or(CodecError::InvalidTag {
        what: "frag depth layout",
        value: depth_tag,
    })?;
    let geometry = GeometryInfo {
        vertices_out: cursor.read_i32()?,
        input_type: cursor.read_u32()?,
        output_type: cursor.read_u32()?,
        invocations: cursor.read_i32()?,
        uses_end_primitive: cursor.read_bool()?,
    };
    let vertex = VertexInfo {
        uses_clip_distance: cursor.read_bool()?,
        clip_distance_array_size: cursor.read_u32()?,
    };
    let validate_status = cursor.read_bool()?;

    Ok(ProgramMetadata {
        version,
        is_es,
        num_user_uniform_storage,
        num_uniform_remap_table,
        last_clip_distance_array_size,
        frag_depth_layout,
        geometry,
        vertex,
        validate_status,
    })
}
