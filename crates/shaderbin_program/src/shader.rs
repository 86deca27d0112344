//! Shader objects.

use crate::ir::InstructionTree;
use crate::stage::Stage;

/// Number of sampler unit slots tracked per shader.
pub const MAX_SAMPLERS: usize = 16;

/// The plain-data part of a compiled shader.
///
/// This is everything about a shader that survives a round trip through the
/// cache. Identity and driver-owned state live on [`Shader`] itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderMetadata {
    /// Stage this shader was compiled for.
    pub stage: Stage,
    /// Shading language version, e.g. `330` or `300` for ES 3.0.
    pub version: u32,
    /// Whether the source was written for an ES profile.
    pub is_es: bool,
    /// Result of the last compile.
    pub compile_status: bool,
    /// Number of sampler uniforms used.
    pub num_samplers: u32,
    /// Number of uniform scalar components used.
    pub num_uniform_components: u32,
    /// Bitmask of sampler units referenced.
    pub active_sampler_mask: u32,
    /// Bitmask of samplers that are shadow samplers.
    pub shadow_samplers: u32,
    /// Texture unit bound to each sampler slot.
    pub sampler_units: [u8; MAX_SAMPLERS],
}

impl ShaderMetadata {
    /// Default metadata for a freshly created shader of `stage`.
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            version: 110,
            is_es: false,
            compile_status: false,
            num_samplers: 0,
            num_uniform_components: 0,
            active_sampler_mask: 0,
            shadow_samplers: 0,
            sampler_units: [0; MAX_SAMPLERS],
        }
    }
}

/// A driver-side program object backing one linked stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuProgram {
    /// Stage the program executes.
    pub stage: Stage,
    /// Driver object name.
    pub id: u32,
}

/// A shader object, either attached to a program for linking or produced by
/// the linker as one stage of a linked program.
#[derive(Debug, Clone, PartialEq)]
pub struct Shader {
    /// API object name. Never persisted.
    pub name: u32,
    /// Reference count held by the API layer. Never persisted.
    pub ref_count: u32,
    /// Persisted plain data.
    pub metadata: ShaderMetadata,
    /// Source text, present on attached shaders and used to derive cache keys.
    pub source: Option<String>,
    /// Debug label.
    pub label: Option<String>,
    /// Compile log.
    pub info_log: String,
    /// Driver program backing this stage.
    pub program: Option<GpuProgram>,
    /// Compiled instructions.
    pub ir: Option<InstructionTree>,
}

impl Shader {
    /// An empty shader shell of `stage` with the given object name.
    pub fn new(name: u32, stage: Stage) -> Self {
        Self {
            name,
            ref_count: 1,
            metadata: ShaderMetadata::new(stage),
            source: None,
            label: None,
            info_log: String::new(),
            program: None,
            ir: None,
        }
    }

    /// A shader with source text attached, as handed to the linker.
    pub fn with_source(name: u32, stage: Stage, source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::new(name, stage)
        }
    }

    /// Stage recorded in the metadata.
    pub fn stage(&self) -> Stage {
        self.metadata.stage
    }
}
