//! The linked shader program object graph that the cache persists.
//!
//! These types are what a compiler front end and linker produce and what the
//! cache codec walks: a [`ShaderProgram`] with its binding tables and uniform
//! storage, and up to one linked [`Shader`] per [`Stage`], each carrying an
//! [`InstructionTree`].

#![warn(missing_docs)]

pub mod glsl_type;
pub mod ir;
pub mod program;
pub mod shader;
pub mod stage;
pub mod uniform;

pub use glsl_type::{BaseType, GlslType};
pub use ir::{InstructionTree, VariableDecl, VariableMode};
pub use program::{
    FragDepthLayout, GeometryInfo, ProgramMetadata, ShaderProgram, UnsupportedFeature, VertexInfo,
};
pub use shader::{GpuProgram, Shader, ShaderMetadata, MAX_SAMPLERS};
pub use stage::{Stage, UnknownStage, STAGE_COUNT};
pub use uniform::{DriverStorage, UniformStorage};
