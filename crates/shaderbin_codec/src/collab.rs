//! Interfaces to the collaborators the codec does not implement itself.
//!
//! The driver owns native shader and program objects and knows which GPU is
//! active; the IR codec owns the instruction-tree encoding; the linker owns
//! uniform initialization. All three are passed in explicitly through a
//! [`CodecContext`](crate::CodecContext).

use shaderbin_program::{GpuProgram, Shader, ShaderProgram, Stage};
use shaderbin_wire::{ByteCursor, ByteSink, WireError};

/// API profile of the running context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Api {
    /// Desktop OpenGL.
    Desktop,
    /// OpenGL ES.
    Es,
}

/// The graphics driver back end.
pub trait Driver {
    /// Creates an empty shader object of `stage`, or `None` if the driver
    /// cannot allocate one.
    fn new_shader(&self, stage: Stage) -> Option<Shader>;

    /// Creates an empty driver program for `stage`, owned by shader `shader_name`.
    fn new_program(&self, stage: Stage, shader_name: u32) -> Option<GpuProgram>;

    /// Releases a shader that was created by [`new_shader`](Self::new_shader)
    /// but never handed out.
    fn delete_shader(&self, shader: Shader) {
        drop(shader);
    }

    /// Vendor string of the active device.
    fn vendor(&self) -> &str;

    /// Renderer string of the active device.
    fn renderer(&self) -> &str;

    /// Profile of the running context.
    fn api(&self) -> Api;

    /// Builds or copies any stage-specific native program data for a stage
    /// that has just been restored from the cache.
    fn materialize_stage(&self, stage: Stage, program: &mut ShaderProgram, shader: &mut Shader);
}

/// Errors raised by an [`IrCodec`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    /// The underlying read or write failed.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// The payload decoded but does not describe a valid tree.
    #[error("malformed instruction tree: {0}")]
    Malformed(String),
}

/// Encoder and decoder for a shader's instruction tree.
pub trait IrCodec {
    /// Version of the tree encoding. Part of the blob fingerprint, so bumping
    /// it invalidates every cached program.
    fn format_version(&self) -> u32;

    /// Appends `shader`'s instruction tree to `sink`.
    fn write_tree(&self, shader: &Shader, sink: &mut ByteSink) -> Result<(), IrError>;

    /// Reads an instruction tree from `cursor` into `shader`.
    fn read_tree(&self, shader: &mut Shader, cursor: &mut ByteCursor<'_>) -> Result<(), IrError>;
}

/// The linker back end.
pub trait Linker {
    /// Writes declared initial values into the program's uniform storage.
    fn apply_uniform_initializers(&self, program: &mut ShaderProgram);
}
