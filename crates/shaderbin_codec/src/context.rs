//! The bundle of collaborators every codec operation runs against.

use crate::collab::{Driver, IrCodec, Linker};

/// Build identifier written into every blob. Blobs from another build are
/// rejected as version-class failures.
pub const CACHE_MAGIC: &str = concat!("shaderbin-", env!("CARGO_PKG_VERSION"));

/// Collaborators and build identity for one serialize or deserialize call.
#[derive(Clone, Copy)]
pub struct CodecContext<'a> {
    /// Driver back end.
    pub driver: &'a dyn Driver,
    /// Instruction-tree codec.
    pub ir: &'a dyn IrCodec,
    /// Linker back end.
    pub linker: &'a dyn Linker,
    /// Build magic, normally [`CACHE_MAGIC`].
    pub magic: &'a str,
}

impl<'a> CodecContext<'a> {
    /// A context using this build's magic.
    pub fn new(driver: &'a dyn Driver, ir: &'a dyn IrCodec, linker: &'a dyn Linker) -> Self {
        Self {
            driver,
            ir,
            linker,
            magic: CACHE_MAGIC,
        }
    }

    /// Overrides the build magic.
    pub fn with_magic(self, magic: &'a str) -> Self {
        Self { magic, ..self }
    }
}
