//! Uniform storage records.

use crate::glsl_type::GlslType;

/// Driver-specific view of where a uniform's values live in constant memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriverStorage {
    /// Distance in bytes between array elements.
    pub element_stride: u32,
    /// Components written per element.
    pub vector_elements: u32,
    /// Byte offset of the first element.
    pub offset: u32,
}

/// One active uniform of a linked program.
///
/// `ty`, `storage` contents, and `driver_storage` are link-time products that
/// the cache does not persist: the type is re-derived from the shaders'
/// declarations, storage is zero-filled and re-initialized by the linker, and
/// driver storage is rebuilt by the driver.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformStorage {
    /// Uniform name; array uniforms use the base name.
    pub name: String,
    /// Resolved element type.
    pub ty: Option<GlslType>,
    /// Array length, or 0 for a non-array uniform.
    pub array_elements: u32,
    /// First slot in the program's remap table.
    pub remap_location: u32,
    /// Sampler slot, meaningful when `sampler_active` is set.
    pub sampler_index: u32,
    /// Whether this uniform is a sampler.
    pub sampler_active: bool,
    /// Whether an initializer has been applied.
    pub initialized: bool,
    /// Row-major layout (uniform blocks only).
    pub row_major: bool,
    /// Uniform block index, or -1 for the default block.
    pub block_index: i32,
    /// Offset inside the block, or -1.
    pub offset: i32,
    /// Array stride inside the block, or -1.
    pub array_stride: i32,
    /// Matrix stride inside the block, or -1.
    pub matrix_stride: i32,
    /// Current values as raw 32-bit components.
    pub storage: Vec<u32>,
    /// Driver-side storage descriptors.
    pub driver_storage: Vec<DriverStorage>,
}

impl UniformStorage {
    /// A default-block uniform of type `ty` starting at `remap_location`.
    ///
    /// Array types are stored with their element type and length, the way
    /// the linker records them.
    pub fn new(name: impl Into<String>, ty: GlslType, remap_location: u32) -> Self {
        let mut uniform = Self {
            name: name.into(),
            ty: Some(ty.element_type()),
            array_elements: ty.array_len.unwrap_or(0),
            remap_location,
            sampler_index: 0,
            sampler_active: false,
            initialized: false,
            row_major: false,
            block_index: -1,
            offset: -1,
            array_stride: -1,
            matrix_stride: -1,
            storage: Vec::new(),
            driver_storage: Vec::new(),
        };
        uniform.storage = vec![0; uniform.storage_elements() as usize];
        uniform
    }

    /// Number of remap table slots this uniform occupies.
    pub fn remap_slots(&self) -> u32 {
        self.array_elements.max(1)
    }

    /// Number of 32-bit storage components needed for all elements.
    pub fn storage_elements(&self) -> u32 {
        let components = self.ty.map_or(1, |ty| ty.components()).max(1);
        self.remap_slots().saturating_mul(components)
    }
}
