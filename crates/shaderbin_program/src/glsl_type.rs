//! Semantic types of shader variables.

use std::fmt;

/// Scalar base of a GLSL type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// 32-bit float.
    Float,
    /// 32-bit signed integer.
    Int,
    /// 32-bit unsigned integer.
    Uint,
    /// Boolean.
    Bool,
    /// Opaque sampler handle.
    Sampler,
}

impl BaseType {
    /// Stable numeric tag used by instruction-tree encodings.
    pub fn tag(self) -> u32 {
        match self {
            BaseType::Float => 0,
            BaseType::Int => 1,
            BaseType::Uint => 2,
            BaseType::Bool => 3,
            BaseType::Sampler => 4,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(BaseType::Float),
            1 => Some(BaseType::Int),
            2 => Some(BaseType::Uint),
            3 => Some(BaseType::Bool),
            4 => Some(BaseType::Sampler),
            _ => None,
        }
    }
}

/// A scalar, vector, matrix or sampler type, optionally arrayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GlslType {
    /// Scalar base type.
    pub base: BaseType,
    /// Rows: 1 for scalars, 2..=4 for vectors and matrices.
    pub vector_elements: u8,
    /// Columns: 1 unless this is a matrix.
    pub matrix_columns: u8,
    /// Array length if this is an array type.
    pub array_len: Option<u32>,
}

impl GlslType {
    /// A scalar of the given base type.
    pub fn scalar(base: BaseType) -> Self {
        Self::vector(base, 1)
    }

    /// A vector with `n` components.
    pub fn vector(base: BaseType, n: u8) -> Self {
        Self {
            base,
            vector_elements: n,
            matrix_columns: 1,
            array_len: None,
        }
    }

    /// A float matrix with `columns` columns of `rows` rows.
    pub fn matrix(columns: u8, rows: u8) -> Self {
        Self {
            base: BaseType::Float,
            vector_elements: rows,
            matrix_columns: columns,
            array_len: None,
        }
    }

    /// A sampler.
    pub fn sampler() -> Self {
        Self::scalar(BaseType::Sampler)
    }

    /// This type as the element of an array of `len` elements.
    pub fn array_of(self, len: u32) -> Self {
        Self {
            array_len: Some(len),
            ..self
        }
    }

    /// Whether this is an array type.
    pub fn is_array(&self) -> bool {
        self.array_len.is_some()
    }

    /// The element type of an array, or the type itself.
    pub fn element_type(&self) -> Self {
        Self {
            array_len: None,
            ..*self
        }
    }

    /// Number of scalar components in one element of this type.
    pub fn components(&self) -> u32 {
        u32::from(self.vector_elements) * u32::from(self.matrix_columns)
    }
}

impl fmt::Display for GlslType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.base {
            BaseType::Float => "",
            BaseType::Int => "i",
            BaseType::Uint => "u",
            BaseType::Bool => "b",
            BaseType::Sampler => "",
        };
        match (self.base, self.vector_elements, self.matrix_columns) {
            (BaseType::Sampler, _, _) => f.write_str("sampler")?,
            (BaseType::Float, 1, 1) => f.write_str("float")?,
            (BaseType::Int, 1, 1) => f.write_str("int")?,
            (BaseType::Uint, 1, 1) => f.write_str("uint")?,
            (BaseType::Bool, 1, 1) => f.write_str("bool")?,
            (_, rows, 1) => write!(f, "{prefix}vec{rows}")?,
            (_, rows, cols) if rows == cols => write!(f, "mat{cols}")?,
            (_, rows, cols) => write!(f, "mat{cols}x{rows}")?,
        }
        if let Some(len) = self.array_len {
            write!(f, "[{len}]")?;
        }
        Ok(())
    }
}
