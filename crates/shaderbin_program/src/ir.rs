//! The compiled instruction tree attached to a linked shader.
//!
//! The cache treats the tree as opaque apart from its top-level variable
//! declarations, which are searched to re-derive uniform types after a load.

use crate::glsl_type::GlslType;

/// Storage qualifier of a declared variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableMode {
    /// `uniform`
    Uniform,
    /// Stage input.
    In,
    /// Stage output.
    Out,
    /// Global temporary.
    Temporary,
}

impl VariableMode {
    /// Stable numeric tag used by instruction-tree encodings.
    pub fn tag(self) -> u32 {
        match self {
            VariableMode::Uniform => 0,
            VariableMode::In => 1,
            VariableMode::Out => 2,
            VariableMode::Temporary => 3,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(VariableMode::Uniform),
            1 => Some(VariableMode::In),
            2 => Some(VariableMode::Out),
            3 => Some(VariableMode::Temporary),
            _ => None,
        }
    }
}

/// A top-level variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    /// Variable name as written in the source.
    pub name: String,
    /// Declared type, including array-ness.
    pub ty: GlslType,
    /// Storage qualifier.
    pub mode: VariableMode,
    /// Constant initializer as raw 32-bit component values, if any.
    pub initializer: Option<Vec<u32>>,
}

impl VariableDecl {
    /// A declaration without an initializer.
    pub fn new(name: impl Into<String>, ty: GlslType, mode: VariableMode) -> Self {
        Self {
            name: name.into(),
            ty,
            mode,
            initializer: None,
        }
    }

    /// Attaches a constant initializer.
    pub fn with_initializer(mut self, values: Vec<u32>) -> Self {
        self.initializer = Some(values);
        self
    }
}

/// A shader's compiled instructions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstructionTree {
    /// Top-level declarations in declaration order.
    pub variables: Vec<VariableDecl>,
    /// Function bodies and everything else, in the backend's own encoding.
    pub body: Vec<u8>,
}

impl InstructionTree {
    /// Finds the first top-level declaration named `name`.
    pub fn find_variable(&self, name: &str) -> Option<&VariableDecl> {
        self.variables.iter().find(|var| var.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glsl_type::BaseType;

    #[test]
    fn find_variable_by_name() {
        let tree = InstructionTree {
            variables: vec![
                VariableDecl::new("pos", GlslType::vector(BaseType::Float, 4), VariableMode::In),
                VariableDecl::new("mvp", GlslType::matrix(4, 4), VariableMode::Uniform),
            ],
            body: Vec::new(),
        };
        assert_eq!(tree.find_variable("mvp").unwrap().ty, GlslType::matrix(4, 4));
        assert!(tree.find_variable("missing").is_none());
    }

    #[test]
    fn mode_tags_roundtrip() {
        for mode in [
            VariableMode::Uniform,
            VariableMode::In,
            VariableMode::Out,
            VariableMode::Temporary,
        ] {
            assert_eq!(VariableMode::from_tag(mode.tag()), Some(mode));
        }
        assert_eq!(VariableMode::from_tag(4), None);
    }
}
