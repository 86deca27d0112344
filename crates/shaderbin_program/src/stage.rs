//! Pipeline stages.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of per-stage slots in a linked program.
pub const STAGE_COUNT: usize = 3;

/// One shader stage of a linked program.
///
/// A stage has two stable encodings: its slot index in the program's
/// per-stage table, and the API type tag used when a shader object is
/// created (`GL_VERTEX_SHADER` and friends).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Vertex stage, slot 0.
    Vertex,
    /// Geometry stage, slot 1.
    Geometry,
    /// Fragment stage, slot 2.
    Fragment,
}

const GL_FRAGMENT_SHADER: u32 = 0x8B30;
const GL_VERTEX_SHADER: u32 = 0x8B31;
const GL_GEOMETRY_SHADER: u32 = 0x8DD9;

impl Stage {
    /// All stages in slot order. Serialization walks stages in this order.
    pub const ALL: [Stage; STAGE_COUNT] = [Stage::Vertex, Stage::Geometry, Stage::Fragment];

    /// Slot index in the program's per-stage table.
    pub fn index(self) -> usize {
        match self {
            Stage::Vertex => 0,
            Stage::Geometry => 1,
            Stage::Fragment => 2,
        }
    }

    /// Looks up a stage by slot index.
    pub fn from_index(index: u32) -> Result<Self, UnknownStage> {
        Self::ALL
            .get(index as usize)
            .copied()
            .ok_or(UnknownStage::Index(index))
    }

    /// The API shader type tag for this stage.
    pub fn type_tag(self) -> u32 {
        match self {
            Stage::Vertex => GL_VERTEX_SHADER,
            Stage::Geometry => GL_GEOMETRY_SHADER,
            Stage::Fragment => GL_FRAGMENT_SHADER,
        }
    }

    /// Looks up a stage by API shader type tag.
    pub fn from_type_tag(tag: u32) -> Result<Self, UnknownStage> {
        match tag {
            GL_VERTEX_SHADER => Ok(Stage::Vertex),
            GL_GEOMETRY_SHADER => Ok(Stage::Geometry),
            GL_FRAGMENT_SHADER => Ok(Stage::Fragment),
            other => Err(UnknownStage::Tag(other)),
        }
    }

    /// Lowercase stage name.
    pub fn name(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Geometry => "geometry",
            Stage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stage index or type tag that does not name a supported stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnknownStage {
    /// Slot index out of range.
    #[error("unknown stage index {0}")]
    Index(u32),
    /// Unrecognized API shader type tag.
    #[error("unknown stage type tag {0:#x}")]
    Tag(u32),
}
