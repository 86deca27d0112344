//! Linked shader programs.

use shaderbin_wire::NameValueMap;

use crate::shader::Shader;
use crate::stage::{Stage, STAGE_COUNT};
use crate::uniform::UniformStorage;

/// Layout qualifier on `gl_FragDepth`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FragDepthLayout {
    /// No layout qualifier.
    #[default]
    None,
    /// `depth_any`
    Any,
    /// `depth_greater`
    Greater,
    /// `depth_less`
    Less,
    /// `depth_unchanged`
    Unchanged,
}

impl FragDepthLayout {
    /// Stable numeric tag.
    pub fn tag(self) -> u32 {
        match self {
            FragDepthLayout::None => 0,
            FragDepthLayout::Any => 1,
            FragDepthLayout::Greater => 2,
            FragDepthLayout::Less => 3,
            FragDepthLayout::Unchanged => 4,
        }
    }

    /// Inverse of [`tag`](Self::tag).
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(FragDepthLayout::None),
            1 => Some(FragDepthLayout::Any),
            2 => Some(FragDepthLayout::Greater),
            3 => Some(FragDepthLayout::Less),
            4 => Some(FragDepthLayout::Unchanged),
            _ => None,
        }
    }
}

/// Geometry stage layout recorded at link time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeometryInfo {
    /// `max_vertices`, or -1 if undeclared.
    pub vertices_out: i32,
    /// Input primitive enum.
    pub input_type: u32,
    /// Output primitive enum.
    pub output_type: u32,
    /// `invocations` count.
    pub invocations: i32,
    /// Whether `EndPrimitive()` is called.
    pub uses_end_primitive: bool,
}

/// Vertex stage facts recorded at link time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VertexInfo {
    /// Whether `gl_ClipDistance` is written.
    pub uses_clip_distance: bool,
    /// Declared size of `gl_ClipDistance`.
    pub clip_distance_array_size: u32,
}

/// Top-level plain data of a linked program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramMetadata {
    /// Shading language version shared by all stages.
    pub version: u32,
    /// Whether the program targets an ES profile.
    pub is_es: bool,
    /// Number of entries in the uniform storage table.
    pub num_user_uniform_storage: u32,
    /// Number of slots in the uniform remap table.
    pub num_uniform_remap_table: u32,
    /// Clip distance array size of the last vertex-processing stage.
    pub last_clip_distance_array_size: u32,
    /// Fragment depth layout.
    pub frag_depth_layout: FragDepthLayout,
    /// Geometry stage layout.
    pub geometry: GeometryInfo,
    /// Vertex stage facts.
    pub vertex: VertexInfo,
    /// Result of the last validation request. Not a link product.
    pub validate_status: bool,
}

impl ProgramMetadata {
    /// Copies the fields produced by linking from `linked`, leaving state
    /// that belongs to the live object (such as `validate_status`) alone.
    pub fn copy_link_results(&mut self, linked: &ProgramMetadata) {
        self.version = linked.version;
        self.is_es = linked.is_es;
        self.num_user_uniform_storage = linked.num_user_uniform_storage;
        self.num_uniform_remap_table = linked.num_uniform_remap_table;
        self.last_clip_distance_array_size = linked.last_clip_distance_array_size;
        self.frag_depth_layout = linked.frag_depth_layout;
        self.geometry = linked.geometry;
        self.vertex = linked.vertex;
    }
}

/// A program feature the cache format cannot represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UnsupportedFeature {
    /// A linked geometry stage is present.
    #[error("program has a geometry stage")]
    GeometryStage,
    /// The program uses uniform blocks.
    #[error("program uses {0} uniform block(s)")]
    UniformBlocks(u32),
    /// The program captures transform feedback varyings.
    #[error("program captures {0} transform feedback varying(s)")]
    TransformFeedback(usize),
}

/// A shader program: the attached shaders plus, once linked, everything the
/// linker produced.
#[derive(Debug, Clone, Default)]
pub struct ShaderProgram {
    /// API object name.
    pub name: u32,
    /// Attached shaders in attach order; their sources form the cache key.
    pub shaders: Vec<Shader>,
    /// Linked plain data.
    pub metadata: ProgramMetadata,
    /// Application-requested attribute locations.
    pub attribute_bindings: NameValueMap,
    /// Application-requested fragment output locations.
    pub frag_data_bindings: NameValueMap,
    /// Application-requested fragment output indices.
    pub frag_data_index_bindings: NameValueMap,
    /// Uniform name to uniform storage index.
    pub uniform_hash: NameValueMap,
    /// Active uniforms.
    pub uniform_storage: Vec<UniformStorage>,
    /// Remap slot to index into `uniform_storage`.
    pub uniform_remap_table: Vec<Option<usize>>,
    /// Linked shader per stage slot.
    pub linked_shaders: [Option<Shader>; STAGE_COUNT],
    /// Number of uniform blocks.
    pub num_uniform_blocks: u32,
    /// Transform feedback varyings requested by the application.
    pub transform_feedback_varyings: Vec<String>,
    /// Result of the last link.
    pub link_status: bool,
    /// Whether link state has been populated, by the linker or the cache.
    pub linked: bool,
    /// Link log.
    pub info_log: String,
}

impl ShaderProgram {
    /// An empty, unlinked program.
    pub fn new(name: u32) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    /// Attaches a shader for linking.
    pub fn attach(&mut self, shader: Shader) {
        self.shaders.push(shader);
    }

    /// The linked shader for `stage`, if any.
    pub fn linked_shader(&self, stage: Stage) -> Option<&Shader> {
        self.linked_shaders[stage.index()].as_ref()
    }

    /// Number of populated stage slots.
    pub fn linked_stage_count(&self) -> usize {
        self.linked_shaders.iter().flatten().count()
    }

    /// Appends an active uniform the way the linker assigns it: records its
    /// index in `uniform_hash`, points its remap slots at it, and updates the
    /// storage and remap counts.
    pub fn push_uniform(&mut self, uniform: UniformStorage) {
        let index = self.uniform_storage.len();
        let start = uniform.remap_location as usize;
        let end = start + uniform.remap_slots() as usize;
        if self.uniform_remap_table.len() < end {
            self.uniform_remap_table.resize(end, None);
        }
        for slot in &mut self.uniform_remap_table[start..end] {
            *slot = Some(index);
        }
        self.uniform_hash.insert(uniform.name.clone(), index as u32);
        self.uniform_storage.push(uniform);
        self.metadata.num_user_uniform_storage = self.uniform_storage.len() as u32;
        self.metadata.num_uniform_remap_table = self.uniform_remap_table.len() as u32;
    }

    /// The uniform owning remap slot `location`.
    pub fn uniform_at(&self, location: u32) -> Option<&UniformStorage> {
        let index = (*self.uniform_remap_table.get(location as usize)?)?;
        self.uniform_storage.get(index)
    }

    /// Returns the first feature that prevents this program from being
    /// cached, or `None` if it is cacheable.
    pub fn unsupported_feature(&self) -> Option<UnsupportedFeature> {
        if self.linked_shader(Stage::Geometry).is_some() {
            return Some(UnsupportedFeature::GeometryStage);
        }
        if self.num_uniform_blocks > 0 {
            return Some(UnsupportedFeature::UniformBlocks(self.num_uniform_blocks));
        }
        if !self.transform_feedback_varyings.is_empty() {
            return Some(UnsupportedFeature::TransformFeedback(
                self.transform_feedback_varyings.len(),
            ));
        }
        None
    }

    /// Drops everything a link produced so the program can be linked from
    /// scratch. Attached shaders and application bindings are kept.
    pub fn clear_link_state(&mut self) {
        self.uniform_hash.clear();
        self.uniform_storage.clear();
        self.uniform_remap_table.clear();
        self.linked_shaders = Default::default();
        self.metadata.num_user_uniform_storage = 0;
        self.metadata.num_uniform_remap_table = 0;
        self.link_status = false;
        self.linked = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glsl_type::{BaseType, GlslType};

    #[test]
    fn push_uniform_assigns_remap_slots() {
        let mut prog = ShaderProgram::new(1);
        prog.push_uniform(UniformStorage::new("mvp", GlslType::matrix(4, 4), 0));
        prog.push_uniform(UniformStorage::new(
            "lights",
            GlslType::vector(BaseType::Float, 3).array_of(3),
            1,
        ));

        assert_eq!(prog.metadata.num_user_uniform_storage, 2);
        assert_eq!(prog.metadata.num_uniform_remap_table, 4);
        assert_eq!(prog.uniform_remap_table, vec![Some(0), Some(1), Some(1), Some(1)]);
        assert_eq!(prog.uniform_hash["lights"], 1);
        assert_eq!(prog.uniform_at(3).unwrap().name, "lights");
        assert!(prog.uniform_at(4).is_none());
    }

    #[test]
    fn unsupported_features_in_priority_order() {
        let mut prog = ShaderProgram::new(1);
        assert_eq!(prog.unsupported_feature(), None);

        prog.transform_feedback_varyings.push("outPos".to_string());
        assert_eq!(
            prog.unsupported_feature(),
            Some(UnsupportedFeature::TransformFeedback(1))
        );

        prog.num_uniform_blocks = 2;
        assert_eq!(
            prog.unsupported_feature(),
            Some(UnsupportedFeature::UniformBlocks(2))
        );

        prog.linked_shaders[Stage::Geometry.index()] = Some(Shader::new(5, Stage::Geometry));
        assert_eq!(prog.unsupported_feature(), Some(UnsupportedFeature::GeometryStage));
    }

    #[test]
    fn copy_link_results_keeps_validate_status() {
        let mut live = ProgramMetadata {
            validate_status: true,
            ..ProgramMetadata::default()
        };
        let linked = ProgramMetadata {
            version: 300,
            is_es: true,
            frag_depth_layout: FragDepthLayout::Less,
            ..ProgramMetadata::default()
        };
        live.copy_link_results(&linked);
        assert_eq!(live.version, 300);
        assert!(live.is_es);
        assert_eq!(live.frag_depth_layout, FragDepthLayout::Less);
        assert!(live.validate_status);
    }

    #[test]
    fn clear_link_state_keeps_attachments_and_bindings() {
        let mut prog = ShaderProgram::new(1);
        prog.attach(Shader::with_source(2, Stage::Vertex, "void main(){}"));
        prog.attribute_bindings.insert("pos".to_string(), 0);
        prog.push_uniform(UniformStorage::new("t", GlslType::scalar(BaseType::Float), 0));
        prog.linked_shaders[0] = Some(Shader::new(3, Stage::Vertex));
        prog.link_status = true;
        prog.linked = true;

        prog.clear_link_state();
        assert_eq!(prog.shaders.len(), 1);
        assert_eq!(prog.attribute_bindings.len(), 1);
        assert!(prog.uniform_storage.is_empty());
        assert_eq!(prog.linked_stage_count(), 0);
        assert!(!prog.link_status);
        assert!(!prog.linked);
    }

    #[test]
    fn frag_depth_tags_roundtrip() {
        for layout in [
            FragDepthLayout::None,
            FragDepthLayout::Any,
            FragDepthLayout::Greater,
            FragDepthLayout::Less,
            FragDepthLayout::Unchanged,
        ] {
            assert_eq!(FragDepthLayout::from_tag(layout.tag()), Some(layout));
        }
        assert_eq!(FragDepthLayout::from_tag(5), None);
    }
}
