//! A [`Linker`] that applies constant uniform initializers.

use shaderbin_program::{ShaderProgram, VariableMode};

use crate::collab::Linker;

/// Copies each uniform declaration's constant initializer into the matching
/// uniform's storage and marks it initialized.
///
/// Stages are visited in slot order, so a later stage's initializer wins if
/// two stages disagree. Values beyond the uniform's storage are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstantInitializers;

impl Linker for ConstantInitializers {
    fn apply_uniform_initializers(&self, program: &mut ShaderProgram) {
        for shader in program.linked_shaders.iter().flatten() {
            let Some(tree) = &shader.ir else {
                continue;
            };
            for decl in &tree.variables {
                if decl.mode != VariableMode::Uniform {
                    continue;
                }
                let Some(values) = &decl.initializer else {
                    continue;
                };
                let Some(&index) = program.uniform_hash.get(&decl.name) else {
                    continue;
                };
                let Some(uniform) = program.uniform_storage.get_mut(index as usize) else {
                    continue;
                };

                let n = values.len().min(uniform.storage.len());
                uniform.storage[..n].copy_from_slice(&values[..n]);
                uniform.initialized = true;
            }
        }
    }
}
