//! A [`Driver`] with no GPU behind it.
//!
//! Hands out sequential object names and reports fixed vendor and renderer
//! strings. Used by the command-line tool to verify blobs offline, and by
//! tests.

use std::cell::Cell;

use shaderbin_program::{GpuProgram, Shader, ShaderProgram, Stage};

use crate::collab::{Api, Driver};

/// Driver back end that keeps everything in memory.
#[derive(Debug)]
pub struct HeadlessDriver {
    vendor: String,
    renderer: String,
    api: Api,
    next_name: Cell<u32>,
}

impl HeadlessDriver {
    /// A desktop-profile driver reporting `vendor` and `renderer`.
    pub fn new(vendor: impl Into<String>, renderer: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
            renderer: renderer.into(),
            api: Api::Desktop,
            next_name: Cell::new(1),
        }
    }

    /// Switches the reported profile.
    pub fn with_api(mut self, api: Api) -> Self {
        self.api = api;
        self
    }

    /// Number of object names handed out so far.
    pub fn names_issued(&self) -> u32 {
        self.next_name.get() - 1
    }

    fn allocate_name(&self) -> u32 {
        let name = self.next_name.get();
        self.next_name.set(name + 1);
        name
    }
}

impl Driver for HeadlessDriver {
    fn new_shader(&self, stage: Stage) -> Option<Shader> {
        Some(Shader::new(self.allocate_name(), stage))
    }

    fn new_program(&self, stage: Stage, _shader_name: u32) -> Option<GpuProgram> {
        Some(GpuProgram {
            stage,
            id: self.allocate_name(),
        })
    }

    fn vendor(&self) -> &str {
        &self.vendor
    }

    fn renderer(&self) -> &str {
        &self.renderer
    }

    fn api(&self) -> Api {
        self.api
    }

    fn materialize_stage(&self, stage: Stage, _program: &mut ShaderProgram, shader: &mut Shader) {
        if shader.program.is_none() {
            shader.program = self.new_program(stage, shader.name);
        }
    }
}
