//! Graphics device contract for shader programs
#![allow(unsafe_code)]

use std::fmt;

use glow::HasContext;

use super::ShaderStage;
use crate::surface::GlContext;

/// Typed value written to a uniform
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// `int`
    Int1(i32),
    /// `ivec2`
    Int2(i32, i32),
    /// `ivec3`
    Int3(i32, i32, i32),
    /// `ivec4`
    Int4(i32, i32, i32, i32),
    /// `float`
    Float1(f32),
    /// `vec2`
    Float2(f32, f32),
    /// `vec3`
    Float3(f32, f32, f32),
    /// `vec4`
    Float4(f32, f32, f32, f32),
}

/// Shader compilation and uniform access on the current context
///
/// Handles are plain values. Whoever receives one from `compile_stage` or
/// `link_program` is responsible for deleting it.
pub trait ShaderDevice {
    /// Compiled stage object
    type Stage: Copy + fmt::Debug;
    /// Linked program object
    type Program: Copy + fmt::Debug;
    /// Resolved uniform location
    type UniformLocation: Clone + fmt::Debug;

    /// Whether the context still exists
    ///
    /// Once this returns `false` no other method may be called.
    fn is_live(&self) -> bool {
        true
    }

    /// Compile one stage, returning the compiler log on failure
    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<Self::Stage, String>;

    /// Release a stage object
    fn delete_stage(&self, stage: Self::Stage);

    /// Link two compiled stages, returning the linker log on failure
    ///
    /// On failure no program object is left behind.
    fn link_program(&self, vertex: Self::Stage, fragment: Self::Stage) -> Result<Self::Program, String>;

    /// Release a program object
    fn delete_program(&self, program: Self::Program);

    /// Bind a program for subsequent draws, or unbind with `None`
    fn use_program(&self, program: Option<Self::Program>);

    /// Resolve a uniform by name, `None` if the program has no such uniform
    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation>;

    /// Write a uniform of the bound program; `None` is ignored
    fn set_uniform(&self, location: Option<&Self::UniformLocation>, value: UniformValue);
}

impl ShaderDevice for GlContext {
    type Stage = <glow::Context as HasContext>::Shader;
    type Program = <glow::Context as HasContext>::Program;
    type UniformLocation = <glow::Context as HasContext>::UniformLocation;

    fn is_live(&self) -> bool {
        GlContext::is_live(self)
    }

    fn compile_stage(&self, stage: ShaderStage, source: &str) -> Result<Self::Stage, String> {
        let kind = match stage {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
        };

        let gl: &glow::Context = self;
        unsafe {
            let shader = gl.create_shader(kind)?;
            gl.shader_source(shader, source);
            gl.compile_shader(shader);

            if gl.get_shader_compile_status(shader) {
                Ok(shader)
            } else {
                let log = gl.get_shader_info_log(shader);
                gl.delete_shader(shader);
                Err(log)
            }
        }
    }

    fn delete_stage(&self, stage: Self::Stage) {
        unsafe { self.delete_shader(stage) };
    }

    fn link_program(&self, vertex: Self::Stage, fragment: Self::Stage) -> Result<Self::Program, String> {
        let gl: &glow::Context = self;
        unsafe {
            let program = gl.create_program()?;
            gl.attach_shader(program, vertex);
            gl.attach_shader(program, fragment);
            gl.link_program(program);

            let linked = gl.get_program_link_status(program);
            gl.detach_shader(program, vertex);
            gl.detach_shader(program, fragment);

            if linked {
                Ok(program)
            } else {
                let log = gl.get_program_info_log(program);
                gl.delete_program(program);
                Err(log)
            }
        }
    }

    fn delete_program(&self, program: Self::Program) {
        unsafe { HasContext::delete_program(&**self, program) };
    }

    fn use_program(&self, program: Option<Self::Program>) {
        unsafe { HasContext::use_program(&**self, program) };
    }

    fn uniform_location(&self, program: Self::Program, name: &str) -> Option<Self::UniformLocation> {
        unsafe { self.get_uniform_location(program, name) }
    }

    fn set_uniform(&self, location: Option<&Self::UniformLocation>, value: UniformValue) {
        let gl: &glow::Context = self;
        unsafe {
            match value {
                UniformValue::Int1(x) => gl.uniform_1_i32(location, x),
                UniformValue::Int2(x, y) => gl.uniform_2_i32(location, x, y),
                UniformValue::Int3(x, y, z) => gl.uniform_3_i32(location, x, y, z),
                UniformValue::Int4(x, y, z, w) => gl.uniform_4_i32(location, x, y, z, w),
                UniformValue::Float1(x) => gl.uniform_1_f32(location, x),
                UniformValue::Float2(x, y) => gl.uniform_2_f32(location, x, y),
                UniformValue::Float3(x, y, z) => gl.uniform_3_f32(location, x, y, z),
                UniformValue::Float4(x, y, z, w) => gl.uniform_4_f32(location, x, y, z, w),
            }
        }
    }
}
