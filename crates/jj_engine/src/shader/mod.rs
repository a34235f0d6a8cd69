//! Shader programs built from a vertex and a fragment GLSL file
//!
//! A [`ShaderProgram`] owns at most one linked program. Loading reads both
//! files, compiles each stage and links them. Any failure leaves the
//! previously linked program in place, so a broken edit during development
//! keeps the last working shader on screen. Uniform locations are cached by
//! name and the cache is dropped whenever a new program is linked.
//!
//! Programs act on the context that is current when they are used. A program
//! that outlives its window stops issuing GL calls, and its program object
//! goes away with the destroyed context.

mod config;
mod device;

use std::collections::HashMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use thiserror::Error;

pub use config::ShaderConfig;
pub use device::{ShaderDevice, UniformValue};

use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::surface::GlContext;

/// Pipeline stage of a shader source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Shader loading errors
#[derive(Error, Debug)]
pub enum ShaderError {
    /// A source file is missing, unreadable or empty
    #[error("Failed to load {stage} shader source {}: {source}", path.display())]
    SourceLoad {
        /// Stage the file was meant for
        stage: ShaderStage,
        /// Path that was read
        path: PathBuf,
        /// Underlying cause
        #[source]
        source: io::Error,
    },

    /// A stage failed to compile
    #[error("Failed to compile {stage} shader: {log}")]
    Compile {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler log
        log: String,
    },

    /// The stages failed to link
    #[error("Shader program linking failed: {log}")]
    Link {
        /// Linker log
        log: String,
    },

    /// The window owning the graphics context was destroyed
    #[error("Graphics context is gone")]
    ContextLost,
}

/// Result alias for shader operations
pub type ShaderResult<T> = Result<T, ShaderError>;

/// Compiled stage that is released when it goes out of scope
struct StageGuard<'a, D: ShaderDevice> {
    device: &'a D,
    stage: D::Stage,
}

impl<D: ShaderDevice> Drop for StageGuard<'_, D> {
    fn drop(&mut self) {
        self.device.delete_stage(self.stage);
    }
}

fn read_source(stage: ShaderStage, path: &Path) -> ShaderResult<String> {
    let source_load = |source| ShaderError::SourceLoad {
        stage,
        path: path.to_path_buf(),
        source,
    };

    let bytes = std::fs::read(path).map_err(source_load)?;
    if bytes.is_empty() {
        return Err(source_load(io::Error::new(io::ErrorKind::InvalidData, "file is empty")));
    }
    // Stray bytes in comments are left for the GLSL compiler to judge
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn compile<'a, D: ShaderDevice>(device: &'a D, stage: ShaderStage, source: &str) -> ShaderResult<StageGuard<'a, D>> {
    device
        .compile_stage(stage, source)
        .map(|compiled| StageGuard { device, stage: compiled })
        .map_err(|log| ShaderError::Compile {
            stage,
            log: log.trim_end().to_string(),
        })
}

/// Linked vertex + fragment program with a uniform location cache
pub struct ShaderProgram<D: ShaderDevice = GlContext> {
    device: Rc<D>,
    vertex_path: PathBuf,
    fragment_path: PathBuf,
    program: Option<D::Program>,
    uniform_cache: HashMap<String, Option<D::UniformLocation>>,
}

impl<D: ShaderDevice> ShaderProgram<D> {
    /// Create a program and load it from the two source files
    ///
    /// Load failures are logged and leave the program not ready; check
    /// [`ShaderProgram::is_ready`] or call [`ShaderProgram::load`] again.
    pub fn new(device: Rc<D>, vertex_path: impl Into<PathBuf>, fragment_path: impl Into<PathBuf>) -> Self {
        let mut program = Self {
            device,
            vertex_path: vertex_path.into(),
            fragment_path: fragment_path.into(),
            program: None,
            uniform_cache: HashMap::new(),
        };
        // Failures are already logged by `load`
        let _ = program.load();
        program
    }

    /// Create a program from a [`ShaderConfig`]
    pub fn from_config(device: Rc<D>, config: &ShaderConfig) -> Self {
        Self::new(device, &config.vertex_shader_path, &config.fragment_shader_path)
    }

    /// Rebuild the program from the current source paths
    ///
    /// On success the previous program is released and the uniform cache is
    /// cleared. On failure the previous program, if any, stays in use.
    pub fn load(&mut self) -> ShaderResult<()> {
        match self.build() {
            Ok(program) => {
                if let Some(previous) = self.program.replace(program) {
                    self.device.delete_program(previous);
                }
                self.uniform_cache.clear();
                log::info!(
                    "Shader loaded: {} + {}",
                    self.vertex_path.display(),
                    self.fragment_path.display()
                );
                Ok(())
            }
            Err(err) => {
                log::error!("{err}");
                Err(err)
            }
        }
    }

    /// Point the program at new source files and rebuild it
    ///
    /// The new paths are kept even when loading fails, so a later
    /// [`ShaderProgram::load`] retries them.
    pub fn load_from(&mut self, vertex_path: impl Into<PathBuf>, fragment_path: impl Into<PathBuf>) -> ShaderResult<()> {
        self.vertex_path = vertex_path.into();
        self.fragment_path = fragment_path.into();
        self.load()
    }

    fn build(&self) -> ShaderResult<D::Program> {
        if !self.device.is_live() {
            return Err(ShaderError::ContextLost);
        }

        let vertex_source = read_source(ShaderStage::Vertex, &self.vertex_path)?;
        let fragment_source = read_source(ShaderStage::Fragment, &self.fragment_path)?;

        let device = self.device.as_ref();
        let vertex = compile(device, ShaderStage::Vertex, &vertex_source)?;
        let fragment = compile(device, ShaderStage::Fragment, &fragment_source)?;

        device
            .link_program(vertex.stage, fragment.stage)
            .map_err(|log| ShaderError::Link {
                log: log.trim_end().to_string(),
            })
    }

    /// Whether a linked program is available
    pub fn is_ready(&self) -> bool {
        self.live_program().is_some()
    }

    fn live_program(&self) -> Option<D::Program> {
        self.program.filter(|_| self.device.is_live())
    }

    /// Bind this program for subsequent draws
    ///
    /// A program that never loaded unbinds whatever was bound.
    pub fn use_program(&self) {
        if self.device.is_live() {
            self.device.use_program(self.program);
        }
    }

    /// Resolve a uniform location, caching the answer
    ///
    /// Names the program does not declare (or that the compiler optimized
    /// away) resolve to `None`. The first such lookup logs a warning; later
    /// ones are answered from the cache.
    pub fn uniform_location(&mut self, name: &str) -> Option<D::UniformLocation> {
        let Some(program) = self.live_program() else {
            log::debug!("uniform '{name}' requested from a shader that is not loaded");
            return None;
        };

        if let Some(cached) = self.uniform_cache.get(name) {
            return cached.clone();
        }

        let location = self.device.uniform_location(program, name);
        if location.is_none() {
            log::warn!(
                "uniform '{name}' doesn't exist in {} + {}",
                self.vertex_path.display(),
                self.fragment_path.display()
            );
        }
        self.uniform_cache.insert(name.to_string(), location.clone());
        location
    }

    /// Write a uniform of this program, which must be bound
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        let location = self.uniform_location(name);
        if self.device.is_live() {
            self.device.set_uniform(location.as_ref(), value);
        }
    }

    /// Set an `int` uniform
    pub fn set_uniform_1i(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int1(value));
    }

    /// Set an `ivec2` uniform
    pub fn set_uniform_2i(&mut self, name: &str, x: i32, y: i32) {
        self.set_uniform(name, UniformValue::Int2(x, y));
    }

    /// Set an `ivec3` uniform
    pub fn set_uniform_3i(&mut self, name: &str, x: i32, y: i32, z: i32) {
        self.set_uniform(name, UniformValue::Int3(x, y, z));
    }

    /// Set an `ivec4` uniform
    pub fn set_uniform_4i(&mut self, name: &str, x: i32, y: i32, z: i32, w: i32) {
        self.set_uniform(name, UniformValue::Int4(x, y, z, w));
    }

    /// Set a `float` uniform
    pub fn set_uniform_1f(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float1(value));
    }

    /// Set a `vec2` uniform from components
    pub fn set_uniform_2f(&mut self, name: &str, x: f32, y: f32) {
        self.set_uniform(name, UniformValue::Float2(x, y));
    }

    /// Set a `vec3` uniform from components
    pub fn set_uniform_3f(&mut self, name: &str, x: f32, y: f32, z: f32) {
        self.set_uniform(name, UniformValue::Float3(x, y, z));
    }

    /// Set a `vec4` uniform from components
    pub fn set_uniform_4f(&mut self, name: &str, x: f32, y: f32, z: f32, w: f32) {
        self.set_uniform(name, UniformValue::Float4(x, y, z, w));
    }

    /// Set a `vec2` uniform
    pub fn set_uniform_vec2(&mut self, name: &str, value: &Vec2) {
        self.set_uniform_2f(name, value.x, value.y);
    }

    /// Set a `vec3` uniform
    pub fn set_uniform_vec3(&mut self, name: &str, value: &Vec3) {
        self.set_uniform_3f(name, value.x, value.y, value.z);
    }

    /// Set a `vec4` uniform
    pub fn set_uniform_vec4(&mut self, name: &str, value: &Vec4) {
        self.set_uniform_4f(name, value.x, value.y, value.z, value.w);
    }

    /// Path of the vertex shader source
    pub fn vertex_path(&self) -> &Path {
        &self.vertex_path
    }

    /// Path of the fragment shader source
    pub fn fragment_path(&self) -> &Path {
        &self.fragment_path
    }
}

impl<D: ShaderDevice> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        if let Some(program) = self.program.take() {
            if self.device.is_live() {
                self.device.delete_program(program);
            }
        }
    }
}
