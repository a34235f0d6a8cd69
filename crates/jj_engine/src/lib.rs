//! # JJEngine
//!
//! A small windowing shim over GLFW and OpenGL.
//!
//! - **Window surface**: one native window with a current OpenGL context,
//!   per-frame clear / present / poll cycle, pressed-key and pressed-button
//!   tracking, resize callbacks
//! - **Shader program**: vertex + fragment GLSL files compiled and linked into
//!   one program, typed uniform setters, cached uniform locations
//! - **Headless backend**: the same surface without a display, for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use jj_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     jj_engine::foundation::logging::init();
//!
//!     let mut window = WindowSurface::new("Test App", 500, 500)?;
//!     let mut shader = ShaderProgram::new(window.gl(), "shaders/basic.vert", "shaders/basic.frag");
//!
//!     while !window.should_close() {
//!         window.clear();
//!         shader.use_program();
//!         shader.set_uniform_1f("u_time", window.frame_clock().total_time());
//!         window.update();
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod input;
pub mod surface;
pub mod shader;

mod application;

pub use application::{run, AppError, Application};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        run, AppError, Application,
        config::{Config, ConfigError},
        foundation::{
            math::{colors, Color, Vec2, Vec3, Vec4},
            time::FrameClock,
        },
        input::{Action, Key, MouseButton},
        shader::{ShaderConfig, ShaderError, ShaderProgram, ShaderStage, UniformValue},
        surface::{
            GlContext, GlfwBackend, HeadlessBackend, HeadlessHandle, ResizeCallbackId, SurfaceConfig, SurfaceError,
            SurfaceId, WindowSurface,
        },
    };
}
