//! GLFW window with an OpenGL context
#![allow(unsafe_code)]

use std::cell::Cell;
use std::ops::Deref;
use std::rc::Rc;

use glfw::Context as _;
use glow::HasContext;

use super::backend::{ClearFlags, SurfaceBackend, SurfaceEvent};
use super::config::SurfaceConfig;
use super::{SurfaceError, SurfaceResult};
use crate::foundation::math::Color;

/// OpenGL function table of one window's context
///
/// Shared between a [`GlfwBackend`] and the shader programs built on it.
/// Every holder keeps GLFW initialized, so the GL library stays loaded. Once
/// the window is destroyed the context reports itself as no longer live and
/// shader programs stop issuing calls through it.
///
/// GL calls act on whichever context is current on the calling thread. Call
/// [`super::WindowSurface::make_current`] first when several surfaces exist.
pub struct GlContext {
    gl: glow::Context,
    live: Cell<bool>,
    _glfw: glfw::Glfw,
}

impl GlContext {
    /// Whether the window owning this context still exists
    pub fn is_live(&self) -> bool {
        self.live.get()
    }

    fn invalidate(&self) {
        self.live.set(false);
    }
}

impl Deref for GlContext {
    type Target = glow::Context;

    fn deref(&self) -> &glow::Context {
        &self.gl
    }
}

/// GLFW window and OpenGL context with proper resource management
///
/// Field order is drop order: the window is destroyed before the GLFW
/// handle, and GLFW terminates once its last handle is gone.
pub struct GlfwBackend {
    gl: Rc<GlContext>,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    window: glfw::PWindow,
    glfw: glfw::Glfw,
}

fn report_glfw_error(error: glfw::Error, description: String) {
    log::error!("GLFW error {error:?}: {description}");
}

impl GlfwBackend {
    /// Initialize GLFW, create the window and make its context current
    pub fn new(config: &SurfaceConfig) -> SurfaceResult<Self> {
        let mut glfw = glfw::init(report_glfw_error)
            .map_err(|e| SurfaceError::Initialization(format!("{e:?}")))?;

        let (major, minor) = config.gl_version;
        glfw.window_hint(glfw::WindowHint::ContextVersion(major, minor));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        glfw.window_hint(glfw::WindowHint::Resizable(config.resizable));
        #[cfg(target_os = "macos")]
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or_else(|| SurfaceError::WindowCreation {
                title: config.title.clone(),
                width: config.width,
                height: config.height,
            })?;

        window.make_current();

        window.set_size_polling(true);
        window.set_framebuffer_size_polling(true);
        window.set_key_polling(true);
        window.set_mouse_button_polling(true);
        window.set_cursor_pos_polling(true);
        window.set_close_polling(true);

        glfw.set_swap_interval(if config.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        let gl = unsafe { glow::Context::from_loader_function(|name| window.get_proc_address(name) as *const _) };
        log_context_info(&gl);

        let (fb_width, fb_height) = window.get_framebuffer_size();
        unsafe { gl.viewport(0, 0, fb_width, fb_height) };

        let context = GlContext {
            gl,
            live: Cell::new(true),
            _glfw: glfw.clone(),
        };

        Ok(Self {
            gl: Rc::new(context),
            events,
            window,
            glfw,
        })
    }

    /// Shared handle to the OpenGL function table of this window's context
    pub fn gl(&self) -> Rc<GlContext> {
        Rc::clone(&self.gl)
    }
}

impl Drop for GlfwBackend {
    fn drop(&mut self) {
        self.gl.invalidate();
    }
}

fn to_gl_size(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn log_context_info(gl: &glow::Context) {
    let (version, glsl, vendor, renderer) = unsafe {
        (
            gl.get_parameter_string(glow::VERSION),
            gl.get_parameter_string(glow::SHADING_LANGUAGE_VERSION),
            gl.get_parameter_string(glow::VENDOR),
            gl.get_parameter_string(glow::RENDERER),
        )
    };
    log::info!("OpenGL version: {version}");
    log::info!("GLSL version: {glsl}");
    log::info!("Vendor: {vendor}");
    log::info!("Renderer: {renderer}");
}

fn translate(event: glfw::WindowEvent) -> Option<SurfaceEvent> {
    match event {
        glfw::WindowEvent::Size(width, height) => Some(SurfaceEvent::Resized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        glfw::WindowEvent::FramebufferSize(width, height) => Some(SurfaceEvent::FramebufferResized {
            width: width.max(0) as u32,
            height: height.max(0) as u32,
        }),
        glfw::WindowEvent::Key(key, _, action, _) => Some(SurfaceEvent::Key { key, action }),
        glfw::WindowEvent::MouseButton(button, action, _) => Some(SurfaceEvent::MouseButton { button, action }),
        glfw::WindowEvent::CursorPos(x, y) => Some(SurfaceEvent::CursorMoved { x, y }),
        glfw::WindowEvent::Close => Some(SurfaceEvent::CloseRequested),
        _ => None,
    }
}

impl SurfaceBackend for GlfwBackend {
    fn time(&self) -> f64 {
        self.glfw.get_time()
    }

    fn make_current(&mut self) {
        self.window.make_current();
    }

    fn swap_buffers(&mut self) {
        self.window.swap_buffers();
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        self.glfw.poll_events();
        glfw::flush_messages(&self.events)
            .filter_map(|(_, event)| translate(event))
            .collect()
    }

    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.window.set_size(to_gl_size(width), to_gl_size(height));
    }

    fn clear(&mut self, flags: ClearFlags) {
        let mut mask = 0;
        if flags.contains(ClearFlags::COLOR) {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::DEPTH) {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        if flags.contains(ClearFlags::STENCIL) {
            mask |= glow::STENCIL_BUFFER_BIT;
        }
        unsafe { self.gl.clear(mask) };
    }

    fn set_clear_color(&mut self, color: Color) {
        unsafe { self.gl.clear_color(color.x, color.y, color.z, color.w) };
    }

    fn enable_depth_test(&mut self) {
        unsafe {
            self.gl.clear_depth_f64(1.0);
            self.gl.enable(glow::DEPTH_TEST);
        }
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        unsafe { self.gl.viewport(0, 0, to_gl_size(width), to_gl_size(height)) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{Action, Key, MouseButton};

    #[test]
    fn test_translate_clamps_negative_sizes() {
        assert_eq!(
            translate(glfw::WindowEvent::Size(-4, 300)),
            Some(SurfaceEvent::Resized { width: 0, height: 300 })
        );
        assert_eq!(
            translate(glfw::WindowEvent::FramebufferSize(1280, -1)),
            Some(SurfaceEvent::FramebufferResized { width: 1280, height: 0 })
        );
    }

    #[test]
    fn test_translate_input_and_close() {
        assert_eq!(
            translate(glfw::WindowEvent::Key(Key::A, 30, Action::Press, glfw::Modifiers::empty())),
            Some(SurfaceEvent::Key { key: Key::A, action: Action::Press })
        );
        assert_eq!(
            translate(glfw::WindowEvent::MouseButton(
                MouseButton::Button2,
                Action::Release,
                glfw::Modifiers::Shift
            )),
            Some(SurfaceEvent::MouseButton { button: MouseButton::Button2, action: Action::Release })
        );
        assert_eq!(
            translate(glfw::WindowEvent::CursorPos(12.5, 40.0)),
            Some(SurfaceEvent::CursorMoved { x: 12.5, y: 40.0 })
        );
        assert_eq!(translate(glfw::WindowEvent::Close), Some(SurfaceEvent::CloseRequested));
    }

    #[test]
    fn test_translate_ignores_unused_events() {
        assert_eq!(translate(glfw::WindowEvent::Focus(true)), None);
        assert_eq!(translate(glfw::WindowEvent::Char('x')), None);
    }

    #[test]
    fn test_gl_size_saturates() {
        assert_eq!(to_gl_size(640), 640);
        assert_eq!(to_gl_size(u32::MAX), i32::MAX);
    }
}
