//! Test application: a full-screen shader on a JJEngine window
//!
//! Controls:
//! - `Escape` closes the window
//! - `R` reloads the shader sources from disk
//! - `C` or a left click cycles the tint color
//! - `Space` toggles the background between dark and light

#![allow(unsafe_code)] // Vertex array setup goes straight to OpenGL

use std::rc::Rc;

use glow::HasContext;
use jj_engine::foundation::logging;
use jj_engine::prelude::*;

const CONFIG_PATH: &str = "test_app.toml";

const TINTS: [Color; 3] = [
    Color::new(0.9, 0.3, 0.2, 1.0),
    Color::new(0.2, 0.8, 0.4, 1.0),
    Color::new(0.3, 0.4, 0.95, 1.0),
];

struct TestApp {
    gl: Rc<GlContext>,
    shader: Option<ShaderProgram>,
    vertex_array: Option<<glow::Context as HasContext>::VertexArray>,
    tint: usize,
    light_background: bool,
    title_timer: f32,
}

impl TestApp {
    fn new(gl: Rc<GlContext>) -> Self {
        Self {
            gl,
            shader: None,
            vertex_array: None,
            tint: 0,
            light_background: false,
            title_timer: 0.0,
        }
    }
}

impl Application<GlfwBackend> for TestApp {
    fn initialize(&mut self, surface: &mut WindowSurface) -> Result<(), AppError> {
        let config = ShaderConfig::load_or_default("shader.toml")?;
        if let Err(err) = config.validate() {
            log::warn!("{err}");
        }
        self.shader = Some(ShaderProgram::from_config(Rc::clone(&self.gl), &config));

        // Core profile needs a bound vertex array even without attributes
        let vertex_array = unsafe { self.gl.create_vertex_array() }.map_err(AppError::Custom)?;
        self.vertex_array = Some(vertex_array);

        let id = surface.id();
        surface.add_resize_callback(move |surface_id, width, height| {
            debug_assert_eq!(surface_id, id);
            log::info!("{surface_id} resized to {width}x{height}");
        });
        Ok(())
    }

    fn update(&mut self, surface: &mut WindowSurface, delta_time: f32) -> Result<(), AppError> {
        if surface.is_key_pressed(Key::Escape, true) {
            surface.set_should_close(true);
        }

        if surface.is_key_pressed(Key::R, true) {
            if let Some(shader) = self.shader.as_mut() {
                // A failed reload keeps the previous program running
                if shader.load().is_ok() {
                    log::info!("Shader reloaded");
                }
            }
        }

        if surface.is_key_pressed(Key::C, true) || surface.is_button_pressed(MouseButton::Button1, true) {
            self.tint = (self.tint + 1) % TINTS.len();
        }

        if surface.is_key_pressed(Key::Space, true) {
            self.light_background = !self.light_background;
            let color = if self.light_background { colors::WHITE } else { colors::BLACK };
            surface.set_clear_color(color);
        }

        self.title_timer += delta_time;
        if self.title_timer >= 1.0 {
            self.title_timer = 0.0;
            let fps = surface.frame_clock().current_fps();
            surface.set_title(&format!("Test App - {fps:.0} fps"));
        }
        Ok(())
    }

    fn render(&mut self, surface: &mut WindowSurface) -> Result<(), AppError> {
        let Some(shader) = self.shader.as_mut() else {
            return Ok(());
        };
        if !shader.is_ready() {
            return Ok(());
        }

        let (width, height) = surface.size();
        let (mouse_x, mouse_y) = surface.cursor_position();

        shader.use_program();
        shader.set_uniform_1f("u_time", surface.frame_clock().total_time());
        shader.set_uniform_vec2("u_resolution", &Vec2::new(width as f32, height as f32));
        // Cursor origin is top-left, fragment origin is bottom-left
        shader.set_uniform_2f("u_mouse", mouse_x as f32, height as f32 - mouse_y as f32);
        shader.set_uniform_vec4("u_color", &TINTS[self.tint]);

        unsafe {
            self.gl.bind_vertex_array(self.vertex_array);
            self.gl.draw_arrays(glow::TRIANGLES, 0, 3);
        }
        Ok(())
    }

    fn cleanup(&mut self, _surface: &mut WindowSurface) {
        if let Some(vertex_array) = self.vertex_array.take() {
            unsafe { self.gl.delete_vertex_array(vertex_array) };
        }
        self.shader = None;
    }
}

fn main() -> Result<(), AppError> {
    logging::init();

    let config = SurfaceConfig::load_or_default(CONFIG_PATH)?.exclusive();
    let mut surface = WindowSurface::from_config(&config)?;
    let mut app = TestApp::new(surface.gl());

    run(&mut surface, &mut app)?;
    Ok(())
}
