//! Application trait and frame loop

use thiserror::Error;

use crate::config::ConfigError;
use crate::shader::ShaderError;
use crate::surface::{SurfaceBackend, SurfaceError, WindowSurface};

/// Application lifecycle trait
///
/// Implement this trait and hand it to [`run`] together with a surface.
pub trait Application<B: SurfaceBackend> {
    /// Initialize the application
    ///
    /// Called once before the first frame. Load shaders and set up state here.
    fn initialize(&mut self, _surface: &mut WindowSurface<B>) -> Result<(), AppError> {
        Ok(())
    }

    /// Update the application
    ///
    /// Called every frame after the surface was cleared.
    ///
    /// # Arguments
    /// * `surface` - The window surface, for input queries and setters
    /// * `delta_time` - Time between the two previous frames in seconds
    fn update(&mut self, surface: &mut WindowSurface<B>, delta_time: f32) -> Result<(), AppError>;

    /// Render the application
    ///
    /// Called after update and before the frame is presented.
    fn render(&mut self, _surface: &mut WindowSurface<B>) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called once when the loop ends, also when it ends with an error.
    fn cleanup(&mut self, _surface: &mut WindowSurface<B>) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Window surface error
    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    /// Shader error
    #[error("Shader error: {0}")]
    Shader(#[from] ShaderError),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}

/// Run `app` on `surface` until the window is asked to close
///
/// Each frame clears the surface, updates and renders the application and
/// then finishes the frame with [`WindowSurface::update`]. Returns the
/// number of frames run.
pub fn run<B, A>(surface: &mut WindowSurface<B>, app: &mut A) -> Result<u64, AppError>
where
    B: SurfaceBackend,
    A: Application<B>,
{
    let result = run_frames(surface, app);
    app.cleanup(surface);

    match &result {
        Ok(frames) => log::info!("Application finished after {frames} frames"),
        Err(err) => log::error!("Application stopped: {err}"),
    }
    result
}

fn run_frames<B, A>(surface: &mut WindowSurface<B>, app: &mut A) -> Result<u64, AppError>
where
    B: SurfaceBackend,
    A: Application<B>,
{
    app.initialize(surface)?;

    let mut frames = 0;
    while !surface.should_close() {
        surface.clear();
        let delta_time = surface.delta_time();
        app.update(surface, delta_time)?;
        app.render(surface)?;
        surface.update();
        frames += 1;
    }
    Ok(frames)
}
