//! Window surface configuration

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::foundation::math::{color_from_array, colors, Color};

/// Settings used to create a [`super::WindowSurface`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Window title
    pub title: String,
    /// Initial width in screen coordinates
    pub width: u32,
    /// Initial height in screen coordinates
    pub height: u32,
    /// Clear color as `[r, g, b, a]`, each channel in `0.0..=1.0`
    pub clear_color: [f32; 4],
    /// Wait for vertical sync when presenting
    pub vsync: bool,
    /// Whether the user may resize the window
    pub resizable: bool,
    /// Requested OpenGL core profile version as `(major, minor)`
    pub gl_version: (u32, u32),
    /// Refuse to create this surface while another exclusive surface is live
    pub exclusive: bool,
}

impl SurfaceConfig {
    /// Configuration with the given title and size and defaults otherwise
    pub fn new(title: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            title: title.into(),
            width,
            height,
            ..Self::default()
        }
    }

    /// Replace the clear color
    #[must_use]
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = [color.x, color.y, color.z, color.w];
        self
    }

    /// Request an exclusive surface
    #[must_use]
    pub fn exclusive(mut self) -> Self {
        self.exclusive = true;
        self
    }

    /// Clear color as a vector
    pub fn clear_color(&self) -> Color {
        color_from_array(self.clear_color)
    }
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        let black = colors::BLACK;
        Self {
            title: "JJEngine".to_string(),
            width: 500,
            height: 500,
            clear_color: [black.x, black.y, black.z, black.w],
            vsync: true,
            resizable: true,
            gl_version: (4, 6),
            exclusive: false,
        }
    }
}

impl Config for SurfaceConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SurfaceConfig::default();
        assert_eq!((config.width, config.height), (500, 500));
        assert_eq!(config.clear_color(), colors::BLACK);
        assert_eq!(config.gl_version, (4, 6));
        assert!(!config.exclusive);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: SurfaceConfig = toml::from_str(
            r#"
            title = "Test App"
            clear_color = [0.2, 0.3, 0.3, 1.0]
            vsync = false
            "#,
        )
        .unwrap();

        assert_eq!(config.title, "Test App");
        assert_eq!(config.clear_color(), Color::new(0.2, 0.3, 0.3, 1.0));
        assert!(!config.vsync);
        assert_eq!(config.width, 500);
    }
}
