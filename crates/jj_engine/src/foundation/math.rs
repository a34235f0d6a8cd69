//! Math utilities and types
//!
//! Vector aliases used by uniform setters and clear colors.

pub use nalgebra::{Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// RGBA color with channels in the `0.0..=1.0` range
pub type Color = Vec4;

/// Common colors
pub mod colors {
    use super::Color;

    /// Opaque black, the default clear color
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);

    /// Opaque white
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
}

/// Convert a `[r, g, b, a]` array into a [`Color`]
pub fn color_from_array(rgba: [f32; 4]) -> Color {
    Color::new(rgba[0], rgba[1], rgba[2], rgba[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_array() {
        let color = color_from_array([0.1, 0.2, 0.3, 0.4]);
        assert_eq!(color, Color::new(0.1, 0.2, 0.3, 0.4));
    }

    #[test]
    fn test_default_clear_color_is_opaque_black() {
        assert_eq!(colors::BLACK.w, 1.0);
        assert_eq!(colors::BLACK.xyz(), Vec3::zeros());
    }
}
