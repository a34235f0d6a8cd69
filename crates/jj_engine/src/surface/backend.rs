//! Window backend contract
//!
//! The surface talks to the native window and its OpenGL context only through
//! [`SurfaceBackend`]. [`super::GlfwBackend`] is the real implementation;
//! [`super::HeadlessBackend`] stands in when there is no display.

use bitflags::bitflags;

use crate::foundation::math::Color;
use crate::input::{Action, Key, MouseButton};

bitflags! {
    /// Buffers cleared by [`SurfaceBackend::clear`]
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Color buffer
        const COLOR = 1 << 0;
        /// Depth buffer
        const DEPTH = 1 << 1;
        /// Stencil buffer
        const STENCIL = 1 << 2;
    }
}

/// Window event delivered by a backend during polling
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SurfaceEvent {
    /// The window's client area changed size
    Resized {
        /// New width in screen coordinates
        width: u32,
        /// New height in screen coordinates
        height: u32,
    },
    /// The framebuffer changed size
    FramebufferResized {
        /// New framebuffer width in pixels
        width: u32,
        /// New framebuffer height in pixels
        height: u32,
    },
    /// A key changed state
    Key {
        /// Key code
        key: Key,
        /// Press, release or repeat
        action: Action,
    },
    /// A mouse button changed state
    MouseButton {
        /// Button code
        button: MouseButton,
        /// Press or release
        action: Action,
    },
    /// The cursor moved
    CursorMoved {
        /// X position in screen coordinates
        x: f64,
        /// Y position in screen coordinates
        y: f64,
    },
    /// The user or OS asked for the window to close
    CloseRequested,
}

/// Internal trait for window backend implementations
///
/// All methods run on the thread that owns the graphics context.
pub trait SurfaceBackend {
    /// Monotonic time in seconds
    fn time(&self) -> f64;

    /// Make this window's graphics context current on the calling thread
    ///
    /// `clear`, `set_clear_color`, `enable_depth_test` and `set_viewport`
    /// act on the current context.
    fn make_current(&mut self);

    /// Present the back buffer
    fn swap_buffers(&mut self);

    /// Poll the window system and return the events that arrived since the
    /// previous poll, oldest first
    fn poll_events(&mut self) -> Vec<SurfaceEvent>;

    /// Check if the window should close
    fn should_close(&self) -> bool;

    /// Set whether the window should close
    fn set_should_close(&mut self, should_close: bool);

    /// Set the window title text
    fn set_title(&mut self, title: &str);

    /// Resize the window's client area
    fn set_size(&mut self, width: u32, height: u32);

    /// Clear the selected buffers with the current clear color
    fn clear(&mut self, flags: ClearFlags);

    /// Set the color used when clearing the color buffer
    fn set_clear_color(&mut self, color: Color);

    /// Reset the clear depth to 1.0 and enable depth testing
    fn enable_depth_test(&mut self);

    /// Set the viewport to cover `width` x `height` pixels from the origin
    fn set_viewport(&mut self, width: u32, height: u32);
}
