//! Window surface: one native window, its OpenGL context and its input
//!
//! The surface drives the per-frame cycle. The host clears, draws and then
//! calls [`WindowSurface::update`], which presents the frame and dispatches
//! every pending window event. Dispatch is the only place where input state,
//! size and close state change and where resize callbacks run.
//!
//! Each native window owns its own event queue, and a surface only drains
//! the queue of the window it owns. Several surfaces can therefore live side
//! by side without any process-wide window registry. Every surface operation
//! that touches the graphics context makes the surface's own context current
//! first. Shader programs draw into whichever context is current, which after
//! [`WindowSurface::clear`] is the cleared surface's. A surface created with
//! [`SurfaceConfig::exclusive`] additionally claims the single exclusive slot
//! and fails with [`SurfaceError::Conflict`] while another exclusive surface
//! is live.

mod backend;
mod config;
mod headless;
mod native;

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use thiserror::Error;

pub use backend::{ClearFlags, SurfaceBackend, SurfaceEvent};
pub use config::SurfaceConfig;
pub use headless::{HeadlessBackend, HeadlessHandle, DEFAULT_FRAME_STEP};
pub use native::{GlContext, GlfwBackend};

use crate::foundation::math::Color;
use crate::foundation::time::FrameClock;
use crate::input::{InputState, Key, MouseButton};

/// Window surface errors
#[derive(Error, Debug)]
pub enum SurfaceError {
    /// The windowing subsystem could not be brought up
    #[error("GLFW initialization failed: {0}")]
    Initialization(String),

    /// The native window or its context could not be created
    #[error("Window creation failed for \"{title}\" ({width}x{height})")]
    WindowCreation {
        /// Requested title
        title: String,
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// An exclusive surface was requested while another one is live
    #[error("An exclusive window surface is already live")]
    Conflict,
}

/// Result alias for surface operations
pub type SurfaceResult<T> = Result<T, SurfaceError>;

/// Process-unique identifier of a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Handle returned by [`WindowSurface::add_resize_callback`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResizeCallbackId(u64);

type ResizeCallback = Box<dyn FnMut(SurfaceId, u32, u32)>;

static EXCLUSIVE_LIVE: AtomicBool = AtomicBool::new(false);

/// Claim on the exclusive surface slot, released on drop
#[derive(Debug)]
struct ExclusiveClaim;

impl ExclusiveClaim {
    fn acquire() -> SurfaceResult<Self> {
        EXCLUSIVE_LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self)
            .map_err(|_| SurfaceError::Conflict)
    }
}

impl Drop for ExclusiveClaim {
    fn drop(&mut self) {
        EXCLUSIVE_LIVE.store(false, Ordering::Release);
    }
}

/// A native window with a current OpenGL context
///
/// Dropping the surface destroys the window. GLFW itself shuts down once no
/// surface holds it any more.
pub struct WindowSurface<B: SurfaceBackend = GlfwBackend> {
    id: SurfaceId,
    title: String,
    width: u32,
    height: u32,
    clear_color: Color,
    clock: FrameClock,
    input: InputState,
    resize_callbacks: Vec<(ResizeCallbackId, ResizeCallback)>,
    next_callback_id: u64,
    backend: B,
    // Declared after the backend so the slot is released once the window is gone
    _exclusive: Option<ExclusiveClaim>,
}

impl WindowSurface<GlfwBackend> {
    /// Create a window with an opaque black clear color
    pub fn new(title: &str, width: u32, height: u32) -> SurfaceResult<Self> {
        Self::from_config(&SurfaceConfig::new(title, width, height))
    }

    /// Create a window with the given clear color
    pub fn with_clear_color(title: &str, width: u32, height: u32, clear_color: Color) -> SurfaceResult<Self> {
        Self::from_config(&SurfaceConfig::new(title, width, height).with_clear_color(clear_color))
    }

    /// Create a window from a full configuration
    pub fn from_config(config: &SurfaceConfig) -> SurfaceResult<Self> {
        let claim = if config.exclusive { Some(ExclusiveClaim::acquire()?) } else { None };
        let backend = GlfwBackend::new(config)?;
        Ok(Self::assemble(backend, config, claim))
    }

    /// Shared handle to this window's OpenGL context
    ///
    /// Shader programs built on it stop issuing GL calls once the surface is
    /// dropped.
    pub fn gl(&self) -> std::rc::Rc<GlContext> {
        self.backend.gl()
    }
}

impl<B: SurfaceBackend> WindowSurface<B> {
    /// Wrap an already created backend
    ///
    /// The configuration supplies title, size, clear color and the exclusive
    /// policy. The backend is expected to match the configured size.
    pub fn with_backend(backend: B, config: &SurfaceConfig) -> SurfaceResult<Self> {
        let claim = if config.exclusive { Some(ExclusiveClaim::acquire()?) } else { None };
        Ok(Self::assemble(backend, config, claim))
    }

    fn assemble(mut backend: B, config: &SurfaceConfig, claim: Option<ExclusiveClaim>) -> Self {
        let clear_color = config.clear_color();
        backend.make_current();
        backend.set_title(&config.title);
        backend.enable_depth_test();
        backend.set_clear_color(clear_color);

        let id = SurfaceId::next();
        log::debug!("{id} created: \"{}\" {}x{}", config.title, config.width, config.height);

        Self {
            id,
            title: config.title.clone(),
            width: config.width,
            height: config.height,
            clear_color,
            clock: FrameClock::new(backend.time()),
            input: InputState::new(),
            resize_callbacks: Vec::new(),
            next_callback_id: 0,
            backend,
            _exclusive: claim,
        }
    }

    /// Clear the color, depth and stencil buffers with the clear color
    pub fn clear(&mut self) {
        self.backend.make_current();
        self.backend.clear(ClearFlags::all());
    }

    /// Finish the frame
    ///
    /// Measures the delta time, presents the frame and dispatches all pending
    /// window events. Call once per frame after issuing draw commands.
    pub fn update(&mut self) {
        self.backend.make_current();
        self.clock.tick(self.backend.time());
        self.backend.swap_buffers();

        for event in self.backend.poll_events() {
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Resized { width, height } => {
                self.width = width;
                self.height = height;
                for (_, callback) in &mut self.resize_callbacks {
                    callback(self.id, width, height);
                }
            }
            SurfaceEvent::FramebufferResized { width, height } => {
                self.backend.set_viewport(width, height);
            }
            SurfaceEvent::Key { key, action } => self.input.handle_key(key, action),
            SurfaceEvent::MouseButton { button, action } => self.input.handle_mouse_button(button, action),
            SurfaceEvent::CursorMoved { x, y } => self.input.handle_cursor_move(x, y),
            SurfaceEvent::CloseRequested => {
                log::debug!("{} close requested", self.id);
                self.backend.set_should_close(true);
            }
        }
    }

    /// Check whether `key` is pressed
    ///
    /// With `reset` a positive answer consumes the press, so a held key
    /// reports pressed once per press event. Pass `false` to poll the
    /// held state instead.
    pub fn is_key_pressed(&mut self, key: Key, reset: bool) -> bool {
        self.input.is_key_pressed(key, reset)
    }

    /// Check whether `button` is pressed, see [`WindowSurface::is_key_pressed`]
    pub fn is_button_pressed(&mut self, button: MouseButton, reset: bool) -> bool {
        self.input.is_button_pressed(button, reset)
    }

    /// Last known cursor position
    pub fn cursor_position(&self) -> (f64, f64) {
        self.input.cursor_position()
    }

    /// Whether the user, the OS or the application asked the window to close
    pub fn should_close(&self) -> bool {
        self.backend.should_close()
    }

    /// Ask the window to close (or cancel a pending close)
    pub fn set_should_close(&mut self, should_close: bool) {
        self.backend.set_should_close(should_close);
    }

    /// Register a function called with `(surface, width, height)` on resize
    ///
    /// Callbacks run inside [`WindowSurface::update`] in registration order
    /// and see the size that is already stored on the surface.
    pub fn add_resize_callback<F>(&mut self, callback: F) -> ResizeCallbackId
    where
        F: FnMut(SurfaceId, u32, u32) + 'static,
    {
        let id = ResizeCallbackId(self.next_callback_id);
        self.next_callback_id += 1;
        self.resize_callbacks.push((id, Box::new(callback)));
        id
    }

    /// Unregister a resize callback, returning whether it was registered
    pub fn remove_resize_callback(&mut self, id: ResizeCallbackId) -> bool {
        let before = self.resize_callbacks.len();
        self.resize_callbacks.retain(|(registered, _)| *registered != id);
        self.resize_callbacks.len() != before
    }

    /// Set the window title
    pub fn set_title(&mut self, title: &str) {
        self.backend.set_title(title);
        self.title = title.to_string();
    }

    /// Resize the window
    pub fn set_size(&mut self, width: u32, height: u32) {
        self.backend.set_size(width, height);
        self.width = width;
        self.height = height;
    }

    /// Set the color used by [`WindowSurface::clear`]
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color = color;
        self.backend.make_current();
        self.backend.set_clear_color(color);
    }

    /// Make this surface's graphics context current on the calling thread
    ///
    /// Needed before drawing or touching shader programs when several
    /// surfaces are alive and this one was not the last cleared.
    pub fn make_current(&mut self) {
        self.backend.make_current();
    }

    /// Identifier passed to resize callbacks
    pub fn id(&self) -> SurfaceId {
        self.id
    }

    /// Window title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Width in screen coordinates
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in screen coordinates
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Size in screen coordinates
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Clear color
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Seconds between the two most recent updates
    pub fn delta_time(&self) -> f32 {
        self.clock.delta_time()
    }

    /// Frame timing statistics
    pub fn frame_clock(&self) -> &FrameClock {
        &self.clock
    }
}

impl<B: SurfaceBackend> Drop for WindowSurface<B> {
    fn drop(&mut self) {
        log::debug!("{} destroyed after {} frames", self.id, self.clock.frame_count());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::colors;
    use approx::assert_relative_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn headless(title: &str, width: u32, height: u32) -> (WindowSurface<HeadlessBackend>, HeadlessHandle) {
        let (backend, handle) = HeadlessBackend::new(width, height);
        let surface = WindowSurface::with_backend(backend, &SurfaceConfig::new(title, width, height)).unwrap();
        (surface, handle)
    }

    #[test]
    fn test_construction_state() {
        let (surface, handle) = headless("Test App", 800, 600);

        assert_eq!(surface.title(), "Test App");
        assert_eq!(surface.size(), (800, 600));
        assert!(!surface.should_close());
        assert_eq!(surface.clear_color(), colors::BLACK);
        assert_eq!(handle.title(), "Test App");
        assert!(handle.depth_test_enabled());
        assert_eq!(handle.clear_color(), colors::BLACK);
    }

    #[test]
    fn test_end_to_end_frame_cycle() {
        let (backend, handle) = HeadlessBackend::new(320, 240);
        let config = SurfaceConfig::new("T", 320, 240).with_clear_color(Color::new(0.0, 0.0, 0.0, 1.0));
        let mut surface = WindowSurface::with_backend(backend, &config).unwrap();

        surface.clear();
        surface.update();
        assert_eq!(handle.clear_count(), 1);
        assert_eq!(handle.frames_presented(), 1);

        surface.clear();
        surface.update();
        assert!(surface.delta_time() > 0.0);
        assert_relative_eq!(surface.delta_time(), DEFAULT_FRAME_STEP as f32);

        assert!(!surface.should_close());
        handle.request_close();
        assert!(!surface.should_close());
        surface.update();
        assert!(surface.should_close());
    }

    #[test]
    fn test_delta_time_follows_backend_clock() {
        let (mut surface, handle) = headless("T", 100, 100);
        handle.set_frame_step(0.0);
        handle.advance_time(0.25);
        surface.update();
        assert_relative_eq!(surface.delta_time(), 0.25);

        surface.update();
        assert_eq!(surface.delta_time(), 0.0);
    }

    #[test]
    fn test_key_press_is_edge_triggered_by_default() {
        let (mut surface, handle) = headless("T", 100, 100);
        handle.press_key(Key::Space);

        assert!(!surface.is_key_pressed(Key::Space, true));
        surface.update();
        assert!(surface.is_key_pressed(Key::Space, true));
        assert!(!surface.is_key_pressed(Key::Space, true));
    }

    #[test]
    fn test_key_held_until_release_without_reset() {
        let (mut surface, handle) = headless("T", 100, 100);
        handle.press_key(Key::W);
        surface.update();

        for _ in 0..3 {
            assert!(surface.is_key_pressed(Key::W, false));
        }

        handle.release_key(Key::W);
        surface.update();
        assert!(!surface.is_key_pressed(Key::W, false));
    }

    #[test]
    fn test_buttons_and_cursor() {
        let (mut surface, handle) = headless("T", 100, 100);
        handle.press_button(MouseButton::Button1);
        handle.move_cursor(30.0, 45.5);
        surface.update();

        assert_eq!(surface.cursor_position(), (30.0, 45.5));
        assert!(surface.is_button_pressed(MouseButton::Button1, true));
        assert!(!surface.is_button_pressed(MouseButton::Button1, true));

        handle.press_button(MouseButton::Button2);
        handle.release_button(MouseButton::Button2);
        surface.update();
        assert!(!surface.is_button_pressed(MouseButton::Button2, false));
    }

    #[test]
    fn test_set_size_and_callbacks_see_dispatch_time_size() {
        let (mut surface, handle) = headless("T", 100, 100);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        surface.add_resize_callback(move |_, width, height| sink.borrow_mut().push((width, height)));

        surface.set_size(640, 480);
        assert_eq!(surface.size(), (640, 480));
        assert_eq!(surface.width(), 640);
        assert_eq!(surface.height(), 480);
        assert!(seen.borrow().is_empty());

        handle.resize(1024, 768);
        surface.update();

        assert_eq!(*seen.borrow(), vec![(640, 480), (1024, 768)]);
        assert_eq!(surface.size(), (1024, 768));
        assert_eq!((surface.width(), surface.height()), (1024, 768));
        assert_eq!(handle.viewport(), (1024, 768));
    }

    #[test]
    fn test_resize_callbacks_run_in_registration_order_and_can_be_removed() {
        let (mut surface, handle) = headless("T", 100, 100);
        let order = Rc::new(RefCell::new(Vec::new()));
        let surface_id = surface.id();

        let first = Rc::clone(&order);
        let first_id = surface.add_resize_callback(move |id, _, _| {
            assert_eq!(id, surface_id);
            first.borrow_mut().push("first");
        });
        let second = Rc::clone(&order);
        surface.add_resize_callback(move |_, _, _| second.borrow_mut().push("second"));

        handle.resize(200, 200);
        surface.update();
        assert_eq!(*order.borrow(), vec!["first", "second"]);

        assert!(surface.remove_resize_callback(first_id));
        assert!(!surface.remove_resize_callback(first_id));

        handle.resize(300, 300);
        surface.update();
        assert_eq!(*order.borrow(), vec!["first", "second", "second"]);
    }

    #[test]
    fn test_setters_push_to_backend() {
        let (mut surface, handle) = headless("T", 100, 100);
        let teal = Color::new(0.2, 0.3, 0.3, 1.0);

        surface.set_title("Renamed");
        surface.set_clear_color(teal);

        assert_eq!(surface.title(), "Renamed");
        assert_eq!(handle.title(), "Renamed");
        assert_eq!(surface.clear_color(), teal);
        assert_eq!(handle.clear_color(), teal);
    }

    #[test]
    fn test_set_should_close() {
        let (mut surface, _handle) = headless("T", 100, 100);
        surface.set_should_close(true);
        assert!(surface.should_close());
        surface.set_should_close(false);
        assert!(!surface.should_close());
    }

    #[test]
    fn test_surfaces_are_independent() {
        let (mut a, handle_a) = headless("A", 100, 100);
        let (mut b, _handle_b) = headless("B", 100, 100);
        assert_ne!(a.id(), b.id());

        handle_a.press_key(Key::Enter);
        a.update();
        b.update();

        assert!(!b.is_key_pressed(Key::Enter, false));
        assert!(a.is_key_pressed(Key::Enter, false));
    }

    #[test]
    fn test_context_operations_target_their_own_surface() {
        let (mut a, handle_a) = headless("A", 100, 100);
        let (mut b, handle_b) = headless("B", 100, 100);
        assert!(handle_b.is_current());

        a.set_clear_color(colors::WHITE);
        a.clear();
        assert!(handle_a.is_current());
        assert_eq!(handle_a.clear_color(), colors::WHITE);
        assert_eq!(handle_b.clear_color(), colors::BLACK);

        b.clear();
        handle_a.resize(300, 200);
        a.update();
        assert_eq!(handle_a.viewport(), (300, 200));
        assert_eq!(handle_b.viewport(), (100, 100));

        assert_eq!(handle_a.clear_count(), 1);
        assert_eq!(handle_b.clear_count(), 1);
        assert_eq!(handle_a.stray_context_calls(), 0);
        assert_eq!(handle_b.stray_context_calls(), 0);
    }

    #[test]
    fn test_exclusive_surface_conflict() {
        let config = SurfaceConfig::new("Exclusive", 100, 100).exclusive();

        let (backend, _) = HeadlessBackend::new(100, 100);
        let first = WindowSurface::with_backend(backend, &config).unwrap();

        let (backend, _) = HeadlessBackend::new(100, 100);
        assert!(matches!(
            WindowSurface::with_backend(backend, &config),
            Err(SurfaceError::Conflict)
        ));

        // Non-exclusive surfaces are unaffected
        let (backend, _) = HeadlessBackend::new(100, 100);
        assert!(WindowSurface::with_backend(backend, &SurfaceConfig::new("Other", 100, 100)).is_ok());

        drop(first);
        let (backend, _) = HeadlessBackend::new(100, 100);
        assert!(WindowSurface::with_backend(backend, &config).is_ok());
    }
}
