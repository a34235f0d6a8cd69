//! In-memory window backend
//!
//! Used for tests and CI machines without a display. The backend keeps the
//! state a real window would have, and a [`HeadlessHandle`] lets the caller
//! inject input, resize and close events and drive the clock.
//!
//! Each backend also models a graphics context. Like a real window it
//! becomes current when created, and context operations issued while another
//! backend is current are counted as stray.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::backend::{ClearFlags, SurfaceBackend, SurfaceEvent};
use crate::foundation::math::{colors, Color};
use crate::input::{Action, Key, MouseButton};

/// Default time step applied on every buffer swap (60 Hz)
pub const DEFAULT_FRAME_STEP: f64 = 1.0 / 60.0;

static NEXT_CONTEXT: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static CURRENT_CONTEXT: Cell<u64> = const { Cell::new(0) };
}

#[derive(Debug)]
struct HeadlessState {
    context: u64,
    stray_context_calls: u64,
    time: f64,
    frame_step: f64,
    pending: VecDeque<SurfaceEvent>,
    should_close: bool,
    title: String,
    size: (u32, u32),
    viewport: (u32, u32),
    clear_color: Color,
    depth_test: bool,
    clears: u64,
    frames_presented: u64,
}

/// Window backend without a native window
pub struct HeadlessBackend {
    state: Rc<RefCell<HeadlessState>>,
}

/// Controller for a [`HeadlessBackend`]
#[derive(Clone)]
pub struct HeadlessHandle {
    state: Rc<RefCell<HeadlessState>>,
}

impl HeadlessBackend {
    /// Create a backend whose window starts at `width` x `height`
    pub fn new(width: u32, height: u32) -> (Self, HeadlessHandle) {
        let context = NEXT_CONTEXT.fetch_add(1, Ordering::Relaxed);
        CURRENT_CONTEXT.with(|current| current.set(context));

        let state = Rc::new(RefCell::new(HeadlessState {
            context,
            stray_context_calls: 0,
            time: 0.0,
            frame_step: DEFAULT_FRAME_STEP,
            pending: VecDeque::new(),
            should_close: false,
            title: String::new(),
            size: (width, height),
            viewport: (width, height),
            clear_color: colors::BLACK,
            depth_test: false,
            clears: 0,
            frames_presented: 0,
        }));
        let handle = HeadlessHandle { state: Rc::clone(&state) };
        (Self { state }, handle)
    }
}

impl HeadlessHandle {
    /// Queue an event for the next poll
    pub fn push_event(&self, event: SurfaceEvent) {
        self.state.borrow_mut().pending.push_back(event);
    }

    /// Queue a key press
    pub fn press_key(&self, key: Key) {
        self.push_event(SurfaceEvent::Key { key, action: Action::Press });
    }

    /// Queue a key release
    pub fn release_key(&self, key: Key) {
        self.push_event(SurfaceEvent::Key { key, action: Action::Release });
    }

    /// Queue a mouse button press
    pub fn press_button(&self, button: MouseButton) {
        self.push_event(SurfaceEvent::MouseButton { button, action: Action::Press });
    }

    /// Queue a mouse button release
    pub fn release_button(&self, button: MouseButton) {
        self.push_event(SurfaceEvent::MouseButton { button, action: Action::Release });
    }

    /// Queue a cursor movement
    pub fn move_cursor(&self, x: f64, y: f64) {
        self.push_event(SurfaceEvent::CursorMoved { x, y });
    }

    /// Resize the window as the user would, queueing the matching events
    pub fn resize(&self, width: u32, height: u32) {
        let mut state = self.state.borrow_mut();
        state.size = (width, height);
        state.pending.push_back(SurfaceEvent::Resized { width, height });
        state.pending.push_back(SurfaceEvent::FramebufferResized { width, height });
    }

    /// Queue a close request as the user clicking the close button would
    pub fn request_close(&self) {
        self.push_event(SurfaceEvent::CloseRequested);
    }

    /// Move the clock forward by `seconds`
    pub fn advance_time(&self, seconds: f64) {
        self.state.borrow_mut().time += seconds;
    }

    /// Change how far the clock moves on each buffer swap
    pub fn set_frame_step(&self, seconds: f64) {
        self.state.borrow_mut().frame_step = seconds;
    }

    /// Current clock value in seconds
    pub fn time(&self) -> f64 {
        self.state.borrow().time
    }

    /// Title last pushed to the window
    pub fn title(&self) -> String {
        self.state.borrow().title.clone()
    }

    /// Window size as the window system sees it
    pub fn size(&self) -> (u32, u32) {
        self.state.borrow().size
    }

    /// Current viewport size
    pub fn viewport(&self) -> (u32, u32) {
        self.state.borrow().viewport
    }

    /// Clear color last pushed to the context
    pub fn clear_color(&self) -> Color {
        self.state.borrow().clear_color
    }

    /// Whether depth testing was enabled
    pub fn depth_test_enabled(&self) -> bool {
        self.state.borrow().depth_test
    }

    /// Number of clears issued
    pub fn clear_count(&self) -> u64 {
        self.state.borrow().clears
    }

    /// Number of frames presented
    pub fn frames_presented(&self) -> u64 {
        self.state.borrow().frames_presented
    }

    /// Whether this backend's context is current on the calling thread
    pub fn is_current(&self) -> bool {
        self.state.borrow().is_current()
    }

    /// Number of context operations issued while another context was current
    pub fn stray_context_calls(&self) -> u64 {
        self.state.borrow().stray_context_calls
    }

    /// Number of events waiting for the next poll
    pub fn pending_events(&self) -> usize {
        self.state.borrow().pending.len()
    }
}

impl HeadlessState {
    fn is_current(&self) -> bool {
        CURRENT_CONTEXT.with(Cell::get) == self.context
    }

    fn context_call(&mut self) -> &mut Self {
        if !self.is_current() {
            self.stray_context_calls += 1;
        }
        self
    }
}

impl SurfaceBackend for HeadlessBackend {
    fn time(&self) -> f64 {
        self.state.borrow().time
    }

    fn make_current(&mut self) {
        let context = self.state.borrow().context;
        CURRENT_CONTEXT.with(|current| current.set(context));
    }

    fn swap_buffers(&mut self) {
        let mut state = self.state.borrow_mut();
        state.frames_presented += 1;
        state.time += state.frame_step;
    }

    fn poll_events(&mut self) -> Vec<SurfaceEvent> {
        self.state.borrow_mut().pending.drain(..).collect()
    }

    fn should_close(&self) -> bool {
        self.state.borrow().should_close
    }

    fn set_should_close(&mut self, should_close: bool) {
        self.state.borrow_mut().should_close = should_close;
    }

    fn set_title(&mut self, title: &str) {
        self.state.borrow_mut().title = title.to_string();
    }

    fn set_size(&mut self, width: u32, height: u32) {
        // The window system answers a resize request with size events
        HeadlessHandle { state: Rc::clone(&self.state) }.resize(width, height);
    }

    fn clear(&mut self, flags: ClearFlags) {
        let mut state = self.state.borrow_mut();
        let state = state.context_call();
        if !flags.is_empty() {
            state.clears += 1;
        }
    }

    fn set_clear_color(&mut self, color: Color) {
        self.state.borrow_mut().context_call().clear_color = color;
    }

    fn enable_depth_test(&mut self) {
        self.state.borrow_mut().context_call().depth_test = true;
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.state.borrow_mut().context_call().viewport = (width, height);
    }
}
