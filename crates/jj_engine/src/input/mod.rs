//! Input state tracking
//!
//! Key and mouse button codes are the GLFW ones. The state is fed by the
//! window surface while it dispatches events in `update()`.

use std::collections::HashSet;

pub use glfw::{Action, Key, MouseButton};

/// Pressed keys, pressed mouse buttons and the last cursor position
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys_pressed: HashSet<Key>,
    buttons_pressed: HashSet<MouseButton>,
    cursor: (f64, f64),
}

impl InputState {
    /// Create an empty input state
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key event
    ///
    /// Repeat events leave the pressed set untouched, so a key consumed by
    /// an edge-triggered query is not re-armed while it is held.
    pub fn handle_key(&mut self, key: Key, action: Action) {
        match action {
            Action::Press => {
                self.keys_pressed.insert(key);
            }
            Action::Release => {
                self.keys_pressed.remove(&key);
            }
            Action::Repeat => {}
        }
    }

    /// Handle a mouse button event
    pub fn handle_mouse_button(&mut self, button: MouseButton, action: Action) {
        match action {
            Action::Press => {
                self.buttons_pressed.insert(button);
            }
            Action::Release => {
                self.buttons_pressed.remove(&button);
            }
            Action::Repeat => {}
        }
    }

    /// Handle cursor movement
    pub fn handle_cursor_move(&mut self, x: f64, y: f64) {
        self.cursor = (x, y);
    }

    /// Check whether `key` is pressed
    ///
    /// With `reset` the key is consumed by a positive answer and reports
    /// pressed again only after a new press event.
    pub fn is_key_pressed(&mut self, key: Key, reset: bool) -> bool {
        query(&mut self.keys_pressed, key, reset)
    }

    /// Check whether `button` is pressed, see [`InputState::is_key_pressed`]
    pub fn is_button_pressed(&mut self, button: MouseButton, reset: bool) -> bool {
        query(&mut self.buttons_pressed, button, reset)
    }

    /// Last known cursor position in screen coordinates
    pub fn cursor_position(&self) -> (f64, f64) {
        self.cursor
    }
}

fn query<T: Eq + std::hash::Hash>(set: &mut HashSet<T>, code: T, reset: bool) -> bool {
    if reset {
        set.remove(&code)
    } else {
        set.contains(&code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_triggered_key_query() {
        let mut input = InputState::new();
        input.handle_key(Key::Space, Action::Press);

        assert!(input.is_key_pressed(Key::Space, true));
        assert!(!input.is_key_pressed(Key::Space, true));
    }

    #[test]
    fn test_level_triggered_key_query_until_release() {
        let mut input = InputState::new();
        input.handle_key(Key::W, Action::Press);

        assert!(input.is_key_pressed(Key::W, false));
        assert!(input.is_key_pressed(Key::W, false));

        input.handle_key(Key::W, Action::Release);
        assert!(!input.is_key_pressed(Key::W, false));
    }

    #[test]
    fn test_repeat_does_not_rearm_consumed_key() {
        let mut input = InputState::new();
        input.handle_key(Key::A, Action::Press);
        assert!(input.is_key_pressed(Key::A, true));

        input.handle_key(Key::A, Action::Repeat);
        assert!(!input.is_key_pressed(Key::A, true));
    }

    #[test]
    fn test_never_pressed_codes() {
        let mut input = InputState::new();
        assert!(!input.is_key_pressed(Key::Escape, true));
        assert!(!input.is_button_pressed(MouseButton::Button1, false));
    }

    #[test]
    fn test_mouse_buttons_and_cursor() {
        let mut input = InputState::new();
        input.handle_mouse_button(MouseButton::Button2, Action::Press);
        input.handle_cursor_move(12.5, 40.0);

        assert!(input.is_button_pressed(MouseButton::Button2, false));
        assert!(input.is_button_pressed(MouseButton::Button2, true));
        assert!(!input.is_button_pressed(MouseButton::Button2, true));
        assert_eq!(input.cursor_position(), (12.5, 40.0));
    }
}
