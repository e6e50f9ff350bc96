//! Frame-coherent mouse state tracker.
//!
//! [`MouseState`] accumulates winit mouse events between redraws and exposes
//! the drag delta, button state and scroll amount the orbit controls consume.

use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta};

/// Pixels of a touchpad `PixelDelta` scroll treated as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Debug, Clone, Copy, Default)]
struct ButtonFrame {
    pressed: bool,
    just_pressed: bool,
    just_released: bool,
}

fn button_index(button: MouseButton) -> Option<usize> {
    match button {
        MouseButton::Left => Some(0),
        MouseButton::Right => Some(1),
        MouseButton::Middle => Some(2),
        _ => None,
    }
}

/// Frame-coherent mouse state.
///
/// Forward winit events through the `on_*` methods, read the accessors when
/// updating the camera, then call [`clear_transients`](Self::clear_transients).
#[derive(Debug, Clone, Default)]
pub struct MouseState {
    position: Option<Vec2>,
    delta: Vec2,
    buttons: [ButtonFrame; 3],
    scroll: f32,
    cursor_in_window: bool,
}

impl MouseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a `CursorMoved` event. The first position after the cursor
    /// enters produces no delta.
    pub fn on_cursor_moved(&mut self, x: f64, y: f64) {
        let new_pos = Vec2::new(x as f32, y as f32);
        if let Some(old) = self.position {
            self.delta += new_pos - old;
        }
        self.position = Some(new_pos);
    }

    pub fn on_button(&mut self, button: MouseButton, state: ElementState) {
        let Some(idx) = button_index(button) else {
            return;
        };
        let frame = &mut self.buttons[idx];
        match state {
            ElementState::Pressed => {
                frame.pressed = true;
                frame.just_pressed = true;
            }
            ElementState::Released => {
                frame.pressed = false;
                frame.just_released = true;
            }
        }
    }

    /// Process a `MouseWheel` event. Positive is away from the user.
    pub fn on_scroll(&mut self, delta: MouseScrollDelta) {
        match delta {
            MouseScrollDelta::LineDelta(_x, y) => self.scroll += y,
            MouseScrollDelta::PixelDelta(pos) => self.scroll += (pos.y / PIXELS_PER_LINE) as f32,
        }
    }

    pub fn on_cursor_entered(&mut self) {
        self.cursor_in_window = true;
    }

    /// Process a `CursorLeft` event. Held buttons are released, since the
    /// matching release may never arrive.
    pub fn on_cursor_left(&mut self) {
        self.cursor_in_window = false;
        self.position = None;
        for frame in &mut self.buttons {
            if frame.pressed {
                frame.pressed = false;
                frame.just_released = true;
            }
        }
    }

    /// Reset the per-frame delta, scroll and button edges.
    pub fn clear_transients(&mut self) {
        self.delta = Vec2::ZERO;
        self.scroll = 0.0;
        for frame in &mut self.buttons {
            frame.just_pressed = false;
            frame.just_released = false;
        }
    }

    /// Last known cursor position in physical pixels.
    #[must_use]
    pub fn position(&self) -> Option<Vec2> {
        self.position
    }

    /// Cursor movement since the last clear.
    #[must_use]
    pub fn delta(&self) -> Vec2 {
        self.delta
    }

    /// Cursor movement since the last clear while the left button was held.
    #[must_use]
    pub fn drag_delta(&self) -> Vec2 {
        if self.is_button_pressed(MouseButton::Left) {
            self.delta
        } else {
            Vec2::ZERO
        }
    }

    #[must_use]
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        button_index(button).is_some_and(|i| self.buttons[i].pressed)
    }

    #[must_use]
    pub fn just_button_pressed(&self, button: MouseButton) -> bool {
        button_index(button).is_some_and(|i| self.buttons[i].just_pressed)
    }

    #[must_use]
    pub fn just_button_released(&self, button: MouseButton) -> bool {
        button_index(button).is_some_and(|i| self.buttons[i].just_released)
    }

    /// Wheel lines scrolled since the last clear.
    #[must_use]
    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    #[must_use]
    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }
}
