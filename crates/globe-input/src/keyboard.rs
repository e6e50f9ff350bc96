//! Frame-coherent keyboard state tracker.
//!
//! [`KeyboardState`] accumulates winit key events between redraws and reports
//! which physical keys are held and which went down since the last clear.
//! Control bindings are physical key codes, so `Digit1`..`Digit4` sit in the
//! same place on every layout.

use std::collections::HashSet;

use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Minimal description of a key event, decoupled from winit's `KeyEvent`
/// (which cannot be constructed outside winit).
#[derive(Debug, Clone, Copy)]
pub struct RawKeyEvent {
    pub key: PhysicalKey,
    pub state: ElementState,
    pub repeat: bool,
}

impl RawKeyEvent {
    /// A non-repeat press of `code`.
    pub fn press(code: KeyCode) -> Self {
        Self {
            key: PhysicalKey::Code(code),
            state: ElementState::Pressed,
            repeat: false,
        }
    }

    /// A release of `code`.
    pub fn release(code: KeyCode) -> Self {
        Self {
            key: PhysicalKey::Code(code),
            state: ElementState::Released,
            repeat: false,
        }
    }
}

/// Held keys plus the keys that went down or up since the last
/// [`clear_transients`](Self::clear_transients).
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<KeyCode>,
    just_pressed: Vec<KeyCode>,
    just_released: HashSet<KeyCode>,
}

impl KeyboardState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn process_event(&mut self, event: &KeyEvent) {
        self.process_raw(RawKeyEvent {
            key: event.physical_key,
            state: event.state,
            repeat: event.repeat,
        });
    }

    /// Apply one key event. Repeats and unidentified keys are ignored, so
    /// holding a key registers exactly one press.
    pub fn process_raw(&mut self, event: RawKeyEvent) {
        let PhysicalKey::Code(code) = event.key else {
            return;
        };
        if event.repeat {
            return;
        }
        match event.state {
            ElementState::Pressed => {
                // A second Pressed without a Released in between is a
                // platform quirk, not a new press.
                if self.pressed.insert(code) {
                    self.just_pressed.push(code);
                }
            }
            ElementState::Released => {
                self.pressed.remove(&code);
                self.just_released.insert(code);
            }
        }
    }

    #[must_use]
    pub fn is_pressed(&self, code: KeyCode) -> bool {
        self.pressed.contains(&code)
    }

    #[must_use]
    pub fn just_pressed(&self, code: KeyCode) -> bool {
        self.just_pressed.contains(&code)
    }

    #[must_use]
    pub fn just_released(&self, code: KeyCode) -> bool {
        self.just_released.contains(&code)
    }

    /// Keys pressed since the last clear, in the order they went down.
    pub fn pressed_this_frame(&self) -> &[KeyCode] {
        &self.just_pressed
    }

    /// Forget the per-frame press/release records. Call once per frame after
    /// the presses have been dispatched.
    pub fn clear_transients(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_no_keys_pressed() {
        let kb = KeyboardState::new();
        for code in [KeyCode::Digit1, KeyCode::Digit3, KeyCode::Escape] {
            assert!(!kb.is_pressed(code));
            assert!(!kb.just_pressed(code));
            assert!(!kb.just_released(code));
        }
        assert!(kb.pressed_this_frame().is_empty());
    }

    #[test]
    fn test_press_then_release() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::press(KeyCode::Digit2));
        assert!(kb.is_pressed(KeyCode::Digit2));
        assert!(kb.just_pressed(KeyCode::Digit2));

        kb.process_raw(RawKeyEvent::release(KeyCode::Digit2));
        assert!(!kb.is_pressed(KeyCode::Digit2));
        assert!(kb.just_released(KeyCode::Digit2));
    }

    #[test]
    fn test_just_pressed_true_for_one_frame_only() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::press(KeyCode::Digit1));
        kb.clear_transients();
        assert!(!kb.just_pressed(KeyCode::Digit1));
        assert!(kb.is_pressed(KeyCode::Digit1));
    }

    #[test]
    fn test_repeat_events_ignored() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::press(KeyCode::Digit4));
        kb.clear_transients();
        kb.process_raw(RawKeyEvent {
            repeat: true,
            ..RawKeyEvent::press(KeyCode::Digit4)
        });
        assert!(!kb.just_pressed(KeyCode::Digit4));
    }

    #[test]
    fn test_double_press_without_release_counts_once() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::press(KeyCode::Digit3));
        kb.process_raw(RawKeyEvent::press(KeyCode::Digit3));
        assert_eq!(kb.pressed_this_frame(), &[KeyCode::Digit3]);
    }

    #[test]
    fn test_two_presses_in_one_frame_keep_order() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent::press(KeyCode::Digit3));
        kb.process_raw(RawKeyEvent::release(KeyCode::Digit3));
        kb.process_raw(RawKeyEvent::press(KeyCode::Digit1));
        assert_eq!(
            kb.pressed_this_frame(),
            &[KeyCode::Digit3, KeyCode::Digit1]
        );
    }

    #[test]
    fn test_unidentified_key_ignored() {
        let mut kb = KeyboardState::new();
        kb.process_raw(RawKeyEvent {
            key: PhysicalKey::Unidentified(winit::keyboard::NativeKeyCode::Unidentified),
            state: ElementState::Pressed,
            repeat: false,
        });
        assert!(kb.pressed_this_frame().is_empty());
    }
}
