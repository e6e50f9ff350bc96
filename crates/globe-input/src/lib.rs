//! Input for the globe viewer: frame-coherent keyboard and mouse state, and
//! the layer toggle controls with their configurable key bindings.

pub mod controls;
pub mod keyboard;
pub mod mouse;

pub use controls::{ControlError, ControlId, ControlMap, key_from_name};
pub use keyboard::{KeyboardState, RawKeyEvent};
pub use mouse::MouseState;
