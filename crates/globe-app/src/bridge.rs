//! Turns control activations into layer toggles.

use globe_config::ControlConfig;
use globe_input::{ControlError, ControlId, ControlMap, KeyboardState};
use winit::keyboard::KeyCode;

use crate::AppContext;

pub struct InputBridge {
    controls: ControlMap,
}

impl InputBridge {
    pub fn new(controls: ControlMap) -> Self {
        Self { controls }
    }

    /// Resolve the key bindings; fails on the first control that cannot be
    /// bound.
    pub fn from_config(config: &ControlConfig) -> Result<Self, ControlError> {
        ControlMap::from_config(config).map(Self::new)
    }

    /// Toggle the control's layer once. Returns the layer's new attachment
    /// state.
    pub fn activate(&self, control: ControlId, ctx: &mut AppContext) -> bool {
        let layer = control.layer();
        let attached = ctx.scene.body.toggle(layer);
        tracing::info!(%control, %layer, attached, "Layer toggled");
        attached
    }

    /// Activate the control bound to `key`, if any.
    pub fn handle_key(&self, key: KeyCode, ctx: &mut AppContext) -> Option<bool> {
        let control = self.controls.control_for_key(key)?;
        Some(self.activate(control, ctx))
    }

    /// Dispatch every key pressed since the keyboard's last clear. Returns
    /// the number of controls activated.
    pub fn handle_keyboard(&self, keyboard: &KeyboardState, ctx: &mut AppContext) -> usize {
        keyboard
            .pressed_this_frame()
            .iter()
            .filter(|key| self.handle_key(**key, ctx).is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use globe_config::Config;
    use globe_input::RawKeyEvent;
    use globe_render::HeadlessRenderer;
    use globe_scene::{LayerKind, Scene};

    fn setup() -> (InputBridge, AppContext) {
        let mut config = Config::default();
        config.globe.detail = 1;
        config.starfield.count = 8;
        let bridge = InputBridge::from_config(&config.controls).unwrap();
        let ctx = AppContext::new(
            &config,
            Scene::from_config(&config),
            Box::new(HeadlessRenderer::new()),
        );
        (bridge, ctx)
    }

    #[test]
    fn test_each_control_toggles_exactly_its_layer() {
        for control in ControlId::ALL {
            let (bridge, mut ctx) = setup();
            assert!(!bridge.activate(control, &mut ctx));
            for kind in LayerKind::ALL {
                assert_eq!(
                    ctx.scene.body.is_attached(kind),
                    kind != control.layer(),
                    "{control} affected {kind}"
                );
            }
            assert!(ctx.scene.body.attachment_consistent());
        }
    }

    #[test]
    fn test_two_activations_restore_state() {
        let (bridge, mut ctx) = setup();
        bridge.activate(ControlId::Glow, &mut ctx);
        assert!(bridge.activate(ControlId::Glow, &mut ctx));
        assert_eq!(ctx.scene.body.attached_layers().count(), 4);
    }

    #[test]
    fn test_default_keys_map_to_controls() {
        let (bridge, mut ctx) = setup();
        assert_eq!(bridge.handle_key(KeyCode::Digit3, &mut ctx), Some(false));
        assert!(!ctx.scene.body.is_attached(LayerKind::Clouds));
        assert_eq!(bridge.handle_key(KeyCode::KeyQ, &mut ctx), None);
    }

    #[test]
    fn test_held_key_toggles_once() {
        let (bridge, mut ctx) = setup();
        let mut keyboard = KeyboardState::new();
        keyboard.process_raw(RawKeyEvent::press(KeyCode::Digit2));
        keyboard.process_raw(RawKeyEvent {
            repeat: true,
            ..RawKeyEvent::press(KeyCode::Digit2)
        });
        keyboard.process_raw(RawKeyEvent::press(KeyCode::KeyW));

        assert_eq!(bridge.handle_keyboard(&keyboard, &mut ctx), 1);
        assert!(!ctx.scene.body.is_attached(LayerKind::Lights));
    }

    #[test]
    fn test_unbound_control_is_rejected() {
        let mut config = Config::default();
        config.controls.bindings.remove("lights-btn");
        assert_eq!(
            InputBridge::from_config(&config.controls).err(),
            Some(ControlError::Unbound {
                control: ControlId::Lights
            })
        );
    }
}
