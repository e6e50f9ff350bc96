//! Layer toggle controls and their key bindings.
//!
//! Each control has a stable string id (`texture-btn`, `lights-btn`,
//! `clouds-btn`, `glow-btn`) and toggles exactly one globe layer. The config
//! binds control ids to key names; [`ControlMap::from_config`] resolves that
//! table once at startup and rejects anything it cannot resolve.

use std::collections::BTreeMap;

use globe_config::ControlConfig;
use globe_scene::LayerKind;
use winit::keyboard::KeyCode;

/// A UI control that toggles one layer.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum ControlId {
    Texture,
    Lights,
    Clouds,
    Glow,
}

impl ControlId {
    pub const ALL: [ControlId; 4] = [
        ControlId::Texture,
        ControlId::Lights,
        ControlId::Clouds,
        ControlId::Glow,
    ];

    /// Stable string id used in configuration.
    pub fn id(self) -> &'static str {
        match self {
            ControlId::Texture => "texture-btn",
            ControlId::Lights => "lights-btn",
            ControlId::Clouds => "clouds-btn",
            ControlId::Glow => "glow-btn",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|control| control.id() == id)
    }

    /// The layer this control toggles.
    pub fn layer(self) -> LayerKind {
        match self {
            ControlId::Texture => LayerKind::Surface,
            ControlId::Lights => LayerKind::Lights,
            ControlId::Clouds => LayerKind::Clouds,
            ControlId::Glow => LayerKind::Glow,
        }
    }
}

impl std::fmt::Display for ControlId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Binding table problems found at startup.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ControlError {
    #[error("control `{control}` has no key binding")]
    Unbound { control: ControlId },

    #[error("control `{control}` is bound to unknown key `{key}`")]
    UnknownKey { control: ControlId, key: String },

    #[error("binding names unknown control `{id}`")]
    UnknownControl { id: String },

    #[error("key {key:?} is bound to both `{first}` and `{second}`")]
    DuplicateKey {
        key: KeyCode,
        first: ControlId,
        second: ControlId,
    },
}

/// Resolved control → key bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlMap {
    bindings: BTreeMap<ControlId, KeyCode>,
}

impl ControlMap {
    /// Resolve the configured binding table.
    ///
    /// Every control must be bound, every key name must be known, no key may
    /// serve two controls, and no entry may name a control that does not
    /// exist.
    pub fn from_config(config: &ControlConfig) -> Result<Self, ControlError> {
        if let Some(id) = config
            .bindings
            .keys()
            .find(|id| ControlId::from_id(id).is_none())
        {
            return Err(ControlError::UnknownControl { id: id.clone() });
        }

        let mut bindings = BTreeMap::new();
        for control in ControlId::ALL {
            let name = config
                .bindings
                .get(control.id())
                .ok_or(ControlError::Unbound { control })?;
            let key = key_from_name(name.trim()).ok_or_else(|| ControlError::UnknownKey {
                control,
                key: name.clone(),
            })?;
            if let Some((&first, _)) = bindings.iter().find(|(_, bound)| **bound == key) {
                return Err(ControlError::DuplicateKey {
                    key,
                    first,
                    second: control,
                });
            }
            bindings.insert(control, key);
        }

        tracing::debug!(?bindings, "Resolved control bindings");
        Ok(Self { bindings })
    }

    pub fn key_for(&self, control: ControlId) -> Option<KeyCode> {
        self.bindings.get(&control).copied()
    }

    /// The control bound to `key`, if any.
    pub fn control_for_key(&self, key: KeyCode) -> Option<ControlId> {
        self.bindings
            .iter()
            .find(|(_, bound)| **bound == key)
            .map(|(control, _)| *control)
    }
}

/// Parse a key name as written in config. Names follow winit's `KeyCode`
/// variant names (`Digit1`, `KeyG`, `F2`, ...).
pub fn key_from_name(name: &str) -> Option<KeyCode> {
    Some(match name {
        "KeyA" => KeyCode::KeyA,
        "KeyB" => KeyCode::KeyB,
        "KeyC" => KeyCode::KeyC,
        "KeyD" => KeyCode::KeyD,
        "KeyE" => KeyCode::KeyE,
        "KeyF" => KeyCode::KeyF,
        "KeyG" => KeyCode::KeyG,
        "KeyH" => KeyCode::KeyH,
        "KeyI" => KeyCode::KeyI,
        "KeyJ" => KeyCode::KeyJ,
        "KeyK" => KeyCode::KeyK,
        "KeyL" => KeyCode::KeyL,
        "KeyM" => KeyCode::KeyM,
        "KeyN" => KeyCode::KeyN,
        "KeyO" => KeyCode::KeyO,
        "KeyP" => KeyCode::KeyP,
        "KeyQ" => KeyCode::KeyQ,
        "KeyR" => KeyCode::KeyR,
        "KeyS" => KeyCode::KeyS,
        "KeyT" => KeyCode::KeyT,
        "KeyU" => KeyCode::KeyU,
        "KeyV" => KeyCode::KeyV,
        "KeyW" => KeyCode::KeyW,
        "KeyX" => KeyCode::KeyX,
        "KeyY" => KeyCode::KeyY,
        "KeyZ" => KeyCode::KeyZ,
        "Digit0" => KeyCode::Digit0,
        "Digit1" => KeyCode::Digit1,
        "Digit2" => KeyCode::Digit2,
        "Digit3" => KeyCode::Digit3,
        "Digit4" => KeyCode::Digit4,
        "Digit5" => KeyCode::Digit5,
        "Digit6" => KeyCode::Digit6,
        "Digit7" => KeyCode::Digit7,
        "Digit8" => KeyCode::Digit8,
        "Digit9" => KeyCode::Digit9,
        "Numpad1" => KeyCode::Numpad1,
        "Numpad2" => KeyCode::Numpad2,
        "Numpad3" => KeyCode::Numpad3,
        "Numpad4" => KeyCode::Numpad4,
        "F1" => KeyCode::F1,
        "F2" => KeyCode::F2,
        "F3" => KeyCode::F3,
        "F4" => KeyCode::F4,
        "Space" => KeyCode::Space,
        "Enter" => KeyCode::Enter,
        "Tab" => KeyCode::Tab,
        "ArrowUp" => KeyCode::ArrowUp,
        "ArrowDown" => KeyCode::ArrowDown,
        "ArrowLeft" => KeyCode::ArrowLeft,
        "ArrowRight" => KeyCode::ArrowRight,
        _ => return None,
    })
}
