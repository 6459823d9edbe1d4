//! Key-state snapshot handed to the simulation each frame.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Keys currently held, keyed by lowercase identifier (`"a"`, `" "`, ...).
#[derive(Clone, Debug, Default)]
pub struct KeyState {
    held: HashSet<String>,
}

impl KeyState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: &str) {
        self.held.insert(key.to_lowercase());
    }

    pub fn is_held(&self, key: &str) -> bool {
        self.held.contains(&key.to_lowercase())
    }
}

impl<'a> FromIterator<&'a str> for KeyState {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut keys = KeyState::new();
        for key in iter {
            keys.press(key);
        }
        keys
    }
}

/// Which key identifier drives each action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub up: String,
    pub down: String,
    pub left: String,
    pub right: String,
    pub shoot: String,
    pub shield: String,
    pub dash: String,
    pub pause: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: "w".into(),
            down: "s".into(),
            left: "a".into(),
            right: "d".into(),
            shoot: " ".into(),
            shield: "q".into(),
            dash: "e".into(),
            pause: "p".into(),
        }
    }
}

/// The actions held during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub shoot: bool,
    pub shield: bool,
    pub dash: bool,
}

impl Controls {
    pub fn capture(keys: &KeyState, bindings: &KeyBindings) -> Self {
        Controls {
            up: keys.is_held(&bindings.up),
            down: keys.is_held(&bindings.down),
            left: keys.is_held(&bindings.left),
            right: keys.is_held(&bindings.right),
            shoot: keys.is_held(&bindings.shoot),
            shield: keys.is_held(&bindings.shield),
            dash: keys.is_held(&bindings.dash),
        }
    }
}
