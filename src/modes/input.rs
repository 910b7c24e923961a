//! Key and pointer input routed through the mode manager

use serde::{Deserialize, Serialize};

use super::AppMode;

/// A key press, named the way the host shell reports it ("1", "w", "Space")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput {
    pub key: String,
}

impl KeyInput {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Case-insensitive match against a key name
    pub fn is(&self, name: &str) -> bool {
        self.key.eq_ignore_ascii_case(name)
    }

    pub fn is_space(&self) -> bool {
        self.key == " " || self.is("space")
    }

    /// Digit keys 1/2/3 select an application mode
    pub fn mode_shortcut(&self) -> Option<AppMode> {
        match self.key.as_str() {
            "1" => Some(AppMode::Automatic),
            "2" => Some(AppMode::User),
            "3" => Some(AppMode::Developer),
            _ => None,
        }
    }
}

/// Pointer state received from the host shell
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PointerInput {
    /// X movement delta since the last event
    pub delta_x: f32,
    /// Y movement delta since the last event
    pub delta_y: f32,
    /// Scroll wheel delta, positive zooms in
    pub scroll_delta: f32,
    /// Left button is pressed
    pub left_button: bool,
    /// Right button is pressed
    pub right_button: bool,
}

impl PointerInput {
    pub fn has_motion(&self) -> bool {
        self.delta_x != 0.0 || self.delta_y != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcuts_cover_the_three_modes() {
        assert_eq!(KeyInput::new("1").mode_shortcut(), Some(AppMode::Automatic));
        assert_eq!(KeyInput::new("2").mode_shortcut(), Some(AppMode::User));
        assert_eq!(KeyInput::new("3").mode_shortcut(), Some(AppMode::Developer));
        assert_eq!(KeyInput::new("4").mode_shortcut(), None);
    }

    #[test]
    fn key_names_ignore_case() {
        assert!(KeyInput::new("W").is("w"));
        assert!(KeyInput::new("Space").is_space());
        assert!(KeyInput::new(" ").is_space());
    }
}
