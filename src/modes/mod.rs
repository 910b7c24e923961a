//! Application mode lifecycle
//!
//! Exactly one [`AppMode`] is active at a time. Each mode is a
//! [`ModeBehavior`] unit registered with the [`ModeManager`], which owns the
//! ordered deactivate/activate transition between them.
//!
//! Lifecycle steps are cooperative: `activate` and `deactivate` are polled
//! once per frame until they return `Poll::Ready`, so a transition may span
//! several frames. No input or update reaches a mode while it is pending.

pub mod automatic;
pub mod input;
pub mod interactive;
pub mod manager;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::task::Poll;

use crate::camera::CameraRig;
use crate::director::Director;
use crate::notify::NotificationBus;
use crate::registry::EntityRegistry;

pub use automatic::AutomaticMode;
pub use input::{KeyInput, PointerInput};
pub use interactive::{DeveloperMode, InteractiveCamera, UserMode};
pub use manager::{ModeManager, RejectReason, SwitchOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppMode {
    Automatic,
    User,
    Developer,
}

impl AppMode {
    pub const ALL: [AppMode; 3] = [AppMode::Automatic, AppMode::User, AppMode::Developer];

    pub fn as_str(self) -> &'static str {
        match self {
            AppMode::Automatic => "automatic",
            AppMode::User => "user",
            AppMode::Developer => "developer",
        }
    }

    /// Accepts mode names (any case) and the shortcut digits
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        AppMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(value))
            .or_else(|| KeyInput::new(value).mode_shortcut())
    }
}

impl fmt::Display for AppMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a mode may touch while it is active
pub struct ModeContext<'a> {
    pub camera: &'a mut CameraRig,
    pub director: &'a mut Director,
    pub registry: &'a dyn EntityRegistry,
    pub bus: &'a NotificationBus,
    /// Seconds since the frame loop started
    pub now: f64,
}

/// Lifecycle contract of one application mode
pub trait ModeBehavior: Send + Sync {
    fn mode(&self) -> AppMode;

    /// Polled every frame until ready
    fn activate(&mut self, ctx: &mut ModeContext<'_>) -> Poll<()>;

    /// Polled every frame until ready; must release handlers and tasks
    fn deactivate(&mut self, ctx: &mut ModeContext<'_>) -> Poll<()>;

    fn update(&mut self, dt: f32, ctx: &mut ModeContext<'_>);

    fn on_key(&mut self, _key: &KeyInput, _ctx: &mut ModeContext<'_>) {}

    fn on_pointer(&mut self, _pointer: &PointerInput, _ctx: &mut ModeContext<'_>) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names_and_digits() {
        assert_eq!(AppMode::parse("Developer"), Some(AppMode::Developer));
        assert_eq!(AppMode::parse(" user "), Some(AppMode::User));
        assert_eq!(AppMode::parse("1"), Some(AppMode::Automatic));
        assert_eq!(AppMode::parse("cinema"), None);
    }
}
