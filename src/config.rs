//! Configuration constants and settings for the shot director
//!
//! Compile-time defaults live in the submodules below. The runtime
//! [`MonitorConfig`] starts from these defaults and can be overridden from a
//! JSON document.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::modes::AppMode;

/// Target frames per second for the frame loop
pub const TARGET_FPS: f64 = 60.0;

/// Log filter used when `RUST_LOG` is unset. Events are logged under the
/// `camera`, `director`, `modes` and `notify` targets as well as the crate path.
pub const DEFAULT_LOG_FILTER: &str = "shot_director=info,camera=info,director=info,modes=info,notify=warn";

/// Camera control settings
pub mod camera {
    /// Rotation speed multiplier for pointer drag
    pub const ROTATION_SPEED: f32 = 0.005;

    /// Zoom speed multiplier for scroll wheel
    pub const ZOOM_SPEED: f32 = 0.5;

    /// Minimum camera distance from the orbit pivot
    pub const MIN_DISTANCE: f32 = 2.0;

    /// Maximum camera distance from the orbit pivot
    pub const MAX_DISTANCE: f32 = 40.0;

    /// Distance bounds used while in Free mode
    pub const FREE_MIN_DISTANCE: f32 = 0.5;
    pub const FREE_MAX_DISTANCE: f32 = 200.0;

    /// Maximum pitch angle (radians) to prevent camera flipping
    pub const MAX_PITCH: f32 = 1.5;

    /// Minimum pitch angle (radians) to prevent camera flipping
    pub const MIN_PITCH: f32 = -1.5;

    /// Follow damping rate (per second)
    pub const MOVE_SPEED: f32 = 2.0;

    /// Follow offset: distance behind and height above the target
    pub const FOLLOW_DISTANCE: f32 = 6.0;
    pub const FOLLOW_HEIGHT: f32 = 3.0;

    /// Cinematic path progress per tick, clamped to this range
    pub const CINEMATIC_SPEED: f32 = 0.001;
    pub const CINEMATIC_SPEED_MIN: f32 = 0.0001;
    pub const CINEMATIC_SPEED_MAX: f32 = 0.01;

    /// How far ahead on the path the cinematic camera looks
    pub const CINEMATIC_LOOK_AHEAD: f32 = 0.01;

    /// Auto-rotate speed (radians per second)
    pub const AUTO_ROTATE_SPEED: f32 = 0.5;

    /// Canonical resting pose
    pub const HOME_POSITION: [f32; 3] = [0.0, 8.0, 16.0];
    pub const HOME_PIVOT: [f32; 3] = [0.0, 0.0, 0.0];

    /// Duration of the animated return to the home pose (ms)
    pub const HOME_ANIMATION_MS: f32 = 800.0;
}

/// Autonomous director settings
pub mod director {
    /// Shot duration bounds (seconds)
    pub const MIN_SHOT_DURATION: f64 = 5.0;
    pub const MAX_SHOT_DURATION: f64 = 12.0;

    /// Interval between planning passes (seconds)
    pub const PLANNING_INTERVAL: f64 = 2.0;

    /// Planning only tops the queue up to this many shots
    pub const MAX_QUEUED_SHOTS: usize = 3;

    /// Lifetime of one activity contribution (seconds)
    pub const DECAY_WINDOW: f64 = 10.0;

    /// Camera approach animation for a new shot (ms)
    pub const APPROACH_MS: f32 = 1500.0;

    /// Focus shot offset from the entity
    pub const FOCUS_DISTANCE: f32 = 6.0;
    pub const FOCUS_HEIGHT: f32 = 3.0;

    /// Wide shot orbit radius and height ranges
    pub const WIDE_RADIUS: (f32, f32) = (14.0, 22.0);
    pub const WIDE_HEIGHT: (f32, f32) = (6.0, 12.0);

    /// Auto-rotate speed while holding a wide shot
    pub const WIDE_ROTATE_SPEED: f32 = 0.15;

    /// Capacity of the rolling activity log
    pub const ACTIVITY_LOG_CAPACITY: usize = 50;
}

/// Mode lifecycle settings
pub mod modes {
    /// Preference key for the remembered application mode
    pub const PREFERRED_MODE_KEY: &str = "preferred_mode";

    /// Interval between diagnostics snapshots in Developer mode (seconds)
    pub const DIAGNOSTICS_INTERVAL: f64 = 1.0;

    /// Pan distance per key press in the interactive modes
    pub const KEY_PAN_STEP: f32 = 0.5;
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Tunable camera rig parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub min_distance: f32,
    pub max_distance: f32,
    pub move_speed: f32,
    pub follow_distance: f32,
    pub follow_height: f32,
    pub cinematic_speed: f32,
    pub auto_rotate_speed: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            min_distance: camera::MIN_DISTANCE,
            max_distance: camera::MAX_DISTANCE,
            move_speed: camera::MOVE_SPEED,
            follow_distance: camera::FOLLOW_DISTANCE,
            follow_height: camera::FOLLOW_HEIGHT,
            cinematic_speed: camera::CINEMATIC_SPEED,
            auto_rotate_speed: camera::AUTO_ROTATE_SPEED,
        }
    }
}

/// Tunable director parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectorSettings {
    pub min_shot_duration: f64,
    pub max_shot_duration: f64,
    pub planning_interval: f64,
    pub decay_window: f64,
    pub approach_ms: f32,
    pub focus_distance: f32,
    pub focus_height: f32,
}

impl Default for DirectorSettings {
    fn default() -> Self {
        Self {
            min_shot_duration: director::MIN_SHOT_DURATION,
            max_shot_duration: director::MAX_SHOT_DURATION,
            planning_interval: director::PLANNING_INTERVAL,
            decay_window: director::DECAY_WINDOW,
            approach_ms: director::APPROACH_MS,
            focus_distance: director::FOCUS_DISTANCE,
            focus_height: director::FOCUS_HEIGHT,
        }
    }
}

impl DirectorSettings {
    /// Spread between the shortest and longest shot
    pub fn variability(&self) -> f64 {
        (self.max_shot_duration - self.min_shot_duration).max(0.0)
    }
}

/// Runtime configuration for the whole monitor
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub camera: CameraSettings,
    pub director: DirectorSettings,
    /// Mode requested by the caller, e.g. from a launch parameter
    pub requested_mode: Option<String>,
    /// Mode used when no request is given, ahead of the saved preference
    pub default_mode: Option<AppMode>,
    /// JSON preference file; preferences stay in memory when absent
    pub preferences_path: Option<PathBuf>,
    /// Seed for shot randomness; entropy when absent
    pub seed: Option<u64>,
}

impl MonitorConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
