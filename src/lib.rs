//! Shot Director: camera state machine and autonomous directing for a
//! real-time 3D monitoring view
//!
//! The core computes camera poses and target decisions; rendering, overlays
//! and telemetry transport belong to the host.
//!
//! Architecture:
//! - The core runs inside a headless Bevy frame loop on a background thread
//! - Telemetry, agent positions and input arrive over channels
//! - The camera pose is published to a shared slot every frame
//! - Notifications go out on an injected publish/subscribe bus
//!
//! # Module Structure
//!
//! - `config`: Configuration constants and settings
//! - `notify`: Notification bus
//! - `registry`: Entity registry collaborator
//! - `prefs`: Preference store collaborator
//! - `camera`: Camera state machine
//!   - `easing`, `orbit`, `path`: motion primitives
//!   - `rig`: the behavior state machine
//! - `director`: Autonomous shot director
//! - `modes`: Application mode lifecycle
//! - `ecs`: Bevy engine integration
//!   - `components`, `resources`, `systems`, `plugins`, `app`
//! - `bridge`: Host shell adapter
//!   - `shared_state`: Thread-safe data structures
//!   - `commands`: Command handlers

pub mod bridge;
pub mod camera;
pub mod config;
pub mod director;
pub mod ecs;
pub mod modes;
pub mod notify;
pub mod prefs;
pub mod registry;

pub use bridge::{start_director, MonitorHandle};
pub use camera::{CameraMode, CameraRig};
pub use config::MonitorConfig;
pub use director::{Director, TelemetryEvent};
pub use modes::{AppMode, ModeManager, SwitchOutcome};
pub use notify::{Notification, NotificationBus, Topic};
