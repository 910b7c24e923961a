//! Autonomous shot director
//!
//! - `signals`: telemetry events and auxiliary signal sanitizing
//! - `activity`: decaying per-entity activity scores and the activity log
//! - `shot`: shot definitions
//! - `engine`: planning and execution against the camera rig

pub mod activity;
pub mod engine;
pub mod shot;
pub mod signals;

pub use activity::{ActivityKind, ActivityRecord, ActivityTracker};
pub use engine::{Director, DirectorSnapshot};
pub use shot::{ActiveShot, Shot, ShotKind, ShotSummary};
pub use signals::{SignalReading, TelemetryError, TelemetryEvent};
