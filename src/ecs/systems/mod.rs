//! Frame-loop systems
//!
//! Per-frame order: agent updates, registry sync, telemetry, input, mode
//! update, camera update, transform write, pose publish.

pub mod camera;
pub mod modes;
pub mod publish;
pub mod registry;
pub mod scene;
pub mod telemetry;

pub use camera::{apply_camera_pose, update_camera};
pub use modes::{initialize_mode, route_input, update_modes};
pub use publish::{exit_on_shutdown, publish_pose};
pub use registry::sync_registry;
pub use scene::{apply_agent_updates, spawn_directed_camera};
pub use telemetry::ingest_telemetry;
