//! Bevy engine integration
//!
//! Hosts the camera rig, director and mode manager inside a headless frame
//! loop: components, resources, systems, the plugin and application setup.

pub mod app;
pub mod components;
pub mod plugins;
pub mod resources;
pub mod systems;

pub use app::{create_app, start_frame_loop};
pub use components::{DirectedCamera, MonitoredAgent, Selected};
pub use plugins::MonitorPlugin;
