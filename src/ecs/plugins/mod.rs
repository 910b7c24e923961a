//! Bevy plugins
//!
//! [`MonitorPlugin`] schedules the frame-loop systems. The core resources are
//! inserted by [`crate::ecs::app::create_app`] before the plugin runs.

use bevy::prelude::*;

use crate::ecs::resources::{InitialMode, PublishedFrames};
use crate::ecs::systems::*;
use crate::registry::AgentRegistry;

pub struct MonitorPlugin;

impl Plugin for MonitorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AgentRegistry>()
            .init_resource::<InitialMode>()
            .init_resource::<PublishedFrames>()
            .add_systems(Startup, (spawn_directed_camera, initialize_mode).chain())
            .add_systems(
                Update,
                (
                    apply_agent_updates,
                    sync_registry,
                    ingest_telemetry,
                    route_input,
                    update_modes,
                    update_camera,
                    apply_camera_pose,
                    publish_pose,
                )
                    .chain(),
            )
            .add_systems(Last, exit_on_shutdown);
    }
}
