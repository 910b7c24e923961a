//! Outbound systems: pose publishing and shutdown

use bevy::{app::AppExit, prelude::*};
use tracing::{debug, info};

use crate::bridge::shared_state::CameraPoseSnapshot;
use crate::camera::CameraRig;
use crate::director::Director;
use crate::ecs::resources::{PoseOutbox, PublishedFrames, ShutdownRes};
use crate::modes::ModeManager;

/// Frames between pose debug lines
const POSE_LOG_INTERVAL: u32 = 300;

/// Publish the latest camera pose to the shared slot
pub fn publish_pose(
    outbox: Option<Res<PoseOutbox>>,
    time: Res<Time>,
    camera: Res<CameraRig>,
    director: Res<Director>,
    manager: Res<ModeManager>,
    mut frames: ResMut<PublishedFrames>,
) {
    frames.0 = frames.0.wrapping_add(1);
    let snapshot = CameraPoseSnapshot::capture(frames.0, time.elapsed_secs_f64(), &camera, &director, &manager);

    if frames.0 % POSE_LOG_INTERVAL == 0 {
        debug!(
            target: "camera",
            frame = frames.0,
            mode = ?snapshot.camera_mode,
            position = ?snapshot.position,
            target_entity = ?snapshot.target,
            "camera pose"
        );
    }

    if let Some(outbox) = outbox {
        outbox.0.store(snapshot);
    }
}

/// Exit the frame loop once the shell asks for it
pub fn exit_on_shutdown(shutdown: Option<Res<ShutdownRes>>, mut app_exit_writer: MessageWriter<AppExit>) {
    if shutdown.is_some_and(|flag| flag.0.is_requested()) {
        info!(target: "modes", "shutdown requested, leaving frame loop");
        app_exit_writer.write(AppExit::Success);
    }
}
