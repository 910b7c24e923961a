//! Camera systems
//!
//! The rig is advanced once per frame, then its pose is written to the
//! `DirectedCamera` transform so the rendering side samples an up-to-date
//! pose.

use bevy::prelude::*;

use crate::camera::CameraRig;
use crate::ecs::components::DirectedCamera;
use crate::registry::AgentRegistry;

pub fn update_camera(time: Res<Time>, mut camera: ResMut<CameraRig>, registry: Res<AgentRegistry>) {
    camera.update(time.delta_secs(), &*registry);
}

/// Update camera transform from the rig pose
pub fn apply_camera_pose(camera: Res<CameraRig>, mut camera_query: Query<&mut Transform, With<DirectedCamera>>) {
    let pose = camera.transform();
    for mut transform in camera_query.iter_mut() {
        *transform = pose;
    }
}
