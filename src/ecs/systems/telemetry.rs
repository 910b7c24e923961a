//! Telemetry ingestion

use bevy::prelude::*;
use tracing::trace;

use crate::camera::CameraRig;
use crate::director::Director;
use crate::ecs::resources::TelemetryInbox;
use crate::registry::AgentRegistry;

/// Drain queued telemetry into the director
pub fn ingest_telemetry(
    inbox: Option<Res<TelemetryInbox>>,
    time: Res<Time>,
    mut director: ResMut<Director>,
    mut camera: ResMut<CameraRig>,
    registry: Res<AgentRegistry>,
) {
    let Some(inbox) = inbox else {
        return;
    };
    let now = time.elapsed_secs_f64();
    for event in inbox.try_iter() {
        trace!(target: "director", agent = %event.agent(), "telemetry received");
        director.ingest(&event, now, &mut camera, &*registry);
    }
}
