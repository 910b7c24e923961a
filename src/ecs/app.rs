//! Bevy application setup and execution
//!
//! The frame loop is a headless app: no window and no renderer, only the
//! scheduler, time and the monitor systems.

use bevy::{
    app::{App, ScheduleRunnerPlugin},
    prelude::*,
};
use std::thread;
use std::time::Duration;
use tracing::info;

use crate::bridge::shared_state::FrameLoopEndpoints;
use crate::camera::CameraRig;
use crate::config::{MonitorConfig, TARGET_FPS};
use crate::director::Director;
use crate::ecs::plugins::MonitorPlugin;
use crate::ecs::resources::*;
use crate::modes::ModeManager;
use crate::notify::NotificationBus;
use crate::prefs::PreferenceStore;

/// Create and configure the frame-loop application
///
/// `endpoints` is `None` when the app is driven directly (tests, embedding);
/// the inbound systems then have nothing to drain.
pub fn create_app(
    config: MonitorConfig,
    prefs: Box<dyn PreferenceStore>,
    bus: NotificationBus,
    endpoints: Option<FrameLoopEndpoints>,
) -> App {
    let mut app = App::new();

    // Scheduler, time and task pools, paced at the target frame rate
    app.add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
        1.0 / TARGET_FPS,
    ))));

    app.insert_resource(CameraRig::new(config.camera.clone(), bus.clone()));
    app.insert_resource(Director::new(config.director.clone(), config.seed, bus.clone()));
    app.insert_resource(ModeManager::with_standard_modes(prefs, bus.clone()));
    app.insert_resource(InitialMode {
        requested: config.requested_mode.clone(),
        default: config.default_mode,
    });
    app.insert_resource(bus);

    if let Some(endpoints) = endpoints {
        app.insert_resource(AgentInbox(endpoints.agents));
        app.insert_resource(TelemetryInbox(endpoints.telemetry));
        app.insert_resource(InputInbox(endpoints.input));
        app.insert_resource(PoseOutbox(endpoints.pose));
        app.insert_resource(ShutdownRes(endpoints.shutdown));
    }

    app.add_plugins(MonitorPlugin);

    info!(target: "modes", fps = TARGET_FPS, "frame loop configured");
    app
}

/// Run the frame loop on a background thread
pub fn start_frame_loop(
    config: MonitorConfig,
    prefs: Box<dyn PreferenceStore>,
    bus: NotificationBus,
    endpoints: FrameLoopEndpoints,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        info!(target: "modes", "frame loop thread started");
        let mut app = create_app(config, prefs, bus, Some(endpoints));
        app.run();
        info!(target: "modes", "frame loop stopped");
    })
}
