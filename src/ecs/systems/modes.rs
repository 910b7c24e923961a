//! Mode lifecycle systems
//!
//! Input is routed before the mode update so a key press is seen by the
//! mode that is active when the frame starts.

use bevy::prelude::*;
use tracing::warn;

use crate::bridge::shared_state::InputEvent;
use crate::camera::CameraRig;
use crate::director::Director;
use crate::ecs::resources::{InitialMode, InputInbox};
use crate::modes::{ModeContext, ModeManager, SwitchOutcome};
use crate::notify::NotificationBus;
use crate::registry::AgentRegistry;

/// Resolve and enter the startup mode
pub fn initialize_mode(
    initial: Res<InitialMode>,
    time: Res<Time>,
    mut manager: ResMut<ModeManager>,
    mut camera: ResMut<CameraRig>,
    mut director: ResMut<Director>,
    registry: Res<AgentRegistry>,
    bus: Res<NotificationBus>,
) {
    let mut ctx = ModeContext {
        camera: &mut camera,
        director: &mut director,
        registry: &*registry,
        bus: &bus,
        now: time.elapsed_secs_f64(),
    };
    let outcome = manager.initialize(initial.requested.as_deref(), initial.default, &mut ctx);
    if let SwitchOutcome::Rejected(reason) = outcome {
        warn!(target: "modes", ?reason, "no initial mode entered");
    }
}

/// Forward queued key and pointer input through the mode manager
pub fn route_input(
    inbox: Option<Res<InputInbox>>,
    time: Res<Time>,
    mut manager: ResMut<ModeManager>,
    mut camera: ResMut<CameraRig>,
    mut director: ResMut<Director>,
    registry: Res<AgentRegistry>,
    bus: Res<NotificationBus>,
) {
    let Some(inbox) = inbox else {
        return;
    };
    if inbox.is_empty() {
        return;
    }
    let mut ctx = ModeContext {
        camera: &mut camera,
        director: &mut director,
        registry: &*registry,
        bus: &bus,
        now: time.elapsed_secs_f64(),
    };
    for event in inbox.try_iter() {
        match event {
            InputEvent::Key(key) => manager.handle_key(&key, &mut ctx),
            InputEvent::Pointer(pointer) => manager.handle_pointer(&pointer, &mut ctx),
        }
    }
}

/// Advance a pending transition or update the active mode
pub fn update_modes(
    time: Res<Time>,
    mut manager: ResMut<ModeManager>,
    mut camera: ResMut<CameraRig>,
    mut director: ResMut<Director>,
    registry: Res<AgentRegistry>,
    bus: Res<NotificationBus>,
) {
    let mut ctx = ModeContext {
        camera: &mut camera,
        director: &mut director,
        registry: &*registry,
        bus: &bus,
        now: time.elapsed_secs_f64(),
    };
    manager.update(time.delta_secs(), &mut ctx);
}
