//! Bevy resource definitions
//!
//! Bridge endpoints wrapped as resources so frame-loop systems can drain and
//! publish them. The core state (camera rig, director, mode manager, entity
//! registry, notification bus) is inserted directly as resources.

use bevy::prelude::*;
use crossbeam_channel::Receiver;

use crate::bridge::shared_state::{AgentUpdate, InputEvent, SharedCameraPose, ShutdownFlag};
use crate::director::TelemetryEvent;
use crate::modes::AppMode;

// =============================================================================
// Inbound
// =============================================================================

#[derive(Resource, Deref)]
pub struct AgentInbox(pub Receiver<AgentUpdate>);

#[derive(Resource, Deref)]
pub struct TelemetryInbox(pub Receiver<TelemetryEvent>);

#[derive(Resource, Deref)]
pub struct InputInbox(pub Receiver<InputEvent>);

/// Startup mode resolution inputs, consumed once by the startup schedule
#[derive(Resource, Default)]
pub struct InitialMode {
    pub requested: Option<String>,
    pub default: Option<AppMode>,
}

// =============================================================================
// Outbound
// =============================================================================

/// Shared pose slot resource for the frame loop
#[derive(Resource, Clone)]
pub struct PoseOutbox(pub SharedCameraPose);

#[derive(Resource, Clone)]
pub struct ShutdownRes(pub ShutdownFlag);

/// Counter for frames published to the pose slot
#[derive(Resource, Default)]
pub struct PublishedFrames(pub u32);
