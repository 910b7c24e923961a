//! Shared state structures for communication between the host shell and the
//! frame loop
//!
//! Inbound traffic (agent positions, telemetry, input) travels over crossbeam
//! channels drained once per frame. Outbound, the frame loop publishes the
//! latest camera pose into a mutex-guarded slot the shell can poll.

use crossbeam_channel::{Receiver, Sender};
use serde::{Deserialize, Serialize};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};

use crate::camera::{CameraMode, CameraRig};
use crate::director::{Director, ShotSummary, TelemetryEvent};
use crate::modes::{AppMode, KeyInput, ModeManager, PointerInput};
use crate::registry::EntityId;

// =============================================================================
// Scene updates
// =============================================================================

/// Agent presence reported by the entity registry collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentUpdate {
    /// Spawn the agent or move it to `position`
    Position { agent: EntityId, position: [f32; 3] },
    Despawn { agent: EntityId },
    /// Operator selection; `None` clears it
    Select { agent: Option<EntityId> },
}

/// One line of host input: either a scene update or a telemetry event
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InboundLine {
    Agent(AgentUpdate),
    Telemetry(TelemetryEvent),
}

// =============================================================================
// Input
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key(KeyInput),
    Pointer(PointerInput),
}

// =============================================================================
// Camera Pose
// =============================================================================

/// What the rendering side needs from one frame
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CameraPoseSnapshot {
    pub frame: u32,
    pub camera_mode: CameraMode,
    pub position: [f32; 3],
    pub look_at: Option<[f32; 3]>,
    pub target: Option<EntityId>,
    pub app_mode: Option<AppMode>,
    pub transitioning: bool,
    pub shot: Option<ShotSummary>,
}

impl CameraPoseSnapshot {
    pub fn capture(frame: u32, now: f64, camera: &CameraRig, director: &Director, modes: &ModeManager) -> Self {
        Self {
            frame,
            camera_mode: camera.mode(),
            position: camera.position().to_array(),
            look_at: camera.look_at().map(|v| v.to_array()),
            target: camera.target().cloned(),
            app_mode: modes.current(),
            transitioning: modes.is_transitioning(),
            shot: director.snapshot(now).current,
        }
    }
}

/// Latest published camera pose, `None` until the first frame ran
#[derive(Clone, Default)]
pub struct SharedCameraPose(pub Arc<Mutex<Option<CameraPoseSnapshot>>>);

impl SharedCameraPose {
    pub fn latest(&self) -> Option<CameraPoseSnapshot> {
        self.0.lock().ok().and_then(|guard| guard.clone())
    }

    pub fn store(&self, snapshot: CameraPoseSnapshot) {
        if let Ok(mut guard) = self.0.lock() {
            *guard = Some(snapshot);
        }
    }
}

/// Set by the shell to stop the frame loop
#[derive(Clone, Default)]
pub struct ShutdownFlag(pub Arc<AtomicBool>);

impl ShutdownFlag {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Channel endpoints
// =============================================================================

/// Frame-loop side of the bridge
pub struct FrameLoopEndpoints {
    pub agents: Receiver<AgentUpdate>,
    pub telemetry: Receiver<TelemetryEvent>,
    pub input: Receiver<InputEvent>,
    pub pose: SharedCameraPose,
    pub shutdown: ShutdownFlag,
}

/// Shell side of the bridge
#[derive(Clone)]
pub struct ShellEndpoints {
    pub agents: Sender<AgentUpdate>,
    pub telemetry: Sender<TelemetryEvent>,
    pub input: Sender<InputEvent>,
    pub pose: SharedCameraPose,
    pub shutdown: ShutdownFlag,
}

/// Create both ends of the bridge
pub fn bridge_channels() -> (ShellEndpoints, FrameLoopEndpoints) {
    let (agents_tx, agents_rx) = crossbeam_channel::unbounded();
    let (telemetry_tx, telemetry_rx) = crossbeam_channel::unbounded();
    let (input_tx, input_rx) = crossbeam_channel::unbounded();
    let pose = SharedCameraPose::default();
    let shutdown = ShutdownFlag::default();
    (
        ShellEndpoints {
            agents: agents_tx,
            telemetry: telemetry_tx,
            input: input_tx,
            pose: pose.clone(),
            shutdown: shutdown.clone(),
        },
        FrameLoopEndpoints {
            agents: agents_rx,
            telemetry: telemetry_rx,
            input: input_rx,
            pose,
            shutdown,
        },
    )
}
