//! Command handlers
//!
//! Entry points a host shell invokes. Each returns `Result<_, String>` so it
//! can be forwarded to a frontend unchanged.

use super::shared_state::{AgentUpdate, CameraPoseSnapshot, InboundLine, InputEvent};
use super::MonitorHandle;
use crate::director::TelemetryEvent;
use crate::modes::{KeyInput, PointerInput};
use crate::notify::Notification;

const DISCONNECTED: &str = "frame loop is not running";

/// Queue one telemetry event given as a JSON line
pub fn push_telemetry(handle: &MonitorHandle, line: &str) -> Result<(), String> {
    let event = TelemetryEvent::from_json(line).map_err(|e| e.to_string())?;
    handle.endpoints.telemetry.send(event).map_err(|_| DISCONNECTED.to_string())
}

/// Queue a spawn, move or despawn of a monitored agent
pub fn push_agent_update(handle: &MonitorHandle, update: AgentUpdate) -> Result<(), String> {
    handle.endpoints.agents.send(update).map_err(|_| DISCONNECTED.to_string())
}

/// Route one JSON line to the scene or the director
pub fn push_line(handle: &MonitorHandle, line: &str) -> Result<(), String> {
    match serde_json::from_str::<InboundLine>(line).map_err(|e| e.to_string())? {
        InboundLine::Agent(update) => push_agent_update(handle, update),
        InboundLine::Telemetry(event) => handle
            .endpoints
            .telemetry
            .send(event)
            .map_err(|_| DISCONNECTED.to_string()),
    }
}

pub fn send_key(handle: &MonitorHandle, key: &str) -> Result<(), String> {
    handle
        .endpoints
        .input
        .send(InputEvent::Key(KeyInput::new(key)))
        .map_err(|_| DISCONNECTED.to_string())
}

/// Receive pointer input from the shell for camera control
pub fn send_pointer(
    handle: &MonitorHandle,
    delta_x: f32,
    delta_y: f32,
    scroll_delta: f32,
    left_button: bool,
    right_button: bool,
) -> Result<(), String> {
    let pointer = PointerInput {
        delta_x,
        delta_y,
        scroll_delta,
        left_button,
        right_button,
    };
    handle
        .endpoints
        .input
        .send(InputEvent::Pointer(pointer))
        .map_err(|_| DISCONNECTED.to_string())
}

/// Latest camera pose published by the frame loop
pub fn get_camera_pose(handle: &MonitorHandle) -> Result<CameraPoseSnapshot, String> {
    handle
        .endpoints
        .pose
        .latest()
        .ok_or_else(|| "No pose yet (frame loop still starting)".into())
}

/// Notifications emitted since the last call, oldest first
pub fn drain_notifications(handle: &MonitorHandle) -> Result<Vec<Notification>, String> {
    Ok(handle.notifications.try_iter().collect())
}
