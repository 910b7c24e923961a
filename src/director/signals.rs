//! Telemetry events consumed by the director
//!
//! Events arrive as JSON from the telemetry collaborator. Signal readings are
//! sanitized here so nothing downstream sees non-finite or out-of-range
//! values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::registry::EntityId;

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("malformed telemetry event: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Named event pushed by the telemetry collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// Generic activity by an agent (tool call, message, file write, ...)
    Activity { agent: EntityId },
    /// Auxiliary multi-signal input; values are expected on a 0-100 scale
    Signals {
        agent: EntityId,
        #[serde(default)]
        signals: Map<String, Value>,
    },
}

impl TelemetryEvent {
    pub fn from_json(line: &str) -> Result<Self, TelemetryError> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn agent(&self) -> &EntityId {
        match self {
            TelemetryEvent::Activity { agent } | TelemetryEvent::Signals { agent, .. } => agent,
        }
    }
}

/// Sanitized auxiliary signal set, each component in [0, 100]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SignalReading {
    pub attention: f64,
    pub engagement: f64,
    /// Counts against interest
    pub stress: f64,
    pub excitement: f64,
    pub fatigue: f64,
}

impl SignalReading {
    pub fn from_map(signals: &Map<String, Value>) -> Self {
        let read = |name: &str| sanitize(signals.get(name));
        Self {
            attention: read("attention"),
            engagement: read("engagement"),
            stress: read("stress"),
            excitement: read("excitement"),
            fatigue: read("fatigue"),
        }
    }

    /// Composite interest score; may be negative
    pub fn interest(&self) -> f64 {
        0.6 * self.attention + 0.25 * self.engagement + 0.25 * (100.0 - self.stress)
            + 0.1 * self.excitement
            - 0.2 * self.fatigue
    }

    /// Additive activity boost, never negative
    pub fn boost(&self) -> f64 {
        (self.interest() / 25.0).max(0.0)
    }
}

fn sanitize(value: Option<&Value>) -> f64 {
    value
        .and_then(Value::as_f64)
        .filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0))
        .unwrap_or(0.0)
}
