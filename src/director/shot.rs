//! Shots: timed camera directives issued by the director

use bevy::math::Vec3;
use serde::Serialize;

use crate::registry::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotKind {
    /// Approach an entity, then track it
    Focus,
    /// Wide orbit around the origin with slow auto-rotation
    Overview,
    /// Fly a closed path through the scene
    Cinematic,
}

impl ShotKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ShotKind::Focus => "focus",
            ShotKind::Overview => "overview",
            ShotKind::Cinematic => "cinematic",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Shot {
    pub kind: ShotKind,
    pub target: Option<EntityId>,
    /// Seconds
    pub duration: f64,
    /// Explicit camera position, overriding the computed one
    pub position: Option<Vec3>,
    /// Explicit look-at point, overriding the computed one
    pub look_at: Option<Vec3>,
    /// Control points for cinematic shots
    pub path: Vec<Vec3>,
}

impl Shot {
    pub fn focus(target: EntityId, duration: f64) -> Self {
        Self {
            kind: ShotKind::Focus,
            target: Some(target),
            duration,
            position: None,
            look_at: None,
            path: Vec::new(),
        }
    }

    pub fn overview(duration: f64) -> Self {
        Self {
            kind: ShotKind::Overview,
            target: None,
            duration,
            position: None,
            look_at: None,
            path: Vec::new(),
        }
    }

    /// An empty `path` flies through the known entity positions instead
    pub fn cinematic(path: Vec<Vec3>, duration: f64) -> Self {
        Self {
            kind: ShotKind::Cinematic,
            target: None,
            duration,
            position: None,
            look_at: None,
            path,
        }
    }

    pub fn with_pose(mut self, position: Vec3, look_at: Option<Vec3>) -> Self {
        self.position = Some(position);
        self.look_at = look_at;
        self
    }
}

/// What the camera does once the approach animation has landed
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Settle {
    /// `landed` is false when the approach move was refused by a busy camera
    Follow { target: EntityId, landed: bool },
    AutoRotate,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ShotPhase {
    Approaching(Settle),
    Holding,
}

/// The shot currently on screen
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveShot {
    pub shot: Shot,
    pub started_at: f64,
    pub(crate) phase: ShotPhase,
    /// Filler shot that fresh activity may cut short
    pub(crate) interruptible: bool,
}

impl ActiveShot {
    /// Strictly past its duration
    pub fn is_expired(&self, now: f64) -> bool {
        now - self.started_at > self.shot.duration
    }
}

/// Serializable view of a shot for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShotSummary {
    pub kind: ShotKind,
    pub target: Option<EntityId>,
    pub duration: f64,
    pub elapsed: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expiry_is_strict() {
        let active = ActiveShot {
            shot: Shot::overview(5.0),
            started_at: 10.0,
            phase: ShotPhase::Holding,
            interruptible: false,
        };
        assert!(!active.is_expired(15.0));
        assert!(active.is_expired(15.01));
    }
}
