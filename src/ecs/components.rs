//! Bevy component definitions
//!
//! Markers and data used to tag entities in the frame loop's world.

use bevy::prelude::*;

use crate::registry::EntityId;

/// Marker for the camera entity whose `Transform` mirrors the camera rig
///
/// The rendering collaborator reads this transform every frame.
#[derive(Component)]
pub struct DirectedCamera;

/// A monitored agent placed in the scene
///
/// Its `Transform` translation is the position reported to the director and
/// the camera rig through the entity registry.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct MonitoredAgent(pub EntityId);

/// Marks the agent currently selected by the operator
#[derive(Component)]
pub struct Selected;
