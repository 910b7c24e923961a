//! Entity registry collaborator
//!
//! The registry tracks which monitored agents exist and where they are. This
//! crate only reads it.

use bevy::math::Vec3;
use bevy::prelude::Resource;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a monitored agent
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for EntityId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Read-only query surface over the known entities
pub trait EntityRegistry {
    fn entity_position(&self, id: &EntityId) -> Option<Vec3>;

    /// Known identifiers in first-registered order
    fn entity_ids(&self) -> Vec<EntityId>;

    fn selected(&self) -> Option<EntityId>;

    fn contains(&self, id: &EntityId) -> bool {
        self.entity_position(id).is_some()
    }
}

/// Insertion-ordered in-memory registry, rebuilt from the scene each frame
#[derive(Debug, Clone, Default, Resource)]
pub struct AgentRegistry {
    positions: IndexMap<EntityId, Vec3>,
    selected: Option<EntityId>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or move an entity, keeping its original position in the order
    pub fn upsert(&mut self, id: EntityId, position: Vec3) {
        self.positions.insert(id, position);
    }

    /// Drop every entity not in `alive`
    pub fn retain_only(&mut self, alive: &[EntityId]) {
        self.positions.retain(|id, _| alive.contains(id));
        if let Some(selected) = &self.selected {
            if !self.positions.contains_key(selected) {
                self.selected = None;
            }
        }
    }

    pub fn select(&mut self, id: Option<EntityId>) {
        self.selected = id.filter(|id| self.positions.contains_key(id));
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl EntityRegistry for AgentRegistry {
    fn entity_position(&self, id: &EntityId) -> Option<Vec3> {
        self.positions.get(id).copied()
    }

    fn entity_ids(&self) -> Vec<EntityId> {
        self.positions.keys().cloned().collect()
    }

    fn selected(&self) -> Option<EntityId> {
        self.selected.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_first_registered_order_on_update() {
        let mut registry = AgentRegistry::new();
        registry.upsert("beta".into(), Vec3::X);
        registry.upsert("alpha".into(), Vec3::Y);
        registry.upsert("beta".into(), Vec3::Z);

        assert_eq!(registry.entity_ids(), vec![EntityId::from("beta"), EntityId::from("alpha")]);
        assert_eq!(registry.entity_position(&"beta".into()), Some(Vec3::Z));
    }

    #[test]
    fn selection_cleared_when_entity_disappears() {
        let mut registry = AgentRegistry::new();
        registry.upsert("alpha".into(), Vec3::ZERO);
        registry.select(Some("alpha".into()));
        assert_eq!(registry.selected(), Some("alpha".into()));

        registry.retain_only(&[]);
        assert!(registry.is_empty());
        assert_eq!(registry.selected(), None);
    }

    #[test]
    fn selecting_unknown_entity_is_ignored() {
        let mut registry = AgentRegistry::new();
        registry.select(Some("ghost".into()));
        assert_eq!(registry.selected(), None);
    }
}
