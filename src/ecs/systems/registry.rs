//! Entity registry synchronization

use bevy::prelude::*;

use crate::ecs::components::{MonitoredAgent, Selected};
use crate::registry::AgentRegistry;

/// Rebuild the registry from the agents currently in the world
pub fn sync_registry(
    agents: Query<(&MonitoredAgent, &Transform, Has<Selected>)>,
    mut registry: ResMut<AgentRegistry>,
) {
    let mut alive = Vec::new();
    let mut selected = None;
    for (agent, transform, is_selected) in agents.iter() {
        registry.upsert(agent.0.clone(), transform.translation);
        if is_selected && selected.is_none() {
            selected = Some(agent.0.clone());
        }
        alive.push(agent.0.clone());
    }
    registry.retain_only(&alive);
    registry.select(selected);
}
