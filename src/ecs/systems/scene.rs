//! Scene setup and agent presence
//!
//! Agents reported by the host are mirrored as `MonitoredAgent` entities.

use bevy::prelude::*;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::bridge::shared_state::AgentUpdate;
use crate::camera::CameraRig;
use crate::ecs::components::{DirectedCamera, MonitoredAgent, Selected};
use crate::ecs::resources::AgentInbox;
use crate::registry::EntityId;

/// Spawn the camera entity driven by the camera rig
pub fn spawn_directed_camera(mut commands: Commands, camera: Res<CameraRig>) {
    commands.spawn((Name::new("directed-camera"), camera.transform(), DirectedCamera));
    info!(target: "camera", "directed camera spawned");
}

/// Apply queued spawn, move, despawn and selection requests
pub fn apply_agent_updates(
    mut commands: Commands,
    inbox: Option<Res<AgentInbox>>,
    mut agents: Query<(Entity, &MonitoredAgent, &mut Transform)>,
    selected: Query<Entity, With<Selected>>,
) {
    let Some(inbox) = inbox else {
        return;
    };
    if inbox.is_empty() {
        return;
    }

    // Spawns are deferred, so track them here for later updates in the batch
    let mut index: HashMap<EntityId, Entity> = agents
        .iter()
        .map(|(entity, agent, _)| (agent.0.clone(), entity))
        .collect();
    let mut chosen: Option<Entity> = None;

    for update in inbox.try_iter() {
        match update {
            AgentUpdate::Position { agent, position } => {
                let translation = Vec3::from_array(position);
                match index.get(&agent) {
                    Some(&entity) => match agents.get_mut(entity) {
                        Ok((_, _, mut transform)) => transform.translation = translation,
                        Err(_) => {
                            commands.entity(entity).insert(Transform::from_translation(translation));
                        }
                    },
                    None => {
                        debug!(target: "camera", %agent, "agent spawned");
                        let entity = commands
                            .spawn((
                                Name::new(agent.to_string()),
                                MonitoredAgent(agent.clone()),
                                Transform::from_translation(translation),
                            ))
                            .id();
                        index.insert(agent, entity);
                    }
                }
            }
            AgentUpdate::Despawn { agent } => {
                if let Some(entity) = index.remove(&agent) {
                    debug!(target: "camera", %agent, "agent despawned");
                    commands.entity(entity).despawn();
                }
            }
            AgentUpdate::Select { agent } => {
                for entity in selected.iter().chain(chosen.take()) {
                    commands.entity(entity).try_remove::<Selected>();
                }
                chosen = agent.and_then(|agent| index.get(&agent).copied());
                if let Some(entity) = chosen {
                    commands.entity(entity).insert(Selected);
                }
            }
        }
    }
}
