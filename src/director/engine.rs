//! Autonomous director
//!
//! Scores entity activity from telemetry, plans a short queue of shots and
//! executes them against the [`CameraRig`]. Everything is driven by `tick`,
//! called once per frame; there are no free-running timers.

use bevy::math::Vec3;
use bevy::prelude::Resource;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::collections::VecDeque;
use std::f32::consts::TAU;
use tracing::{debug, info};

use super::activity::{ActivityKind, ActivityRecord, ActivityTracker};
use super::shot::{ActiveShot, Settle, Shot, ShotKind, ShotPhase, ShotSummary};
use super::signals::{SignalReading, TelemetryEvent};
use crate::camera::{CameraMode, CameraRig};
use crate::config::director::*;
use crate::config::DirectorSettings;
use crate::notify::{Notification, NotificationBus};
use crate::registry::{EntityId, EntityRegistry};

/// Diagnostics view of the director state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirectorSnapshot {
    pub running: bool,
    pub queued: usize,
    pub current: Option<ShotSummary>,
    pub top_scores: Vec<(EntityId, f64)>,
    pub recent_activity: Vec<ActivityRecord>,
}

#[derive(Resource)]
pub struct Director {
    settings: DirectorSettings,
    queue: VecDeque<Shot>,
    current: Option<ActiveShot>,
    activity: ActivityTracker,
    running: bool,
    /// Next planning pass; `None` while stopped
    next_plan_at: Option<f64>,
    advance_requested: bool,
    rng: StdRng,
    bus: NotificationBus,
}

impl Director {
    pub fn new(settings: DirectorSettings, seed: Option<u64>, bus: NotificationBus) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            activity: ActivityTracker::new(settings.decay_window, ACTIVITY_LOG_CAPACITY),
            settings,
            queue: VecDeque::new(),
            current: None,
            running: false,
            next_plan_at: None,
            advance_requested: false,
            rng,
            bus,
        }
    }

    pub fn settings(&self) -> &DirectorSettings {
        &self.settings
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn queue(&self) -> &VecDeque<Shot> {
        &self.queue
    }

    pub fn current_shot(&self) -> Option<&ActiveShot> {
        self.current.as_ref()
    }

    pub fn score(&self, agent: &EntityId) -> f64 {
        self.activity.score(agent)
    }

    pub fn activity(&self) -> &ActivityTracker {
        &self.activity
    }

    /// Begin directing: schedules the planning task
    pub fn start(&mut self, now: f64) {
        if self.running {
            return;
        }
        self.running = true;
        self.next_plan_at = Some(now + self.settings.planning_interval);
        info!(target: "director", "director started");
    }

    /// Stop directing and cancel every scheduled task
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.next_plan_at = None;
        self.advance_requested = false;
        self.queue.clear();
        self.current = None;
        self.activity.clear_scores();
        info!(target: "director", "director stopped");
    }

    /// End the current shot on the next tick
    pub fn force_advance(&mut self) {
        if self.running {
            self.advance_requested = true;
        }
    }

    pub fn enqueue(&mut self, shot: Shot) {
        debug!(target: "director", kind = shot.kind.as_str(), target = ?shot.target, "shot queued");
        self.queue.push_back(shot);
    }

    /// Feed one telemetry event. While stopped the event is only logged.
    pub fn ingest(
        &mut self,
        event: &TelemetryEvent,
        now: f64,
        camera: &mut CameraRig,
        registry: &dyn EntityRegistry,
    ) {
        let agent = event.agent().clone();
        let kind = match event {
            TelemetryEvent::Activity { .. } => {
                if self.running {
                    self.activity.contribute(&agent, 1.0, now);
                }
                ActivityKind::Activity
            }
            TelemetryEvent::Signals { signals, .. } => {
                let boost = SignalReading::from_map(signals).boost();
                if self.running {
                    self.activity.contribute(&agent, boost, now);
                }
                ActivityKind::Signals { boost }
            }
        };
        self.activity.record(ActivityRecord {
            agent: agent.clone(),
            kind,
            at: now,
        });

        if self.running {
            self.pivot_if_idle(agent, now, camera, registry);
        }
    }

    /// Top up the queue with a focus shot on the most active entity, else the
    /// operator's selection, else the first known entity.
    /// Returns true if a shot was queued.
    pub fn plan_next_shot(&mut self, registry: &dyn EntityRegistry) -> bool {
        if self.queue.len() >= MAX_QUEUED_SHOTS {
            return false;
        }
        let target = self
            .activity
            .best()
            .cloned()
            .or_else(|| registry.selected())
            .or_else(|| registry.entity_ids().into_iter().next());
        let Some(target) = target else {
            return false;
        };
        let duration = self.random_duration();
        self.enqueue(Shot::focus(target, duration));
        true
    }

    /// Per-frame step: decays, planning, shot timing
    pub fn tick(&mut self, now: f64, camera: &mut CameraRig, registry: &dyn EntityRegistry) {
        self.activity.process_decays(now);
        if !self.running {
            return;
        }

        if self.next_plan_at.is_some_and(|at| now >= at) {
            self.plan_next_shot(registry);
            self.next_plan_at = Some(now + self.settings.planning_interval);
        }

        let swap = match &self.current {
            None => true,
            Some(active) => self.advance_requested || active.is_expired(now),
        };
        if swap {
            self.next_shot(now, camera, registry);
        } else {
            self.settle_current(camera, registry);
        }
    }

    pub fn snapshot(&self, now: f64) -> DirectorSnapshot {
        DirectorSnapshot {
            running: self.running,
            queued: self.queue.len(),
            current: self.current.as_ref().map(|active| ShotSummary {
                kind: active.shot.kind,
                target: active.shot.target.clone(),
                duration: active.shot.duration,
                elapsed: (now - active.started_at).max(0.0),
            }),
            top_scores: self.activity.top(5),
            recent_activity: self.activity.log().rev().take(10).cloned().collect(),
        }
    }

    fn pivot_if_idle(
        &mut self,
        agent: EntityId,
        now: f64,
        camera: &mut CameraRig,
        registry: &dyn EntityRegistry,
    ) {
        let targeted_pending = self.queue.iter().any(|s| s.target.is_some());
        let idle = self.current.as_ref().map_or(true, |active| active.interruptible);
        if !idle || targeted_pending {
            return;
        }
        debug!(target: "director", %agent, "pivoting to active entity");
        let duration = self.random_duration();
        self.enqueue(Shot::focus(agent, duration));
        self.next_shot(now, camera, registry);
    }

    fn next_shot(&mut self, now: f64, camera: &mut CameraRig, registry: &dyn EntityRegistry) {
        self.advance_requested = false;
        let (shot, interruptible) = match self.queue.pop_front() {
            Some(shot) => (shot, false),
            None => (Shot::overview(self.random_duration()), true),
        };
        self.execute(shot, interruptible, now, camera, registry);
    }

    fn execute(
        &mut self,
        shot: Shot,
        interruptible: bool,
        now: f64,
        camera: &mut CameraRig,
        registry: &dyn EntityRegistry,
    ) {
        let (shot, interruptible) = match shot.kind {
            ShotKind::Focus => {
                let located = shot
                    .target
                    .as_ref()
                    .and_then(|target| registry.entity_position(target).map(|p| (target.clone(), p)));
                match located {
                    Some((target, entity_position)) => {
                        let phase = self.start_focus(&shot, target, entity_position, camera);
                        return self.begin(shot, phase, interruptible, now);
                    }
                    None => {
                        debug!(target: "director", target = ?shot.target, "focus target gone, using wide shot");
                        let wide = Shot {
                            kind: ShotKind::Overview,
                            target: None,
                            ..shot
                        };
                        (wide, true)
                    }
                }
            }
            _ => (shot, interruptible),
        };

        let phase = match shot.kind {
            ShotKind::Cinematic => self.start_cinematic(&shot, camera, registry),
            _ => self.start_overview(&shot, camera),
        };
        self.begin(shot, phase, interruptible, now);
    }

    fn start_focus(
        &mut self,
        shot: &Shot,
        target: EntityId,
        entity_position: Vec3,
        camera: &mut CameraRig,
    ) -> ShotPhase {
        let look_at = shot.look_at.unwrap_or(entity_position);
        let position = shot.position.unwrap_or_else(|| {
            let azimuth = self.rng.gen::<f32>() * TAU;
            entity_position
                + Vec3::new(
                    azimuth.cos() * self.settings.focus_distance,
                    self.settings.focus_height,
                    azimuth.sin() * self.settings.focus_distance,
                )
        });
        // A busy camera keeps its current move; tracking starts once it lands
        let landed = camera.animate_to(position, Some(look_at), self.settings.approach_ms);
        ShotPhase::Approaching(Settle::Follow { target, landed })
    }

    fn start_overview(&mut self, shot: &Shot, camera: &mut CameraRig) -> ShotPhase {
        let position = shot.position.unwrap_or_else(|| {
            let azimuth = self.rng.gen::<f32>() * TAU;
            let radius = self.rng.gen_range(WIDE_RADIUS.0..WIDE_RADIUS.1);
            let height = self.rng.gen_range(WIDE_HEIGHT.0..WIDE_HEIGHT.1);
            Vec3::new(azimuth.cos() * radius, height, azimuth.sin() * radius)
        });
        camera.set_mode(CameraMode::Orbit);
        camera.set_target(None);
        camera.set_auto_rotate(false, None);
        camera.animate_to(position, Some(shot.look_at.unwrap_or(Vec3::ZERO)), self.settings.approach_ms);
        ShotPhase::Approaching(Settle::AutoRotate)
    }

    fn start_cinematic(
        &mut self,
        shot: &Shot,
        camera: &mut CameraRig,
        registry: &dyn EntityRegistry,
    ) -> ShotPhase {
        let points = if shot.path.len() >= 2 {
            shot.path.clone()
        } else {
            cinematic_route(registry)
        };
        camera.set_mode(CameraMode::Cinematic);
        camera.set_cinematic_path(points);
        ShotPhase::Holding
    }

    fn begin(&mut self, shot: Shot, phase: ShotPhase, interruptible: bool, now: f64) {
        info!(
            target: "director",
            kind = shot.kind.as_str(),
            target = ?shot.target,
            duration = shot.duration,
            "shot started"
        );
        self.bus.publish(Notification::ShotStarted {
            kind: shot.kind.as_str().to_owned(),
            target: shot.target.clone(),
            duration: shot.duration,
        });
        self.current = Some(ActiveShot {
            shot,
            started_at: now,
            phase,
            interruptible,
        });
    }

    fn settle_current(&mut self, camera: &mut CameraRig, registry: &dyn EntityRegistry) {
        let Some(active) = self.current.as_mut() else {
            return;
        };
        if camera.is_animating() {
            return;
        }
        let ShotPhase::Approaching(settle) = &active.phase else {
            return;
        };
        match settle {
            Settle::Follow { target, landed } => {
                camera.set_mode(CameraMode::Follow);
                camera.set_target(Some(target.clone()));
                // Keep the framing the approach landed on
                let offset = registry
                    .entity_position(target)
                    .filter(|_| *landed)
                    .map(|target_position| camera.position() - target_position);
                camera.set_follow_offset(offset);
            }
            Settle::AutoRotate => {
                camera.set_auto_rotate(true, Some(WIDE_ROTATE_SPEED));
            }
        }
        active.phase = ShotPhase::Holding;
    }

    fn random_duration(&mut self) -> f64 {
        self.settings.min_shot_duration + self.rng.gen::<f64>() * self.settings.variability()
    }
}

/// Closed route through the known entities, or a ring around the origin
fn cinematic_route(registry: &dyn EntityRegistry) -> Vec<Vec3> {
    let lift = Vec3::new(0.0, WIDE_HEIGHT.0, 0.0);
    let mut points: Vec<Vec3> = registry
        .entity_ids()
        .iter()
        .filter_map(|id| registry.entity_position(id))
        .map(|p| p + lift)
        .collect();
    if points.len() < 2 {
        let radius = WIDE_RADIUS.0;
        points = (0..6)
            .map(|i| {
                let angle = i as f32 / 6.0 * TAU;
                Vec3::new(angle.cos() * radius, WIDE_HEIGHT.0, angle.sin() * radius)
            })
            .collect();
    }
    points
}
