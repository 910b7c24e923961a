//! Camera state machine
//!
//! [`CameraRig`] owns the camera pose and guarantees exactly one live
//! behavior at a time. Motion primitives mutate the pose directly; animated
//! moves run as a single in-flight [`AnimationTask`] advanced by `update`.

use bevy::math::Vec3;
use bevy::prelude::{Resource, Transform};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::easing::ease_in_out_cubic;
use super::orbit::OrbitControls;
use super::path::CinematicPath;
use crate::config::camera::*;
use crate::config::CameraSettings;
use crate::notify::{Notification, NotificationBus};
use crate::registry::{EntityId, EntityRegistry};

/// Camera behavior; exactly one is active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    Orbit,
    Follow,
    Cinematic,
    Free,
    Fixed,
}

impl CameraMode {
    /// Modes in which the pivot distance bounds are enforced
    pub fn is_constrained(self) -> bool {
        matches!(self, CameraMode::Orbit | CameraMode::Free)
    }
}

/// Current camera pose as seen by the rendering collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Option<Vec3>,
    pub min_distance: f32,
    pub max_distance: f32,
}

/// In-flight interpolation between two poses
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationTask {
    from_position: Vec3,
    to_position: Vec3,
    from_look_at: Vec3,
    to_look_at: Option<Vec3>,
    started_at: f32,
    /// Seconds
    duration: f32,
}

impl AnimationTask {
    fn sample(&self, now: f32) -> (f32, Vec3, Vec3) {
        let t = if self.duration > 0.0 {
            ((now - self.started_at) / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let eased = ease_in_out_cubic(t);
        let position = self.from_position.lerp(self.to_position, eased);
        let look_at = self
            .from_look_at
            .lerp(self.to_look_at.unwrap_or(self.from_look_at), eased);
        (t, position, look_at)
    }
}

#[derive(Resource)]
pub struct CameraRig {
    mode: CameraMode,
    position: Vec3,
    look_at: Option<Vec3>,
    orbit: OrbitControls,
    /// Whether pointer-driven orbit input is accepted at all
    manual_input: bool,
    follow_target: Option<EntityId>,
    /// Camera offset from the follow target; `None` uses the configured one
    follow_offset: Option<Vec3>,
    path: Option<CinematicPath>,
    animation: Option<AnimationTask>,
    settings: CameraSettings,
    /// Seconds accumulated through `update`
    clock: f32,
    bus: NotificationBus,
}

impl CameraRig {
    pub fn new(settings: CameraSettings, bus: NotificationBus) -> Self {
        let mut orbit = OrbitControls {
            auto_rotate_speed: settings.auto_rotate_speed,
            ..OrbitControls::default()
        };
        orbit.set_bounds(settings.min_distance, settings.max_distance);
        let position = orbit.position();
        Self {
            mode: CameraMode::Orbit,
            position,
            look_at: Some(orbit.pivot),
            orbit,
            manual_input: true,
            follow_target: None,
            follow_offset: None,
            path: None,
            animation: None,
            settings,
            clock: 0.0,
            bus,
        }
    }

    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.position,
            look_at: self.look_at,
            min_distance: self.orbit.min_distance,
            max_distance: self.orbit.max_distance,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn look_at(&self) -> Option<Vec3> {
        self.look_at
    }

    pub fn pivot(&self) -> Vec3 {
        self.orbit.pivot
    }

    pub fn target(&self) -> Option<&EntityId> {
        self.follow_target.as_ref()
    }

    pub fn path(&self) -> Option<&CinematicPath> {
        self.path.as_ref()
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    pub fn manual_input_enabled(&self) -> bool {
        self.manual_input
    }

    pub fn auto_rotate(&self) -> bool {
        self.orbit.auto_rotate
    }

    /// Transform for the rendering collaborator
    pub fn transform(&self) -> Transform {
        let focus = self.look_at.unwrap_or(self.orbit.pivot);
        Transform::from_translation(self.position).looking_at(focus, Vec3::Y)
    }

    /// Switch behavior. Returns false when already in `mode`.
    pub fn set_mode(&mut self, mode: CameraMode) -> bool {
        if self.mode == mode {
            return false;
        }
        let from = self.mode;

        // Tear down the previous behavior's continuous inputs
        self.orbit.auto_rotate = false;
        self.orbit.enabled = false;
        self.follow_target = None;
        self.follow_offset = None;
        if self.animation.take().is_some() {
            debug!(target: "camera", "animation abandoned by mode change");
        }

        self.mode = mode;
        match mode {
            CameraMode::Orbit => {
                self.orbit.enabled = true;
                self.orbit
                    .set_bounds(self.settings.min_distance, self.settings.max_distance);
                self.resync_orbit();
            }
            CameraMode::Free => {
                self.orbit.enabled = true;
                self.orbit.set_bounds(FREE_MIN_DISTANCE, FREE_MAX_DISTANCE);
                self.resync_orbit();
            }
            CameraMode::Follow | CameraMode::Cinematic | CameraMode::Fixed => {}
        }

        info!(target: "camera", ?from, to = ?mode, "camera mode changed");
        self.bus
            .publish(Notification::CameraModeChanged { from, to: mode });
        true
    }

    /// Start an animated move. Ignored while another animation is in flight.
    pub fn animate_to(&mut self, position: Vec3, look_at: Option<Vec3>, duration_ms: f32) -> bool {
        if self.animation.is_some() {
            debug!(target: "camera", "animate_to ignored, animation already running");
            return false;
        }
        self.animation = Some(AnimationTask {
            from_position: self.position,
            to_position: position,
            from_look_at: self.look_at.unwrap_or(self.orbit.pivot),
            to_look_at: look_at,
            started_at: self.clock,
            duration: duration_ms.max(0.0) / 1000.0,
        });
        if duration_ms <= 0.0 {
            self.step_animation();
        }
        true
    }

    /// Replace the cinematic path. Returns false if the points do not form a path.
    pub fn set_cinematic_path(&mut self, points: Vec<Vec3>) -> bool {
        if self.mode != CameraMode::Cinematic {
            debug!(target: "camera", mode = ?self.mode, "cinematic path set outside cinematic mode");
        }
        self.path = CinematicPath::new(points);
        if self.path.is_none() {
            warn!(target: "camera", "cinematic path needs at least two points");
        }
        self.path.is_some()
    }

    pub fn set_target(&mut self, target: Option<EntityId>) {
        self.follow_target = target.clone();
        if let Some(target) = target {
            self.bus.publish(Notification::TargetChanged { target });
        }
    }

    /// Hold the camera at `offset` from the follow target instead of the
    /// configured height and distance
    pub fn set_follow_offset(&mut self, offset: Option<Vec3>) {
        self.follow_offset = offset;
    }

    pub fn set_manual_input(&mut self, enabled: bool) {
        self.manual_input = enabled;
    }

    pub fn set_auto_rotate(&mut self, enabled: bool, speed: Option<f32>) {
        self.orbit.auto_rotate = enabled;
        if let Some(speed) = speed {
            self.orbit.auto_rotate_speed = speed;
        }
    }

    /// Translate camera and pivot together
    pub fn move_camera(&mut self, offset: Vec3) {
        self.position += offset;
        self.orbit.pivot += offset;
        self.look_at = self.look_at.map(|l| l + offset);
        self.enforce_bounds();
    }

    pub fn move_forward(&mut self, distance: f32) {
        let forward = self.ground_forward();
        self.move_camera(forward * distance);
    }

    pub fn move_right(&mut self, distance: f32) {
        let right = self.ground_forward().cross(Vec3::Y).normalize_or_zero();
        self.move_camera(right * distance);
    }

    /// Orbit around the pivot. Only effective in Free mode.
    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) -> bool {
        if self.mode != CameraMode::Free {
            return false;
        }
        self.resync_orbit();
        self.orbit.drag(delta_x, delta_y);
        self.position = self.orbit.position();
        self.look_at = Some(self.orbit.pivot);
        true
    }

    /// Move toward (positive) or away from the pivot within the distance bounds
    pub fn zoom(&mut self, delta: f32) {
        self.resync_orbit();
        self.orbit.scroll(delta);
        self.position = self.orbit.position();
    }

    /// Pointer drag routed through the orbit primitive (Orbit mode only)
    pub fn orbit_drag(&mut self, delta_x: f32, delta_y: f32) -> bool {
        if !self.manual_input || !self.orbit.enabled || self.mode != CameraMode::Orbit {
            return false;
        }
        self.resync_orbit();
        self.orbit.drag(delta_x, delta_y);
        self.position = self.orbit.position();
        true
    }

    /// Advance the active behavior by `dt` seconds
    pub fn update(&mut self, dt: f32, registry: &dyn EntityRegistry) {
        self.clock += dt;

        if self.animation.is_some() {
            self.step_animation();
            return;
        }

        match self.mode {
            CameraMode::Orbit | CameraMode::Free => {
                if self.orbit.enabled {
                    self.position = self.orbit.update(dt);
                    self.look_at = Some(self.orbit.pivot);
                }
            }
            CameraMode::Follow => self.update_follow(dt, registry),
            CameraMode::Cinematic => self.update_cinematic(),
            CameraMode::Fixed => {}
        }
    }

    /// Restore the canonical resting pose
    pub fn reset(&mut self) {
        self.animation = None;
        self.position = Vec3::from_array(HOME_POSITION);
        self.orbit.pivot = Vec3::from_array(HOME_PIVOT);
        self.look_at = Some(self.orbit.pivot);
        self.resync_orbit();
    }

    fn update_follow(&mut self, dt: f32, registry: &dyn EntityRegistry) {
        let Some(target) = self.follow_target.as_ref() else {
            return;
        };
        let Some(target_position) = registry.entity_position(target) else {
            return;
        };
        let offset = self
            .follow_offset
            .unwrap_or_else(|| Vec3::new(0.0, self.settings.follow_height, self.settings.follow_distance));
        let desired = target_position + offset;

        let factor = (dt * self.settings.move_speed).clamp(0.0, 1.0);
        self.position = self.position.lerp(desired, factor);

        let look_factor = (dt * self.settings.move_speed * 2.0).clamp(0.0, 1.0);
        let current_look = self.look_at.unwrap_or(self.orbit.pivot);
        let look_at = current_look.lerp(target_position, look_factor);
        self.look_at = Some(look_at);
        self.orbit.pivot = look_at;
    }

    fn update_cinematic(&mut self) {
        let Some(path) = self.path.as_mut() else {
            return;
        };
        let speed = self
            .settings
            .cinematic_speed
            .clamp(CINEMATIC_SPEED_MIN, CINEMATIC_SPEED_MAX);
        path.advance(speed);

        let progress = path.progress();
        self.position = path.sample(progress);
        let ahead = path.sample(progress + CINEMATIC_LOOK_AHEAD);
        // Look-at height is pinned to the ground plane
        let look_at = Vec3::new(ahead.x, 0.0, ahead.z);
        self.look_at = Some(look_at);
        self.orbit.pivot = look_at;
    }

    fn step_animation(&mut self) {
        let Some(task) = self.animation.clone() else {
            return;
        };
        let (t, position, look_at) = task.sample(self.clock);
        self.position = position;
        self.look_at = Some(look_at);

        if t >= 1.0 {
            let end_look = task.to_look_at.unwrap_or(task.from_look_at);
            self.position = task.to_position;
            self.look_at = Some(end_look);
            self.animation = None;
            self.orbit.sync_from(self.position, end_look);
            debug!(target: "camera", position = ?self.position, "animation complete");
            self.bus
                .publish(Notification::animation_complete(self.position, self.look_at));
        }
    }

    fn resync_orbit(&mut self) {
        let pivot = self.look_at.unwrap_or(self.orbit.pivot);
        self.orbit.sync_from(self.position, pivot);
        self.enforce_bounds();
    }

    fn enforce_bounds(&mut self) {
        if !self.mode.is_constrained() {
            return;
        }
        let before = self.orbit.distance;
        self.orbit.clamp_distance();
        if (before - self.orbit.distance).abs() > f32::EPSILON {
            self.position = self.orbit.position();
        }
    }

    /// View direction flattened onto the ground plane
    fn ground_forward(&self) -> Vec3 {
        let focus = self.look_at.unwrap_or(self.orbit.pivot);
        let forward = Vec3::new(focus.x - self.position.x, 0.0, focus.z - self.position.z);
        let forward = forward.normalize_or_zero();
        if forward == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            forward
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Topic;
    use crate::registry::AgentRegistry;

    fn rig() -> (CameraRig, NotificationBus) {
        let bus = NotificationBus::new();
        (CameraRig::new(CameraSettings::default(), bus.clone()), bus)
    }

    fn run(rig: &mut CameraRig, registry: &AgentRegistry, seconds: f32) {
        let steps = (seconds / 0.01).round() as usize;
        for _ in 0..steps {
            rig.update(0.01, registry);
        }
    }

    #[test]
    fn set_mode_twice_notifies_once() {
        let (mut rig, bus) = rig();
        let (_, rx) = bus.subscribe_channel(&[Topic::CameraModeChanged]);

        assert!(rig.set_mode(CameraMode::Follow));
        assert!(!rig.set_mode(CameraMode::Follow));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![Notification::CameraModeChanged {
                from: CameraMode::Orbit,
                to: CameraMode::Follow
            }]
        );
    }

    #[test]
    fn entering_mode_releases_target_and_auto_rotate() {
        let (mut rig, _) = rig();
        rig.set_auto_rotate(true, None);
        rig.set_mode(CameraMode::Follow);
        rig.set_target(Some("alpha".into()));
        rig.set_mode(CameraMode::Fixed);
        assert!(rig.target().is_none());
        assert!(!rig.auto_rotate());
    }

    #[test]
    fn second_animation_is_ignored_while_busy() {
        let (mut rig, _) = rig();
        let registry = AgentRegistry::new();
        rig.set_mode(CameraMode::Fixed);
        let first = Vec3::new(5.0, 5.0, 5.0);

        assert!(rig.animate_to(first, Some(Vec3::ZERO), 1000.0));
        assert!(!rig.animate_to(Vec3::new(-9.0, 1.0, 0.0), None, 100.0));

        run(&mut rig, &registry, 1.1);
        assert!(!rig.is_animating());
        assert!(rig.position().distance(first) < 1e-5);
        assert_eq!(rig.look_at(), Some(Vec3::ZERO));
    }

    #[test]
    fn animation_follows_ease_curve() {
        let (mut rig, bus) = rig();
        let (_, rx) = bus.subscribe_channel(&[Topic::AnimationComplete]);
        let registry = AgentRegistry::new();
        rig.set_mode(CameraMode::Fixed);
        let start = rig.position();
        let end = start + Vec3::new(10.0, 0.0, 0.0);

        rig.animate_to(end, None, 1000.0);
        rig.update(0.5, &registry);
        assert!(rig.position().distance(start.lerp(end, 0.5)) < 1e-4);
        assert_eq!(rx.try_iter().count(), 0);

        rig.update(0.5, &registry);
        assert_eq!(rig.position(), end);
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn zero_duration_animation_completes_immediately() {
        let (mut rig, _) = rig();
        rig.set_mode(CameraMode::Fixed);
        assert!(rig.animate_to(Vec3::new(1.0, 2.0, 3.0), None, 0.0));
        assert!(!rig.is_animating());
        assert_eq!(rig.position(), Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn mode_change_abandons_animation() {
        let (mut rig, _) = rig();
        rig.animate_to(Vec3::new(3.0, 3.0, 3.0), None, 1000.0);
        rig.set_mode(CameraMode::Fixed);
        assert!(!rig.is_animating());
    }

    #[test]
    fn rotate_only_in_free_mode() {
        let (mut rig, _) = rig();
        let before = rig.position();
        assert!(!rig.rotate(50.0, 0.0));
        assert_eq!(rig.position(), before);

        rig.set_mode(CameraMode::Free);
        assert!(rig.rotate(50.0, 0.0));
        assert!(rig.position().distance(before) > 0.01);
        let distance = rig.position().distance(rig.pivot());
        assert!(distance >= FREE_MIN_DISTANCE && distance <= FREE_MAX_DISTANCE);
    }

    #[test]
    fn zoom_respects_distance_bounds() {
        let (mut rig, _) = rig();
        rig.zoom(10_000.0);
        let distance = rig.position().distance(rig.pivot());
        assert!((distance - MIN_DISTANCE).abs() < 1e-3);

        rig.zoom(-10_000.0);
        let distance = rig.position().distance(rig.pivot());
        assert!((distance - MAX_DISTANCE).abs() < 1e-2);
    }

    #[test]
    fn move_keeps_pivot_distance() {
        let (mut rig, _) = rig();
        let distance = rig.position().distance(rig.pivot());
        rig.move_forward(3.0);
        rig.move_right(-2.0);
        rig.move_camera(Vec3::new(0.0, 1.0, 0.0));
        assert!((rig.position().distance(rig.pivot()) - distance).abs() < 1e-4);
    }

    #[test]
    fn follow_damps_toward_offset() {
        let (mut rig, _) = rig();
        let mut registry = AgentRegistry::new();
        let target = Vec3::new(20.0, 0.0, -5.0);
        registry.upsert("alpha".into(), target);

        rig.set_mode(CameraMode::Follow);
        rig.set_target(Some("alpha".into()));
        run(&mut rig, &registry, 10.0);

        let desired = target + Vec3::new(0.0, FOLLOW_HEIGHT, FOLLOW_DISTANCE);
        assert!(rig.position().distance(desired) < 0.01);
        assert!(rig.look_at().unwrap().distance(target) < 0.01);
    }

    #[test]
    fn follow_holds_explicit_offset_until_mode_change() {
        let (mut rig, _) = rig();
        let mut registry = AgentRegistry::new();
        let target = Vec3::new(4.0, 0.0, 4.0);
        registry.upsert("alpha".into(), target);

        rig.set_mode(CameraMode::Follow);
        rig.set_target(Some("alpha".into()));
        rig.set_follow_offset(Some(Vec3::new(6.0, 3.0, 0.0)));
        run(&mut rig, &registry, 10.0);
        assert!(rig.position().distance(target + Vec3::new(6.0, 3.0, 0.0)) < 0.01);

        rig.set_mode(CameraMode::Orbit);
        rig.set_mode(CameraMode::Follow);
        rig.set_target(Some("alpha".into()));
        run(&mut rig, &registry, 10.0);
        let desired = target + Vec3::new(0.0, FOLLOW_HEIGHT, FOLLOW_DISTANCE);
        assert!(rig.position().distance(desired) < 0.01);
    }

    #[test]
    fn follow_without_known_target_holds_still() {
        let (mut rig, _) = rig();
        let registry = AgentRegistry::new();
        rig.set_mode(CameraMode::Follow);
        rig.set_target(Some("ghost".into()));
        let before = rig.position();
        rig.update(0.1, &registry);
        assert_eq!(rig.position(), before);
    }

    #[test]
    fn cinematic_samples_path_with_ground_look_at() {
        let (mut rig, _) = rig();
        let registry = AgentRegistry::new();
        rig.set_mode(CameraMode::Cinematic);
        assert!(rig.set_cinematic_path(vec![
            Vec3::new(10.0, 6.0, 0.0),
            Vec3::new(0.0, 6.0, 10.0),
            Vec3::new(-10.0, 6.0, 0.0),
        ]));

        rig.update(0.016, &registry);
        let path = rig.path().unwrap();
        assert!((path.progress() - CINEMATIC_SPEED).abs() < 1e-6);
        assert!((rig.position().y - 6.0).abs() < 0.5);
        assert_eq!(rig.look_at().unwrap().y, 0.0);
    }

    #[test]
    fn new_path_resets_progress() {
        let (mut rig, _) = rig();
        let registry = AgentRegistry::new();
        rig.set_mode(CameraMode::Cinematic);
        rig.set_cinematic_path(vec![Vec3::X, Vec3::Z]);
        rig.update(0.016, &registry);
        rig.set_cinematic_path(vec![Vec3::X, Vec3::Z, Vec3::NEG_X]);
        assert_eq!(rig.path().unwrap().progress(), 0.0);
    }

    #[test]
    fn fixed_mode_does_not_move() {
        let (mut rig, _) = rig();
        let registry = AgentRegistry::new();
        rig.set_mode(CameraMode::Fixed);
        let pose = rig.pose();
        run(&mut rig, &registry, 1.0);
        assert_eq!(rig.pose(), pose);
    }

    #[test]
    fn only_non_null_target_notifies() {
        let (mut rig, bus) = rig();
        let (_, rx) = bus.subscribe_channel(&[Topic::TargetChanged]);
        rig.set_target(None);
        rig.set_target(Some("beta".into()));
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn orbit_drag_requires_manual_input() {
        let (mut rig, _) = rig();
        rig.set_manual_input(false);
        assert!(!rig.orbit_drag(10.0, 0.0));
        rig.set_manual_input(true);
        assert!(rig.orbit_drag(10.0, 0.0));
    }

    #[test]
    fn reset_restores_home_pose() {
        let (mut rig, _) = rig();
        rig.move_camera(Vec3::new(4.0, 0.0, 4.0));
        rig.reset();
        assert!(rig.position().distance(Vec3::from_array(HOME_POSITION)) < 1e-4);
        assert_eq!(rig.pivot(), Vec3::from_array(HOME_PIVOT));
    }
}
