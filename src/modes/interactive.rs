//! Interactive modes: the user drives the camera
//!
//! User and Developer share one camera contract, [`InteractiveCamera`].
//! Developer adds a diagnostics surface on top of it.

use bevy::math::Vec3;
use crossbeam_channel::Receiver;
use std::collections::VecDeque;
use std::task::Poll;
use tracing::{debug, info};

use super::{AppMode, KeyInput, ModeBehavior, ModeContext, PointerInput};
use crate::camera::CameraMode;
use crate::config::camera::{HOME_ANIMATION_MS, HOME_PIVOT, HOME_POSITION};
use crate::config::modes::{DIAGNOSTICS_INTERVAL, KEY_PAN_STEP};
use crate::notify::{Notification, SubscriptionId, Topic};

/// Pan speed for right-button drags, world units per pixel
const DRAG_PAN_SPEED: f32 = 0.02;

/// Standard interactive camera setup shared by the interactive modes
#[derive(Debug, Default)]
pub struct InteractiveCamera {
    configured: bool,
    homing: bool,
}

impl InteractiveCamera {
    /// Orbit mode, manual input on, target released, then an animated
    /// return home. Ready once the camera has settled.
    pub fn activate(&mut self, ctx: &mut ModeContext<'_>) -> Poll<()> {
        if !self.configured {
            ctx.camera.set_mode(CameraMode::Orbit);
            ctx.camera.set_target(None);
            ctx.camera.set_auto_rotate(false, None);
            ctx.camera.set_manual_input(true);
            self.configured = true;
            self.homing = false;
        }
        if !self.homing {
            // Retried every frame while an earlier animation is still running
            self.homing = ctx.camera.animate_to(
                Vec3::from_array(HOME_POSITION),
                Some(Vec3::from_array(HOME_PIVOT)),
                HOME_ANIMATION_MS,
            );
            return Poll::Pending;
        }
        if ctx.camera.is_animating() {
            return Poll::Pending;
        }
        self.configured = false;
        self.homing = false;
        Poll::Ready(())
    }

    pub fn deactivate(&mut self) {
        self.configured = false;
        self.homing = false;
    }

    pub fn on_key(&mut self, key: &KeyInput, ctx: &mut ModeContext<'_>) {
        let camera = &mut *ctx.camera;
        match key.key.to_ascii_lowercase().as_str() {
            "w" | "arrowup" => camera.move_forward(KEY_PAN_STEP),
            "s" | "arrowdown" => camera.move_forward(-KEY_PAN_STEP),
            "d" | "arrowright" => camera.move_right(KEY_PAN_STEP),
            "a" | "arrowleft" => camera.move_right(-KEY_PAN_STEP),
            "f" => {
                let next = if camera.mode() == CameraMode::Free {
                    CameraMode::Orbit
                } else {
                    CameraMode::Free
                };
                camera.set_mode(next);
            }
            "r" => camera.reset(),
            _ => {}
        }
    }

    pub fn on_pointer(&mut self, pointer: &PointerInput, ctx: &mut ModeContext<'_>) {
        let camera = &mut *ctx.camera;
        if !camera.manual_input_enabled() {
            return;
        }
        if pointer.left_button && pointer.has_motion() {
            if camera.mode() == CameraMode::Free {
                camera.rotate(pointer.delta_x, pointer.delta_y);
            } else {
                camera.orbit_drag(pointer.delta_x, pointer.delta_y);
            }
        }
        if pointer.right_button && pointer.has_motion() {
            camera.move_right(-pointer.delta_x * DRAG_PAN_SPEED);
            camera.move_forward(pointer.delta_y * DRAG_PAN_SPEED);
        }
        if pointer.scroll_delta != 0.0 {
            camera.zoom(pointer.scroll_delta);
        }
    }
}

/// Manual camera control
#[derive(Debug, Default)]
pub struct UserMode {
    camera: InteractiveCamera,
}

impl UserMode {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ModeBehavior for UserMode {
    fn mode(&self) -> AppMode {
        AppMode::User
    }

    fn activate(&mut self, ctx: &mut ModeContext<'_>) -> Poll<()> {
        self.camera.activate(ctx)
    }

    fn deactivate(&mut self, _ctx: &mut ModeContext<'_>) -> Poll<()> {
        self.camera.deactivate();
        Poll::Ready(())
    }

    fn update(&mut self, _dt: f32, _ctx: &mut ModeContext<'_>) {}

    fn on_key(&mut self, key: &KeyInput, ctx: &mut ModeContext<'_>) {
        self.camera.on_key(key, ctx);
    }

    fn on_pointer(&mut self, pointer: &PointerInput, ctx: &mut ModeContext<'_>) {
        self.camera.on_pointer(pointer, ctx);
    }
}

const RECENT_NOTIFICATIONS: usize = 32;

struct NotificationFeed {
    subscriptions: Vec<SubscriptionId>,
    receiver: Receiver<Notification>,
}

/// Manual camera control plus a periodic diagnostics surface
#[derive(Default)]
pub struct DeveloperMode {
    camera: InteractiveCamera,
    feed: Option<NotificationFeed>,
    recent: VecDeque<Notification>,
    next_diagnostics_at: Option<f64>,
}

impl DeveloperMode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notifications seen since activation, oldest first
    pub fn recent_notifications(&self) -> impl Iterator<Item = &Notification> {
        self.recent.iter()
    }

    fn publish_diagnostics(&mut self, ctx: &mut ModeContext<'_>) {
        let snapshot = ctx.director.snapshot(ctx.now);
        ctx.bus.publish(Notification::Diagnostics(snapshot));
    }
}

impl ModeBehavior for DeveloperMode {
    fn mode(&self) -> AppMode {
        AppMode::Developer
    }

    fn activate(&mut self, ctx: &mut ModeContext<'_>) -> Poll<()> {
        if self.feed.is_none() {
            let topics: Vec<Topic> = Topic::ALL
                .into_iter()
                .filter(|t| *t != Topic::Diagnostics)
                .collect();
            let (subscriptions, receiver) = ctx.bus.subscribe_channel(&topics);
            self.feed = Some(NotificationFeed {
                subscriptions,
                receiver,
            });
            info!(target: "modes", "developer diagnostics attached");
        }
        let ready = self.camera.activate(ctx);
        if ready.is_ready() {
            self.next_diagnostics_at = Some(ctx.now + DIAGNOSTICS_INTERVAL);
        }
        ready
    }

    fn deactivate(&mut self, ctx: &mut ModeContext<'_>) -> Poll<()> {
        if let Some(feed) = self.feed.take() {
            for id in feed.subscriptions {
                ctx.bus.unsubscribe(id);
            }
        }
        self.recent.clear();
        self.next_diagnostics_at = None;
        self.camera.deactivate();
        Poll::Ready(())
    }

    fn update(&mut self, _dt: f32, ctx: &mut ModeContext<'_>) {
        if let Some(feed) = &self.feed {
            for notification in feed.receiver.try_iter() {
                if self.recent.len() >= RECENT_NOTIFICATIONS {
                    self.recent.pop_front();
                }
                self.recent.push_back(notification);
            }
        }
        if self.next_diagnostics_at.is_some_and(|at| ctx.now >= at) {
            self.publish_diagnostics(ctx);
            self.next_diagnostics_at = Some(ctx.now + DIAGNOSTICS_INTERVAL);
        }
    }

    fn on_key(&mut self, key: &KeyInput, ctx: &mut ModeContext<'_>) {
        if key.is("p") {
            debug!(target: "modes", "diagnostics requested");
            self.publish_diagnostics(ctx);
            return;
        }
        self.camera.on_key(key, ctx);
    }

    fn on_pointer(&mut self, pointer: &PointerInput, ctx: &mut ModeContext<'_>) {
        self.camera.on_pointer(pointer, ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::manager::tests::Fixture;

    fn settle(fx: &mut Fixture, mode: &mut dyn ModeBehavior) -> usize {
        let mut polls = 1;
        while mode.activate(&mut fx.ctx()).is_pending() {
            fx.step(0.05);
            polls += 1;
            assert!(polls < 100, "activation never settled");
        }
        polls
    }

    #[test]
    fn user_activation_waits_for_home_animation() {
        let mut fx = Fixture::new();
        fx.camera.set_mode(CameraMode::Fixed);
        fx.camera.set_manual_input(false);
        let mut mode = UserMode::new();

        let polls = settle(&mut fx, &mut mode);
        assert!(polls > 1);
        assert_eq!(fx.camera.mode(), CameraMode::Orbit);
        assert!(fx.camera.manual_input_enabled());
        assert!(fx.camera.position().distance(Vec3::from_array(HOME_POSITION)) < 1e-3);
    }

    #[test]
    fn activation_retries_while_camera_busy() {
        let mut fx = Fixture::new();
        fx.camera
            .animate_to(Vec3::new(3.0, 3.0, 3.0), None, 500.0);
        let mut mode = UserMode::new();
        // Orbit already active, so the running move is kept and homing waits
        assert!(mode.activate(&mut fx.ctx()).is_pending());
        assert!(fx.camera.is_animating());
        settle(&mut fx, &mut mode);
        assert!(!fx.camera.is_animating());
    }

    #[test]
    fn free_toggle_and_pointer_rotation() {
        let mut fx = Fixture::new();
        let mut mode = UserMode::new();
        settle(&mut fx, &mut mode);

        mode.on_key(&KeyInput::new("F"), &mut fx.ctx());
        assert_eq!(fx.camera.mode(), CameraMode::Free);

        let before = fx.camera.position();
        let drag = PointerInput {
            delta_x: 40.0,
            left_button: true,
            ..Default::default()
        };
        mode.on_pointer(&drag, &mut fx.ctx());
        assert!(fx.camera.position().distance(before) > 0.01);

        mode.on_key(&KeyInput::new("f"), &mut fx.ctx());
        assert_eq!(fx.camera.mode(), CameraMode::Orbit);
    }

    #[test]
    fn developer_registers_and_releases_listeners() {
        let mut fx = Fixture::new();
        let mut mode = DeveloperMode::new();
        settle(&mut fx, &mut mode);
        assert_eq!(fx.bus.subscriber_count(Topic::CameraModeChanged), 1);

        assert!(mode.deactivate(&mut fx.ctx()).is_ready());
        assert_eq!(fx.bus.subscriber_count(Topic::CameraModeChanged), 0);
    }

    #[test]
    fn developer_publishes_periodic_diagnostics() {
        let mut fx = Fixture::new();
        let (_, rx) = fx.bus.subscribe_channel(&[Topic::Diagnostics]);
        let mut mode = DeveloperMode::new();
        settle(&mut fx, &mut mode);

        for _ in 0..50 {
            fx.step(0.05);
            mode.update(0.05, &mut fx.ctx());
        }
        // 2.5s of updates at a 1s interval
        assert_eq!(rx.try_iter().count(), 2);
        assert!(mode
            .recent_notifications()
            .any(|n| matches!(n, Notification::AnimationComplete { .. })));
    }
}
