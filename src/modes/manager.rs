//! Mode lifecycle manager
//!
//! Transition protocol for `switch_mode(target)`:
//! 1. reject while another transition is in progress
//! 2. no-op if `target` is already active
//! 3. reject unregistered targets
//! 4. emit `ModeChanging`, then poll the old mode's `deactivate` to completion
//! 5. swap the current mode and poll the new mode's `activate` to completion
//! 6. persist `target` and emit `ModeChanged`

use bevy::prelude::Resource;
use indexmap::IndexMap;
use std::task::Poll;
use tracing::{debug, info, warn};

use super::{AppMode, AutomaticMode, DeveloperMode, KeyInput, ModeBehavior, ModeContext, PointerInput, UserMode};
use crate::config::modes::PREFERRED_MODE_KEY;
use crate::notify::{Notification, NotificationBus, Severity};
use crate::prefs::PreferenceStore;

/// Used when neither request, default nor preference names a registered mode
pub const FALLBACK_MODE: AppMode = AppMode::Automatic;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TransitionInProgress,
    NotRegistered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// Transition finished within the call
    Switched,
    /// Transition started and continues on subsequent updates
    InProgress,
    AlreadyActive,
    Rejected(RejectReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Deactivating,
    Activating,
}

#[derive(Debug, Clone, Copy)]
struct Transition {
    from: Option<AppMode>,
    to: AppMode,
    stage: Stage,
}

#[derive(Resource)]
pub struct ModeManager {
    units: IndexMap<AppMode, Box<dyn ModeBehavior>>,
    current: Option<AppMode>,
    transition: Option<Transition>,
    prefs: Box<dyn PreferenceStore>,
    bus: NotificationBus,
}

impl ModeManager {
    pub fn new(prefs: Box<dyn PreferenceStore>, bus: NotificationBus) -> Self {
        Self {
            units: IndexMap::new(),
            current: None,
            transition: None,
            prefs,
            bus,
        }
    }

    /// Manager with Automatic, User and Developer registered
    pub fn with_standard_modes(prefs: Box<dyn PreferenceStore>, bus: NotificationBus) -> Self {
        let mut manager = Self::new(prefs, bus);
        manager.register(Box::new(AutomaticMode::new()));
        manager.register(Box::new(UserMode::new()));
        manager.register(Box::new(DeveloperMode::new()));
        manager
    }

    pub fn register(&mut self, unit: Box<dyn ModeBehavior>) {
        let mode = unit.mode();
        if self.current == Some(mode) {
            warn!(target: "modes", %mode, "cannot replace the active mode");
            return;
        }
        self.units.insert(mode, unit);
    }

    pub fn is_registered(&self, mode: AppMode) -> bool {
        self.units.contains_key(&mode)
    }

    pub fn registered_modes(&self) -> Vec<AppMode> {
        self.units.keys().copied().collect()
    }

    pub fn current(&self) -> Option<AppMode> {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn preferences(&self) -> &dyn PreferenceStore {
        self.prefs.as_ref()
    }

    /// Resolve the startup mode and switch to it.
    ///
    /// Priority: `requested`, then `default`, then the persisted preference
    /// (discarded if stale), then [`FALLBACK_MODE`] or the first registered mode.
    pub fn initialize(
        &mut self,
        requested: Option<&str>,
        default: Option<AppMode>,
        ctx: &mut ModeContext<'_>,
    ) -> SwitchOutcome {
        let Some(mode) = self.resolve_initial_mode(requested, default) else {
            warn!(target: "modes", "no modes registered");
            return SwitchOutcome::Rejected(RejectReason::NotRegistered);
        };
        info!(target: "modes", %mode, "initial mode resolved");
        self.switch_mode(mode, ctx)
    }

    fn resolve_initial_mode(&mut self, requested: Option<&str>, default: Option<AppMode>) -> Option<AppMode> {
        if let Some(mode) = requested.and_then(AppMode::parse).filter(|m| self.is_registered(*m)) {
            return Some(mode);
        }
        if let Some(mode) = default.filter(|m| self.is_registered(*m)) {
            return Some(mode);
        }
        if let Some(saved) = self.prefs.get(PREFERRED_MODE_KEY) {
            match AppMode::parse(&saved).filter(|m| self.is_registered(*m)) {
                Some(mode) => return Some(mode),
                None => {
                    warn!(target: "modes", saved = %saved, "discarding stale mode preference");
                    if let Err(e) = self.prefs.remove(PREFERRED_MODE_KEY) {
                        warn!(target: "modes", error = %e, "failed to clear preference");
                    }
                }
            }
        }
        if self.is_registered(FALLBACK_MODE) {
            return Some(FALLBACK_MODE);
        }
        self.units.keys().next().copied()
    }

    pub fn switch_mode(&mut self, target: AppMode, ctx: &mut ModeContext<'_>) -> SwitchOutcome {
        if let Some(transition) = self.transition {
            warn!(
                target: "modes",
                requested = %target,
                to = %transition.to,
                "mode switch rejected, transition in progress"
            );
            return SwitchOutcome::Rejected(RejectReason::TransitionInProgress);
        }
        if self.current == Some(target) {
            return SwitchOutcome::AlreadyActive;
        }
        if !self.is_registered(target) {
            warn!(target: "modes", requested = %target, "mode switch rejected, mode not registered");
            self.bus.publish(Notification::message(
                Severity::Warning,
                format!("Mode '{target}' is not available"),
            ));
            return SwitchOutcome::Rejected(RejectReason::NotRegistered);
        }

        let from = self.current;
        info!(target: "modes", from = ?from, to = %target, "mode transition started");
        self.transition = Some(Transition {
            from,
            to: target,
            stage: if from.is_some() {
                Stage::Deactivating
            } else {
                Stage::Activating
            },
        });
        self.bus.publish(Notification::ModeChanging { from, to: target });

        if self.advance_transition(ctx) {
            SwitchOutcome::Switched
        } else {
            SwitchOutcome::InProgress
        }
    }

    /// Per-frame step: continues a pending transition, otherwise updates the
    /// active mode
    pub fn update(&mut self, dt: f32, ctx: &mut ModeContext<'_>) {
        if self.transition.is_some() {
            self.advance_transition(ctx);
            return;
        }
        if let Some(unit) = self.current.and_then(|mode| self.units.get_mut(&mode)) {
            unit.update(dt, ctx);
        }
    }

    /// Digit keys 1/2/3 always select a mode and are never forwarded
    pub fn handle_key(&mut self, key: &KeyInput, ctx: &mut ModeContext<'_>) {
        if let Some(mode) = key.mode_shortcut() {
            if self.is_transitioning() {
                debug!(target: "modes", key = %key.key, "mode shortcut ignored during transition");
                return;
            }
            self.switch_mode(mode, ctx);
            return;
        }
        if self.is_transitioning() {
            return;
        }
        if let Some(unit) = self.current.and_then(|mode| self.units.get_mut(&mode)) {
            unit.on_key(key, ctx);
        }
    }

    pub fn handle_pointer(&mut self, pointer: &PointerInput, ctx: &mut ModeContext<'_>) {
        if self.is_transitioning() {
            return;
        }
        if let Some(unit) = self.current.and_then(|mode| self.units.get_mut(&mode)) {
            unit.on_pointer(pointer, ctx);
        }
    }

    /// Returns true once the transition has completed
    fn advance_transition(&mut self, ctx: &mut ModeContext<'_>) -> bool {
        let Some(mut transition) = self.transition else {
            return true;
        };

        if transition.stage == Stage::Deactivating {
            if let Some(unit) = transition.from.and_then(|mode| self.units.get_mut(&mode)) {
                if unit.deactivate(ctx).is_pending() {
                    return false;
                }
            }
            transition.stage = Stage::Activating;
            self.transition = Some(transition);
        }

        self.current = Some(transition.to);
        let Some(unit) = self.units.get_mut(&transition.to) else {
            // Only reachable if the unit vanished mid-transition
            self.transition = None;
            self.current = None;
            return true;
        };
        if let Poll::Pending = unit.activate(ctx) {
            return false;
        }

        self.transition = None;
        if let Err(e) = self.prefs.set(PREFERRED_MODE_KEY, transition.to.as_str()) {
            warn!(target: "modes", error = %e, "failed to persist mode preference");
        }
        info!(target: "modes", mode = %transition.to, "mode active");
        self.bus.publish(Notification::ModeChanged {
            from: transition.from,
            to: transition.to,
        });
        true
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::camera::CameraRig;
    use crate::config::{CameraSettings, DirectorSettings};
    use crate::director::Director;
    use crate::notify::Topic;
    use crate::prefs::MemoryPreferences;
    use crate::registry::AgentRegistry;
    use proptest::prelude::*;
    use std::sync::atomic::{AtomicIsize, Ordering};
    use std::sync::{Arc, Mutex};

    pub(crate) struct Fixture {
        pub camera: CameraRig,
        pub director: Director,
        pub registry: AgentRegistry,
        pub bus: NotificationBus,
        pub now: f64,
    }

    impl Fixture {
        pub fn new() -> Self {
            let bus = NotificationBus::new();
            Self {
                camera: CameraRig::new(CameraSettings::default(), bus.clone()),
                director: Director::new(DirectorSettings::default(), Some(11), bus.clone()),
                registry: AgentRegistry::new(),
                bus,
                now: 0.0,
            }
        }

        pub fn ctx(&mut self) -> ModeContext<'_> {
            ModeContext {
                camera: &mut self.camera,
                director: &mut self.director,
                registry: &self.registry,
                bus: &self.bus,
                now: self.now,
            }
        }

        /// Advance the clock and the camera by `dt` seconds
        pub fn step(&mut self, dt: f64) {
            self.now += dt;
            self.camera.update(dt as f32, &self.registry);
        }
    }

    /// Mode whose lifecycle steps stay pending for a fixed number of polls
    struct StubMode {
        mode: AppMode,
        pending_polls: usize,
        remaining: usize,
        active: Arc<AtomicIsize>,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl StubMode {
        fn new(mode: AppMode, pending_polls: usize, active: &Arc<AtomicIsize>, log: &Arc<Mutex<Vec<String>>>) -> Box<Self> {
            Box::new(Self {
                mode,
                pending_polls,
                remaining: pending_polls,
                active: active.clone(),
                log: log.clone(),
            })
        }

        fn note(&self, event: &str) {
            self.log.lock().unwrap().push(format!("{}:{event}", self.mode));
        }

        fn poll_step(&mut self) -> Poll<()> {
            if self.remaining > 0 {
                self.remaining -= 1;
                return Poll::Pending;
            }
            self.remaining = self.pending_polls;
            Poll::Ready(())
        }
    }

    impl ModeBehavior for StubMode {
        fn mode(&self) -> AppMode {
            self.mode
        }

        fn activate(&mut self, _ctx: &mut ModeContext<'_>) -> Poll<()> {
            let poll = self.poll_step();
            if poll.is_ready() {
                self.active.fetch_add(1, Ordering::SeqCst);
                self.note("activate");
            }
            poll
        }

        fn deactivate(&mut self, _ctx: &mut ModeContext<'_>) -> Poll<()> {
            let poll = self.poll_step();
            if poll.is_ready() {
                self.active.fetch_sub(1, Ordering::SeqCst);
                self.note("deactivate");
            }
            poll
        }

        fn update(&mut self, _dt: f32, _ctx: &mut ModeContext<'_>) {
            self.note("update");
        }

        fn on_key(&mut self, key: &KeyInput, _ctx: &mut ModeContext<'_>) {
            self.note(&format!("key {}", key.key));
        }
    }

    struct Setup {
        manager: ModeManager,
        fx: Fixture,
        active: Arc<AtomicIsize>,
        log: Arc<Mutex<Vec<String>>>,
    }

    fn setup(pending: [usize; 3], prefs: MemoryPreferences) -> Setup {
        let fx = Fixture::new();
        let active = Arc::new(AtomicIsize::new(0));
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut manager = ModeManager::new(Box::new(prefs), fx.bus.clone());
        for (mode, polls) in AppMode::ALL.into_iter().zip(pending) {
            manager.register(StubMode::new(mode, polls, &active, &log));
        }
        Setup {
            manager,
            fx,
            active,
            log,
        }
    }

    fn log_of(setup: &Setup) -> Vec<String> {
        setup.log.lock().unwrap().clone()
    }

    #[test]
    fn switch_runs_deactivate_before_activate_and_persists() {
        let mut s = setup([0, 0, 0], MemoryPreferences::new());
        let (_, rx) = s.fx.bus.subscribe_channel(&[Topic::ModeChanging, Topic::ModeChanged]);

        assert_eq!(s.manager.switch_mode(AppMode::User, &mut s.fx.ctx()), SwitchOutcome::Switched);
        assert_eq!(s.manager.switch_mode(AppMode::Developer, &mut s.fx.ctx()), SwitchOutcome::Switched);

        assert_eq!(log_of(&s), vec!["user:activate", "user:deactivate", "developer:activate"]);
        assert_eq!(s.manager.current(), Some(AppMode::Developer));
        assert_eq!(s.manager.preferences().get(PREFERRED_MODE_KEY).as_deref(), Some("developer"));

        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![
                Notification::ModeChanging { from: None, to: AppMode::User },
                Notification::ModeChanged { from: None, to: AppMode::User },
                Notification::ModeChanging { from: Some(AppMode::User), to: AppMode::Developer },
                Notification::ModeChanged { from: Some(AppMode::User), to: AppMode::Developer },
            ]
        );
    }

    #[test]
    fn switching_to_active_mode_is_a_no_op() {
        let mut s = setup([0, 0, 0], MemoryPreferences::new());
        s.manager.switch_mode(AppMode::User, &mut s.fx.ctx());
        let (_, rx) = s.fx.bus.subscribe_channel(&Topic::ALL);

        assert_eq!(s.manager.switch_mode(AppMode::User, &mut s.fx.ctx()), SwitchOutcome::AlreadyActive);
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(log_of(&s), vec!["user:activate"]);
    }

    #[test]
    fn unregistered_mode_is_rejected() {
        let fx = Fixture::new();
        let mut manager = ModeManager::new(Box::new(MemoryPreferences::new()), fx.bus.clone());
        manager.register(Box::new(UserMode::new()));
        let mut fx = fx;
        assert_eq!(
            manager.switch_mode(AppMode::Developer, &mut fx.ctx()),
            SwitchOutcome::Rejected(RejectReason::NotRegistered)
        );
        assert_eq!(manager.current(), None);
    }

    #[test]
    fn requests_during_transition_are_rejected_without_side_effects() {
        let mut s = setup([0, 2, 0], MemoryPreferences::new());
        s.manager.switch_mode(AppMode::Automatic, &mut s.fx.ctx());

        assert_eq!(s.manager.switch_mode(AppMode::User, &mut s.fx.ctx()), SwitchOutcome::InProgress);
        assert!(s.manager.is_transitioning());

        let (_, rx) = s.fx.bus.subscribe_channel(&Topic::ALL);
        let before = log_of(&s);
        assert_eq!(
            s.manager.switch_mode(AppMode::Developer, &mut s.fx.ctx()),
            SwitchOutcome::Rejected(RejectReason::TransitionInProgress)
        );
        s.manager.handle_key(&KeyInput::new("3"), &mut s.fx.ctx());
        s.manager.handle_key(&KeyInput::new("x"), &mut s.fx.ctx());
        assert_eq!(log_of(&s), before);
        assert_eq!(rx.try_iter().count(), 0);

        s.manager.update(0.016, &mut s.fx.ctx());
        assert!(s.manager.is_transitioning());
        s.manager.update(0.016, &mut s.fx.ctx());
        assert!(!s.manager.is_transitioning());
        assert_eq!(s.manager.current(), Some(AppMode::User));
        assert_eq!(s.active.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn updates_are_not_routed_during_transition() {
        let mut s = setup([0, 1, 0], MemoryPreferences::new());
        s.manager.switch_mode(AppMode::User, &mut s.fx.ctx());
        s.manager.update(0.016, &mut s.fx.ctx());
        assert_eq!(log_of(&s), vec!["user:activate"]);
        s.manager.update(0.016, &mut s.fx.ctx());
        assert_eq!(log_of(&s), vec!["user:activate", "user:update"]);
    }

    #[test]
    fn digit_keys_switch_and_are_not_forwarded() {
        let mut s = setup([0, 0, 0], MemoryPreferences::new());
        s.manager.switch_mode(AppMode::User, &mut s.fx.ctx());
        s.manager.handle_key(&KeyInput::new("w"), &mut s.fx.ctx());
        s.manager.handle_key(&KeyInput::new("3"), &mut s.fx.ctx());

        assert_eq!(s.manager.current(), Some(AppMode::Developer));
        assert_eq!(
            log_of(&s),
            vec!["user:activate", "user:key w", "user:deactivate", "developer:activate"]
        );
    }

    #[test]
    fn initialize_prefers_request_then_default_then_saved() {
        let prefs = MemoryPreferences::new().with(PREFERRED_MODE_KEY, "developer");

        let mut s = setup([0, 0, 0], prefs.clone());
        s.manager.initialize(Some("2"), Some(AppMode::Automatic), &mut s.fx.ctx());
        assert_eq!(s.manager.current(), Some(AppMode::User));

        let mut s = setup([0, 0, 0], prefs.clone());
        s.manager.initialize(Some("bogus"), Some(AppMode::Automatic), &mut s.fx.ctx());
        assert_eq!(s.manager.current(), Some(AppMode::Automatic));

        let mut s = setup([0, 0, 0], prefs);
        s.manager.initialize(None, None, &mut s.fx.ctx());
        assert_eq!(s.manager.current(), Some(AppMode::Developer));
    }

    #[test]
    fn stale_preference_is_discarded() {
        let fx = Fixture::new();
        let active = Arc::new(AtomicIsize::new(0));
        let log = Arc::new(Mutex::new(Vec::new()));
        let prefs = MemoryPreferences::new().with(PREFERRED_MODE_KEY, "developer");
        let mut manager = ModeManager::new(Box::new(prefs), fx.bus.clone());
        manager.register(StubMode::new(AppMode::User, 0, &active, &log));
        let mut fx = fx;

        assert_eq!(manager.initialize(None, None, &mut fx.ctx()), SwitchOutcome::Switched);
        assert_eq!(manager.current(), Some(AppMode::User));
        // Replaced by the mode that actually became active
        assert_eq!(manager.preferences().get(PREFERRED_MODE_KEY).as_deref(), Some("user"));
    }

    #[test]
    fn unknown_preference_value_falls_back() {
        let mut s = setup([0, 0, 0], MemoryPreferences::new().with(PREFERRED_MODE_KEY, "cinema"));
        s.manager.initialize(None, None, &mut s.fx.ctx());
        assert_eq!(s.manager.current(), Some(FALLBACK_MODE));
    }

    #[test]
    fn standard_modes_hand_over_camera_control() {
        let mut fx = Fixture::new();
        let mut manager = ModeManager::with_standard_modes(Box::new(MemoryPreferences::new()), fx.bus.clone());

        assert_eq!(manager.initialize(Some("automatic"), None, &mut fx.ctx()), SwitchOutcome::Switched);
        assert!(fx.director.is_running());
        assert!(!fx.camera.manual_input_enabled());

        assert_eq!(manager.switch_mode(AppMode::User, &mut fx.ctx()), SwitchOutcome::InProgress);
        assert!(!fx.director.is_running());
        assert!(fx.camera.manual_input_enabled());
        for _ in 0..40 {
            fx.step(0.05);
            manager.update(0.05, &mut fx.ctx());
        }
        assert!(!manager.is_transitioning());
        assert_eq!(manager.current(), Some(AppMode::User));
    }

    proptest! {
        #[test]
        fn at_most_one_mode_active(
            pending in proptest::array::uniform3(0usize..3),
            ops in proptest::collection::vec((0usize..4, 0usize..3), 1..40)
        ) {
            let mut s = setup(pending, MemoryPreferences::new());
            for (op, index) in ops {
                match op {
                    0 | 1 => {
                        let target = AppMode::ALL[index];
                        let was_transitioning = s.manager.is_transitioning();
                        let current = s.manager.current();
                        let outcome = s.manager.switch_mode(target, &mut s.fx.ctx());
                        if was_transitioning {
                            prop_assert_eq!(outcome, SwitchOutcome::Rejected(RejectReason::TransitionInProgress));
                            prop_assert_eq!(s.manager.current(), current);
                        }
                    }
                    _ => s.manager.update(0.016, &mut s.fx.ctx()),
                }
                let active = s.active.load(Ordering::SeqCst);
                prop_assert!((0..=1).contains(&active));
            }
        }
    }
}
