//! Bridge layer between a host shell and the frame loop
//!
//! The shell (webview, CLI, test harness) never touches the core directly:
//! it pushes events through channels and reads back the published camera
//! pose and notifications.

pub mod commands;
pub mod shared_state;

use crossbeam_channel::Receiver;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::MonitorConfig;
use crate::ecs::start_frame_loop;
use crate::notify::{Notification, NotificationBus, SubscriptionId, Topic};
use crate::prefs::PreferenceStore;

pub use shared_state::{
    bridge_channels, AgentUpdate, CameraPoseSnapshot, InboundLine, InputEvent, SharedCameraPose,
    ShellEndpoints,
};

/// Shell-side handle to a running frame loop
pub struct MonitorHandle {
    pub(crate) endpoints: ShellEndpoints,
    pub(crate) notifications: Receiver<Notification>,
    bus: NotificationBus,
    subscriptions: Vec<SubscriptionId>,
    thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub fn bus(&self) -> &NotificationBus {
        &self.bus
    }

    pub fn pose(&self) -> &SharedCameraPose {
        &self.endpoints.pose
    }

    /// Stop the frame loop and wait for its thread
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.endpoints.shutdown.request();
        for id in self.subscriptions.drain(..) {
            self.bus.unsubscribe(id);
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                warn!(target: "modes", "frame loop thread panicked");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Spawn the frame loop and return the handle used to drive it
pub fn start_director(config: MonitorConfig, prefs: Box<dyn PreferenceStore>) -> MonitorHandle {
    let (shell, frame_loop) = bridge_channels();
    let bus = NotificationBus::new();
    let (subscriptions, notifications) = bus.subscribe_channel(&Topic::ALL);
    let thread = start_frame_loop(config, prefs, bus.clone(), frame_loop);
    MonitorHandle {
        endpoints: shell,
        notifications,
        bus,
        subscriptions,
        thread: Some(thread),
    }
}

/// Log the camera pose and drain pending notifications every `interval`
/// until the frame loop is asked to stop
pub fn spawn_pose_logger(handle: &MonitorHandle, interval: Duration) -> JoinHandle<()> {
    let pose = handle.endpoints.pose.clone();
    let notifications = handle.notifications.clone();
    let shutdown = handle.endpoints.shutdown.clone();
    thread::spawn(move || {
        while !shutdown.is_requested() {
            thread::sleep(interval);
            match pose.latest() {
                Some(pose) => info!(
                    frame = pose.frame,
                    app_mode = ?pose.app_mode,
                    camera_mode = ?pose.camera_mode,
                    position = ?pose.position,
                    target = ?pose.target,
                    "camera pose"
                ),
                None => warn!("no camera pose published yet"),
            }
            for notification in notifications.try_iter() {
                info!(topic = notification.topic().as_str(), ?notification, "notification");
            }
        }
    })
}
