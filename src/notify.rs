//! Publish/subscribe notification bus
//!
//! The bus is constructed once and handed to every component that emits
//! notifications. Cloning the bus clones the handle, not the subscriber list.

use bevy::math::Vec3;
use bevy::prelude::Resource;
use crossbeam_channel::{unbounded, Receiver};
use serde::Serialize;
use std::sync::{Arc, Mutex};

use crate::camera::CameraMode;
use crate::director::DirectorSnapshot;
use crate::modes::AppMode;
use crate::registry::EntityId;

/// Named notification topics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topic {
    ModeChanging,
    ModeChanged,
    CameraModeChanged,
    TargetChanged,
    AnimationComplete,
    ShotStarted,
    Message,
    Diagnostics,
}

impl Topic {
    pub const ALL: [Topic; 8] = [
        Topic::ModeChanging,
        Topic::ModeChanged,
        Topic::CameraModeChanged,
        Topic::TargetChanged,
        Topic::AnimationComplete,
        Topic::ShotStarted,
        Topic::Message,
        Topic::Diagnostics,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Topic::ModeChanging => "mode-changing",
            Topic::ModeChanged => "mode-changed",
            Topic::CameraModeChanged => "camera-mode-changed",
            Topic::TargetChanged => "target-changed",
            Topic::AnimationComplete => "animation-complete",
            Topic::ShotStarted => "shot-started",
            Topic::Message => "message",
            Topic::Diagnostics => "diagnostics",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Structured notification for the UI collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "topic", rename_all = "kebab-case")]
pub enum Notification {
    ModeChanging {
        from: Option<AppMode>,
        to: AppMode,
    },
    ModeChanged {
        from: Option<AppMode>,
        to: AppMode,
    },
    CameraModeChanged {
        from: CameraMode,
        to: CameraMode,
    },
    TargetChanged {
        target: EntityId,
    },
    AnimationComplete {
        position: [f32; 3],
        look_at: Option<[f32; 3]>,
    },
    ShotStarted {
        kind: String,
        target: Option<EntityId>,
        duration: f64,
    },
    Message {
        severity: Severity,
        text: String,
    },
    Diagnostics(DirectorSnapshot),
}

impl Notification {
    pub fn topic(&self) -> Topic {
        match self {
            Notification::ModeChanging { .. } => Topic::ModeChanging,
            Notification::ModeChanged { .. } => Topic::ModeChanged,
            Notification::CameraModeChanged { .. } => Topic::CameraModeChanged,
            Notification::TargetChanged { .. } => Topic::TargetChanged,
            Notification::AnimationComplete { .. } => Topic::AnimationComplete,
            Notification::ShotStarted { .. } => Topic::ShotStarted,
            Notification::Message { .. } => Topic::Message,
            Notification::Diagnostics(_) => Topic::Diagnostics,
        }
    }

    pub fn animation_complete(position: Vec3, look_at: Option<Vec3>) -> Self {
        Notification::AnimationComplete {
            position: position.to_array(),
            look_at: look_at.map(|v| v.to_array()),
        }
    }

    pub fn message(severity: Severity, text: impl Into<String>) -> Self {
        Notification::Message {
            severity,
            text: text.into(),
        }
    }
}

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn Fn(&Notification) + Send + Sync>;

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    handler: Handler,
}

#[derive(Default)]
struct BusInner {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

/// Thread-safe notification bus shared by the core components
#[derive(Clone, Default, Resource)]
pub struct NotificationBus(Arc<Mutex<BusInner>>);

impl NotificationBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for one topic
    pub fn subscribe(
        &self,
        topic: Topic,
        handler: impl Fn(&Notification) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let Ok(mut inner) = self.0.lock() else {
            return SubscriptionId(u64::MAX);
        };
        let id = SubscriptionId(inner.next_id);
        inner.next_id += 1;
        inner.subscribers.push(Subscriber {
            id,
            topic,
            handler: Box::new(handler),
        });
        id
    }

    /// Subscribe to several topics, receiving notifications on a channel
    pub fn subscribe_channel(&self, topics: &[Topic]) -> (Vec<SubscriptionId>, Receiver<Notification>) {
        let (tx, rx) = unbounded();
        let ids = topics
            .iter()
            .map(|&topic| {
                let tx = tx.clone();
                self.subscribe(topic, move |n| {
                    let _ = tx.send(n.clone());
                })
            })
            .collect();
        (ids, rx)
    }

    /// Returns false if the subscription was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let Ok(mut inner) = self.0.lock() else {
            return false;
        };
        let before = inner.subscribers.len();
        inner.subscribers.retain(|s| s.id != id);
        inner.subscribers.len() != before
    }

    /// Handlers run while the subscriber list is locked and must not call
    /// back into the bus.
    pub fn publish(&self, notification: Notification) {
        let topic = notification.topic();
        tracing::trace!(target: "notify", topic = topic.as_str(), "publish");
        let Ok(inner) = self.0.lock() else {
            return;
        };
        for subscriber in inner.subscribers.iter().filter(|s| s.topic == topic) {
            (subscriber.handler)(&notification);
        }
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.0
            .lock()
            .map(|inner| inner.subscribers.iter().filter(|s| s.topic == topic).count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn delivers_to_every_subscriber_of_the_topic() {
        let bus = NotificationBus::new();
        let hits = Arc::new(AtomicUsize::new(0));
        for _ in 0..2 {
            let hits = hits.clone();
            bus.subscribe(Topic::Message, move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }
        let other = hits.clone();
        bus.subscribe(Topic::TargetChanged, move |_| {
            other.fetch_add(100, Ordering::SeqCst);
        });

        bus.publish(Notification::message(Severity::Info, "hello"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let bus = NotificationBus::new();
        let (ids, rx) = bus.subscribe_channel(&[Topic::Message]);
        bus.publish(Notification::message(Severity::Warning, "one"));
        assert!(bus.unsubscribe(ids[0]));
        assert!(!bus.unsubscribe(ids[0]));
        bus.publish(Notification::message(Severity::Warning, "two"));

        let received: Vec<_> = rx.try_iter().collect();
        assert_eq!(received.len(), 1);
        assert_eq!(bus.subscriber_count(Topic::Message), 0);
    }

    #[test]
    fn clones_share_subscribers() {
        let bus = NotificationBus::new();
        let (_, rx) = bus.subscribe_channel(&[Topic::TargetChanged]);
        let handle = bus.clone();
        handle.publish(Notification::TargetChanged {
            target: EntityId::from("alpha"),
        });
        assert_eq!(rx.try_iter().count(), 1);
    }

    #[test]
    fn topic_names_match_serialized_tags() {
        for topic in Topic::ALL {
            let json = serde_json::to_string(&topic).unwrap();
            assert_eq!(json, format!("\"{}\"", topic.as_str()));
        }
    }
}
