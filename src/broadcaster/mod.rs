//! Broadcaster
//!
//! Non-blocking fan-out of `GestureEvent`s to every connected subscriber.
//! `publish` hands an event to each subscriber's own bounded queue and
//! returns; it never waits on subscriber network I/O, only the short-held
//! lock that protects the active-subscriber set.

pub mod protocol;
pub mod server;
mod subscriber;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::config::BroadcasterConfig;
use crate::types::GestureEvent;

pub use subscriber::Subscriber;

/// Signal from a subscriber connection back to the vision loop. Delivered
/// over an unbounded channel so a burst of control messages can never be
/// lost to the newest-wins policy meant for gesture traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlMessage {
    ClearGestureHistory,
}

pub struct Broadcaster {
    config: BroadcasterConfig,
    subscribers: Mutex<HashMap<Uuid, Arc<Subscriber>>>,
    control_tx: mpsc::UnboundedSender<ControlMessage>,
}

impl Broadcaster {
    /// Returns the broadcaster plus the receiving half of the control
    /// channel, which the pipeline owner polls once per vision tick.
    pub fn new(config: BroadcasterConfig) -> (Self, mpsc::UnboundedReceiver<ControlMessage>) {
        let (control_tx, control_rx) = mpsc::unbounded_channel();
        (
            Self {
                config,
                subscribers: Mutex::new(HashMap::new()),
                control_tx,
            },
            control_rx,
        )
    }

    /// Registers a new subscriber and returns its handle, already carrying
    /// a queued `hello` message.
    pub async fn register(&self) -> Arc<Subscriber> {
        let subscriber = Arc::new(Subscriber::new(self.config.subscriber_queue_capacity));
        subscriber.enqueue(protocol::ServerMessage::hello()).await;
        self.subscribers.lock().unwrap().insert(subscriber.id, subscriber.clone());
        log::info!("subscriber {} connected", subscriber.id);
        subscriber
    }

    pub fn remove(&self, id: Uuid) {
        if self.subscribers.lock().unwrap().remove(&id).is_some() {
            log::info!("subscriber {} disconnected", id);
        }
    }

    pub fn control_sender(&self) -> mpsc::UnboundedSender<ControlMessage> {
        self.control_tx.clone()
    }

    /// Total and non-blocking: hands the event to every subscriber's own
    /// queue (or records a drop there) and returns.
    pub async fn publish(&self, event: &GestureEvent) {
        let subscribers: Vec<Arc<Subscriber>> = self.subscribers.lock().unwrap().values().cloned().collect();
        for subscriber in subscribers {
            let message = protocol::ServerMessage::from_event(event, subscriber.mirror_mode());
            subscriber.enqueue(message).await;
        }
    }

    pub async fn publish_status(&self, fps: f32, latency_ms: f32, hands_detected: u8) {
        let subscribers: Vec<Arc<Subscriber>> = self.subscribers.lock().unwrap().values().cloned().collect();
        let message = protocol::ServerMessage::status(fps, latency_ms, hands_detected);
        for subscriber in subscribers {
            subscriber.enqueue(message.clone()).await;
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }

    pub fn idle_timeout_secs(&self) -> u64 {
        self.config.idle_timeout_secs
    }

    pub fn status_interval_secs(&self) -> u64 {
        self.config.status_interval_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event() -> GestureEvent {
        GestureEvent {
            gesture: crate::types::Label::OpenPalm,
            confidence: 1.0,
            hand_id: crate::types::HandId(0),
            timestamp: 0,
            metadata: crate::types::DetectionMetadata {
                hand_center: (0.5, 0.5),
                hand_size: 0.1,
                wrist_z: 0.0,
                fingers_extended: 4,
            },
        }
    }

    #[tokio::test]
    async fn publish_reaches_every_registered_subscriber() {
        let (broadcaster, _control_rx) = Broadcaster::new(BroadcasterConfig::default());
        let a = broadcaster.register().await;
        let b = broadcaster.register().await;
        assert_eq!(broadcaster.subscriber_count(), 2);

        // Drain the hello messages first.
        a.recv().await;
        b.recv().await;

        broadcaster.publish(&event()).await;
        assert!(matches!(a.recv().await, protocol::ServerMessage::Gesture { .. }));
        assert!(matches!(b.recv().await, protocol::ServerMessage::Gesture { .. }));
    }

    #[tokio::test]
    async fn remove_drops_subscriber_from_future_publishes() {
        let (broadcaster, _control_rx) = Broadcaster::new(BroadcasterConfig::default());
        let sub = broadcaster.register().await;
        broadcaster.remove(sub.id);
        assert_eq!(broadcaster.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn control_sender_forwards_clear_gesture_history() {
        let (broadcaster, mut control_rx) = Broadcaster::new(BroadcasterConfig::default());
        broadcaster.control_sender().send(ControlMessage::ClearGestureHistory).unwrap();
        assert_eq!(control_rx.recv().await, Some(ControlMessage::ClearGestureHistory));
    }
}
