//! Per-Subscriber Outbound Queue
//!
//! Bounded, newest-wins: on overflow the oldest queued message is dropped
//! and a counter incremented, never the new one. Single producer
//! (the broadcaster's `publish`), single consumer (this subscriber's task).

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::{Mutex, Notify};
use uuid::Uuid;

use super::protocol::ServerMessage;

pub struct Subscriber {
    pub id: Uuid,
    queue: Mutex<VecDeque<ServerMessage>>,
    notify: Notify,
    capacity: usize,
    drops: AtomicU64,
    mirror_mode: AtomicBool,
}

impl Subscriber {
    pub fn new(capacity: usize) -> Self {
        Self {
            id: Uuid::new_v4(),
            queue: Mutex::new(VecDeque::with_capacity(capacity)),
            notify: Notify::new(),
            capacity,
            drops: AtomicU64::new(0),
            mirror_mode: AtomicBool::new(false),
        }
    }

    /// Enqueues a message, dropping one queued message on overflow. A queued
    /// `Status` is dropped in preference to the oldest gesture event, since
    /// status is the least important traffic on this connection; only when
    /// no `Status` is queued does the oldest message of any kind go.
    /// Never blocks: the queue lock is held only long enough to push/pop.
    pub async fn enqueue(&self, message: ServerMessage) {
        let mut queue = self.queue.lock().await;
        if queue.len() >= self.capacity {
            let status_pos = queue.iter().position(|m| matches!(m, ServerMessage::Status { .. }));
            match status_pos {
                Some(pos) => {
                    queue.remove(pos);
                }
                None => {
                    queue.pop_front();
                }
            }
            self.drops.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(message);
        drop(queue);
        self.notify.notify_one();
    }

    /// Waits for and returns the next queued message, oldest first.
    pub async fn recv(&self) -> ServerMessage {
        loop {
            {
                let mut queue = self.queue.lock().await;
                if let Some(message) = queue.pop_front() {
                    return message;
                }
            }
            self.notify.notified().await;
        }
    }

    pub fn drop_count(&self) -> u64 {
        self.drops.load(Ordering::Relaxed)
    }

    pub fn set_mirror_mode(&self, enabled: bool) {
        self.mirror_mode.store(enabled, Ordering::Relaxed);
    }

    pub fn mirror_mode(&self) -> bool {
        self.mirror_mode.load(Ordering::Relaxed)
    }
}
