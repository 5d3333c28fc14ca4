//! Shared Vision-Loop Stats
//!
//! A lock-free snapshot the vision loop writes once per tick and the
//! broadcaster's status ticker reads periodically. Floats are carried as
//! bit patterns so the whole thing stays on `AtomicU32`/`AtomicU8`.

use std::sync::atomic::{AtomicU32, AtomicU8, Ordering};

pub struct SharedStats {
    fps_bits: AtomicU32,
    latency_ms_bits: AtomicU32,
    hands_detected: AtomicU8,
}

impl SharedStats {
    pub fn new() -> Self {
        Self {
            fps_bits: AtomicU32::new(0f32.to_bits()),
            latency_ms_bits: AtomicU32::new(0f32.to_bits()),
            hands_detected: AtomicU8::new(0),
        }
    }

    pub fn update(&self, fps: f32, latency_ms: f32, hands_detected: u8) {
        self.fps_bits.store(fps.to_bits(), Ordering::Relaxed);
        self.latency_ms_bits.store(latency_ms.to_bits(), Ordering::Relaxed);
        self.hands_detected.store(hands_detected, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> (f32, f32, u8) {
        (
            f32::from_bits(self.fps_bits.load(Ordering::Relaxed)),
            f32::from_bits(self.latency_ms_bits.load(Ordering::Relaxed)),
            self.hands_detected.load(Ordering::Relaxed),
        )
    }
}

impl Default for SharedStats {
    fn default() -> Self {
        Self::new()
    }
}
