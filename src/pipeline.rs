//! Vision Loop Pipeline
//!
//! Owns intake, classifier, and per-hand state machines exclusively; ties
//! each tick's observations to zero or more published `GestureEvent`s, and
//! drains broadcaster control messages (currently only
//! `clear_gesture_history`) between frames.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tokio::sync::mpsc;

use crate::broadcaster::{Broadcaster, ControlMessage};
use crate::classifier::Classifier;
use crate::config::Config;
use crate::intake::Intake;
use crate::landmark_source::LandmarkSource;
use crate::state_machine::StateMachines;
use crate::stats::SharedStats;
use crate::types::HandId;

/// Consecutive landmark-extraction faults tolerated before the vision loop
/// gives up and returns an error (see §7).
const MAX_CONSECUTIVE_EXTRACTION_FAULTS: u32 = 30;

pub struct Pipeline {
    intake: Intake,
    classifier: Classifier,
    state_machines: StateMachines,
    broadcaster: Arc<Broadcaster>,
    control_rx: mpsc::UnboundedReceiver<ControlMessage>,
}

impl Pipeline {
    pub fn new(config: &Config, broadcaster: Arc<Broadcaster>, control_rx: mpsc::UnboundedReceiver<ControlMessage>) -> Self {
        Self {
            intake: Intake::new(config.intake.clone()),
            classifier: Classifier::new(config.classifier.clone()),
            state_machines: StateMachines::new(config.state_machine.clone()),
            broadcaster,
            control_rx,
        }
    }

    /// Processes one frame: drains pending control messages, assigns hand
    /// identities, classifies each hand, and publishes any promoted events.
    /// Returns the set of `HandId`s observed this frame.
    pub async fn tick(&mut self, observations: Vec<crate::types::HandObservation>, now_ms: u64) -> Vec<HandId> {
        while let Ok(message) = self.control_rx.try_recv() {
            match message {
                ControlMessage::ClearGestureHistory => {
                    self.classifier.clear_all();
                    self.state_machines.clear_all();
                }
            }
        }

        let (assigned, retired) = self.intake.process_frame(observations);
        for hand_id in retired {
            self.classifier.remove_hand(hand_id);
            self.state_machines.remove_hand(hand_id);
        }

        let mut active = Vec::with_capacity(assigned.len());
        for (hand_id, obs) in &assigned {
            active.push(*hand_id);
            let raw = self.classifier.classify(*hand_id, obs, now_ms);
            if let Some(event) = self.state_machines.process(*hand_id, raw, now_ms) {
                self.broadcaster.publish(&event).await;
            }
        }
        active
    }
}

/// Wall-clock milliseconds since epoch, falling back to a frame-count-based
/// estimate if the monotonic/wall clock is unavailable (§7).
fn now_ms(frame_index: u64, target_fps: f32) -> u64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_millis() as u64,
        Err(_) => (frame_index as f64 * (1000.0 / target_fps as f64)) as u64,
    }
}

/// Drives the pipeline from a `LandmarkSource` at `target_fps`, publishing
/// events and refreshing `stats` once per tick, until `running` is cleared.
/// Returns an error only after `MAX_CONSECUTIVE_EXTRACTION_FAULTS`
/// consecutive extraction faults.
pub async fn run_vision_loop(
    mut pipeline: Pipeline,
    mut source: Box<dyn LandmarkSource>,
    running: Arc<AtomicBool>,
    stats: Arc<SharedStats>,
    target_fps: f32,
) -> anyhow::Result<()> {
    let frame_period = std::time::Duration::from_secs_f32(1.0 / target_fps);
    let mut frame_index: u64 = 0;
    let mut consecutive_faults: u32 = 0;

    while running.load(Ordering::Relaxed) {
        let tick_started = std::time::Instant::now();

        let observations = match source.next_frame() {
            Ok(obs) => {
                consecutive_faults = 0;
                obs
            }
            Err(err) => {
                consecutive_faults += 1;
                log::warn!("landmark extraction fault, treating frame as empty: {err}");
                if consecutive_faults >= MAX_CONSECUTIVE_EXTRACTION_FAULTS {
                    anyhow::bail!("{MAX_CONSECUTIVE_EXTRACTION_FAULTS} consecutive landmark extraction faults");
                }
                Vec::new()
            }
        };

        let now = now_ms(frame_index, target_fps);
        let active = pipeline.tick(observations, now).await;

        let elapsed = tick_started.elapsed();
        let fps = if elapsed.as_secs_f32() > 0.0 { 1.0 / elapsed.as_secs_f32() } else { target_fps };
        stats.update(fps, elapsed.as_secs_f32() * 1000.0, active.len() as u8);

        frame_index += 1;
        if elapsed < frame_period {
            tokio::time::sleep(frame_period - elapsed).await;
        }
    }

    log::info!("vision loop stopped after {frame_index} frames");
    Ok(())
}
