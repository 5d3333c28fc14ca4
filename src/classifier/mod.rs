//! Classifier
//!
//! Maps a single `HandObservation` plus that hand's short history to at
//! most one `RawDetection` per frame. Temporal gestures (swipe, push) are
//! tried first because detecting them consumes the history buffer that fed
//! them; a static pose held through a swipe must not mask it.

mod geometry;
mod history;
mod pinch;
mod push;
mod static_gestures;
mod swipe;

use std::collections::{HashMap, VecDeque};

use crate::config::ClassifierConfig;
use crate::types::{DetectionMetadata, HandId, HandObservation, Label, RawDetection};

use history::{push_bounded, PositionSample, SizeSample};

struct HandClassifierState {
    position_history: VecDeque<PositionSample>,
    size_history: VecDeque<SizeSample>,
    pinching: bool,
}

impl HandClassifierState {
    fn new() -> Self {
        Self {
            position_history: VecDeque::new(),
            size_history: VecDeque::new(),
            pinching: false,
        }
    }
}

/// Owns per-hand history buffers and pinch state; exclusively mutated by
/// the vision loop.
pub struct Classifier {
    config: ClassifierConfig,
    states: HashMap<HandId, HandClassifierState>,
}

impl Classifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            states: HashMap::new(),
        }
    }

    /// Drops all per-hand history and pinch state. Used both for hand
    /// retirement and for the `clear_gesture_history` control message.
    pub fn remove_hand(&mut self, hand_id: HandId) {
        self.states.remove(&hand_id);
    }

    pub fn clear_all(&mut self) {
        self.states.clear();
    }

    /// Classifies one hand's observation for the current frame. Invalid
    /// landmarks (NaN or out of [0,1]) still advance history but yield no
    /// detection, per the classifier's failure semantics.
    pub fn classify(&mut self, hand_id: HandId, obs: &HandObservation, now_ms: u64) -> Option<RawDetection> {
        let cfg = &self.config;
        let state = self.states.entry(hand_id).or_insert_with(HandClassifierState::new);

        let center = geometry::hand_center(obs);
        push_bounded(
            &mut state.position_history,
            PositionSample { center, timestamp: now_ms },
            cfg.swipe_window_size,
        );
        push_bounded(
            &mut state.size_history,
            SizeSample {
                size: geometry::hand_size(obs),
                wrist_z: obs.wrist().z,
            },
            cfg.push_window_size,
        );

        if !obs.is_valid() {
            return None;
        }

        let metadata = DetectionMetadata {
            hand_center: center,
            hand_size: geometry::hand_size(obs),
            wrist_z: obs.wrist().z,
            fingers_extended: geometry::count_extended_fingers(obs, cfg.open_palm_finger_threshold),
        };

        let result = swipe::detect(&mut state.position_history, cfg)
            .or_else(|| push::detect(&mut state.size_history, &mut state.position_history, cfg))
            .or_else(|| pinch::detect(&mut state.pinching, geometry::pinch_distance(obs), cfg))
            .or_else(|| static_gestures::detect_open_palm(obs, cfg))
            .or_else(|| static_gestures::detect_closed_fist(obs, cfg));

        result.map(|(label, confidence)| RawDetection {
            label,
            confidence,
            metadata,
        })
    }
}
