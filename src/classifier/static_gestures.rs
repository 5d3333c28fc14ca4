//! Static Gesture Detection (priority 4 & 5)
//!
//! Pose-only heuristics with no temporal component; attempted last so a
//! pose held through a swipe, push, or pinch never masks it.

use crate::config::ClassifierConfig;
use crate::types::{HandObservation, Label};

use super::geometry;

pub fn detect_open_palm(obs: &HandObservation, cfg: &ClassifierConfig) -> Option<(Label, f32)> {
    let extended = geometry::count_extended_fingers(obs, cfg.open_palm_finger_threshold);
    let confidence = extended as f32 / 4.0;
    if extended >= cfg.open_palm_min_fingers {
        Some((Label::OpenPalm, confidence))
    } else {
        None
    }
}

pub fn detect_closed_fist(obs: &HandObservation, cfg: &ClassifierConfig) -> Option<(Label, f32)> {
    let palm = geometry::palm_center(obs);
    let closed = geometry::count_closed_fingers(obs, palm, cfg.closed_fist_distance_threshold);
    let confidence = closed as f32 / 5.0;
    if closed >= cfg.closed_fist_min_fingers {
        Some((Label::ClosedFist, confidence))
    } else {
        None
    }
}
