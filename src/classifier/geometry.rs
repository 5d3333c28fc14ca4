//! Landmark Geometry Primitives
//!
//! Pure functions over a single frame's landmarks; no history, no state.

use crate::types::{HandLandmark, HandObservation, Landmark};

/// Arithmetic mean of WRIST and the four MCP joints.
pub fn palm_center(obs: &HandObservation) -> (f32, f32) {
    let indices = [
        HandLandmark::Wrist,
        HandLandmark::IndexMcp,
        HandLandmark::MiddleMcp,
        HandLandmark::RingMcp,
        HandLandmark::PinkyMcp,
    ];
    mean_xy(obs, &indices)
}

/// Arithmetic mean of all 21 landmarks.
pub fn hand_center(obs: &HandObservation) -> (f32, f32) {
    let sum = obs
        .landmarks
        .iter()
        .fold((0.0f32, 0.0f32), |acc, lm| (acc.0 + lm.x, acc.1 + lm.y));
    let n = obs.landmarks.len() as f32;
    (sum.0 / n, sum.1 / n)
}

/// Euclidean distance between WRIST and MIDDLE_MCP; used as a scale
/// reference so thresholds stay resolution/distance independent.
pub fn hand_size(obs: &HandObservation) -> f32 {
    obs.landmark(HandLandmark::Wrist)
        .distance_to(obs.landmark(HandLandmark::MiddleMcp))
}

fn mean_xy(obs: &HandObservation, indices: &[HandLandmark]) -> (f32, f32) {
    let sum = indices.iter().fold((0.0f32, 0.0f32), |acc, &idx| {
        let lm = obs.landmark(idx);
        (acc.0 + lm.x, acc.1 + lm.y)
    });
    let n = indices.len() as f32;
    (sum.0 / n, sum.1 / n)
}

const NON_THUMB_FINGERS: [(HandLandmark, HandLandmark); 4] = [
    (HandLandmark::IndexPip, HandLandmark::IndexTip),
    (HandLandmark::MiddlePip, HandLandmark::MiddleTip),
    (HandLandmark::RingPip, HandLandmark::RingTip),
    (HandLandmark::PinkyPip, HandLandmark::PinkyTip),
];

/// Count of the four non-thumb fingers whose tip is above (smaller y than)
/// its PIP joint by more than `threshold`.
pub fn count_extended_fingers(obs: &HandObservation, threshold: f32) -> u8 {
    NON_THUMB_FINGERS
        .iter()
        .filter(|(pip, tip)| obs.landmark(*tip).y < obs.landmark(*pip).y - threshold)
        .count() as u8
}

const FINGERTIPS: [HandLandmark; 5] = [
    HandLandmark::ThumbTip,
    HandLandmark::IndexTip,
    HandLandmark::MiddleTip,
    HandLandmark::RingTip,
    HandLandmark::PinkyTip,
];

/// Count of fingertips within `threshold` of the palm center.
pub fn count_closed_fingers(obs: &HandObservation, palm: (f32, f32), threshold: f32) -> u8 {
    let palm = Landmark::new(palm.0, palm.1, 0.0);
    FINGERTIPS
        .iter()
        .filter(|&&tip| {
            let t = obs.landmark(tip);
            Landmark::new(t.x, t.y, 0.0).distance_to(&palm) < threshold
        })
        .count() as u8
}

pub fn pinch_distance(obs: &HandObservation) -> f32 {
    obs.landmark(HandLandmark::ThumbTip)
        .distance_to(obs.landmark(HandLandmark::IndexTip))
}
