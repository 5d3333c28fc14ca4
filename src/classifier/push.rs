//! Push-Forward Detection (temporal, priority 2)

use std::collections::VecDeque;

use crate::config::ClassifierConfig;
use crate::types::Label;

use super::history::{PositionSample, SizeSample};

/// Requires `size_history` full. On detection, clears both histories so a
/// push cannot immediately be re-read as a swipe from stale samples.
pub fn detect(
    size_history: &mut VecDeque<SizeSample>,
    position_history: &mut VecDeque<PositionSample>,
    cfg: &ClassifierConfig,
) -> Option<(Label, f32)> {
    if size_history.len() < cfg.push_window_size {
        return None;
    }

    let first = size_history.front().unwrap();
    let last = size_history.back().unwrap();
    if first.size == 0.0 {
        return None;
    }
    let delta_size = (last.size - first.size) / first.size;
    let delta_z = first.wrist_z - last.wrist_z;

    if delta_size > cfg.push_size_increase_threshold && delta_z > cfg.push_z_threshold {
        let confidence = (delta_size / (2.0 * cfg.push_size_increase_threshold)).min(1.0);
        size_history.clear();
        position_history.clear();
        Some((Label::PushForward, confidence))
    } else {
        None
    }
}
