//! Swipe Detection (temporal, priority 1)
//!
//! Tested first: a static gesture held through a swipe must not mask it,
//! and detecting a swipe consumes the position history that fed it.

use std::collections::VecDeque;

use crate::config::ClassifierConfig;
use crate::types::Label;

use super::history::PositionSample;

pub fn detect(history: &mut VecDeque<PositionSample>, cfg: &ClassifierConfig) -> Option<(Label, f32)> {
    if history.len() < cfg.swipe_window_size {
        return None;
    }

    let first = history.front().unwrap();
    let last = history.back().unwrap();
    let dx = last.center.0 - first.center.0;
    let dy = last.center.1 - first.center.1;

    let result = if dx.abs() > cfg.swipe_dx_threshold && dy.abs() <= cfg.cross_axis_ratio * dx.abs() {
        let confidence = (dx.abs() / (2.0 * cfg.swipe_dx_threshold)).min(1.0);
        let label = if dx < 0.0 { Label::SwipeLeft } else { Label::SwipeRight };
        Some((label, confidence))
    } else if dy.abs() > cfg.swipe_dy_threshold && dx.abs() <= cfg.cross_axis_ratio * dy.abs() {
        let confidence = (dy.abs() / (2.0 * cfg.swipe_dy_threshold)).min(1.0);
        // Image convention: y increases downward, so a negative dy is upward motion.
        let label = if dy < 0.0 { Label::SwipeUp } else { Label::SwipeDown };
        Some((label, confidence))
    } else {
        None
    };

    if result.is_some() {
        history.clear();
    }
    result
}
