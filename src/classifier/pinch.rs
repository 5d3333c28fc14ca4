//! Pinch Detection (continuous, priority 3, with hysteresis)
//!
//! Uses two thresholds — `pinch_enter` < `pinch_exit` — so the pinch state
//! doesn't oscillate when the fingertip distance sits near one boundary.

use crate::config::ClassifierConfig;
use crate::types::Label;

/// `pinching` is the per-hand binary state carried across frames; this
/// function both reads and updates it.
pub fn detect(pinching: &mut bool, distance: f32, cfg: &ClassifierConfig) -> Option<(Label, f32)> {
    let confidence = 1.0 - (distance / cfg.pinch_exit).clamp(0.0, 1.0);

    if !*pinching && distance < cfg.pinch_enter {
        *pinching = true;
        Some((Label::PinchStart, confidence))
    } else if *pinching && distance > cfg.pinch_exit {
        *pinching = false;
        Some((Label::PinchEnd, confidence))
    } else if *pinching {
        Some((Label::PinchHold, confidence))
    } else {
        None
    }
}
