//! Landmark Extractor Collaborator
//!
//! The hand landmark extractor itself is out of scope for this crate (see
//! spec §1/§6): camera capture, color conversion, and the ML model that
//! turns pixels into 21 3D points per hand all live elsewhere. This module
//! models that collaborator as a trait so the vision loop can be driven by
//! a real camera+model backend, a recorded-fixture backend, or — as used
//! throughout this crate's tests — a scripted synthetic generator.

use crate::types::HandObservation;

/// Produces per-frame hand observations. Implementors are polled once per
/// vision tick; `None` or an empty vec both mean "no hands this frame".
pub trait LandmarkSource: Send {
    /// Returns 0..2 hand observations for the next frame, or an error if
    /// extraction faulted (treated as "no hands this frame" by the caller).
    fn next_frame(&mut self) -> Result<Vec<HandObservation>, LandmarkSourceError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LandmarkSourceError {
    #[error("landmark extractor fault: {0}")]
    ExtractionFault(String),
}

/// Replays a scripted sequence of per-frame observations. Used by tests and
/// examples in place of a real camera/ML backend.
pub struct ScriptedLandmarkSource {
    frames: std::vec::IntoIter<Vec<HandObservation>>,
}

impl ScriptedLandmarkSource {
    pub fn new(frames: Vec<Vec<HandObservation>>) -> Self {
        Self {
            frames: frames.into_iter(),
        }
    }
}

impl LandmarkSource for ScriptedLandmarkSource {
    fn next_frame(&mut self) -> Result<Vec<HandObservation>, LandmarkSourceError> {
        Ok(self.frames.next().unwrap_or_default())
    }
}

/// Always reports no hands. Stands in for a real camera+model backend,
/// which is out of scope for this crate (§1) and plugged in separately.
pub struct NullLandmarkSource;

impl LandmarkSource for NullLandmarkSource {
    fn next_frame(&mut self) -> Result<Vec<HandObservation>, LandmarkSourceError> {
        Ok(Vec::new())
    }
}
