//! Core Data Model
//!
//! Shared types that flow through every stage of the pipeline: landmark
//! observations in, gesture events out. Indices and field names follow the
//! MediaPipe-compatible 21-point hand layout.

use serde::{Deserialize, Serialize};

/// A single (x, y, z) point among the 21 per hand.
///
/// x, y are image-normalized (∈ [0,1]); z is unitless depth, smaller meaning
/// closer to the camera. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// True iff x and y are within [0,1] and no component is NaN.
    pub fn is_valid(&self) -> bool {
        self.x.is_finite()
            && self.y.is_finite()
            && self.z.is_finite()
            && (0.0..=1.0).contains(&self.x)
            && (0.0..=1.0).contains(&self.y)
    }

    pub fn distance_to(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    pub fn xy_distance_to(&self, other: &Landmark) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

/// Canonical landmark indices, fixed per the extractor's 21-point layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

pub const LANDMARK_COUNT: usize = 21;

/// Handedness label reported by the landmark extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

/// One frame's worth of a single detected hand, as reported by the
/// extractor. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    pub landmarks: [Landmark; LANDMARK_COUNT],
    pub handedness: Handedness,
    /// Tracker confidence in [0,1].
    pub score: f32,
    /// Tracking identity as reported by the extractor, if it provides one.
    pub tracking_id: Option<u64>,
}

impl HandObservation {
    pub fn landmark(&self, lm: HandLandmark) -> &Landmark {
        &self.landmarks[lm as usize]
    }

    pub fn wrist(&self) -> &Landmark {
        self.landmark(HandLandmark::Wrist)
    }

    /// True iff every landmark is in range and finite.
    pub fn is_valid(&self) -> bool {
        self.landmarks.iter().all(Landmark::is_valid)
    }
}

/// Stable small integer identity for a tracked hand; intake never assigns
/// more than two concurrently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandId(pub u8);

impl std::fmt::Display for HandId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The closed set of gestures the classifier can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Label {
    OpenPalm,
    ClosedFist,
    SwipeLeft,
    SwipeRight,
    SwipeUp,
    SwipeDown,
    PinchStart,
    PinchHold,
    PinchEnd,
    PushForward,
    None,
}

/// How the state machine treats a label: see §4.3 of the design notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitPolicy {
    /// Requires `stability_frames` identical consecutive detections, then a
    /// cooldown before the same hand can emit again.
    Stable,
    /// Requires stability with K lowered to 1 (effectively immediate), still
    /// subject to cooldown.
    Immediate,
    /// Emits every frame it is reported; bypasses stability and cooldown.
    Continuous,
}

impl Label {
    /// Per-label emit policy table (§9 design note: a table, not dispatch).
    ///
    /// Swipe and push are already one-shot: the classifier only reports them
    /// once per completed window and clears the history buffer that fed
    /// them, so they can never repeat identically across `stability_frames`
    /// consecutive classifier calls. Their own W-frame window is the
    /// stability mechanism, so they use `Immediate` (K=1) like
    /// `PINCH_START`/`PINCH_END` rather than `Stable`, which is reserved for
    /// poses that can flicker frame to frame (`OPEN_PALM`, `CLOSED_FIST`).
    pub fn emit_policy(&self) -> EmitPolicy {
        match self {
            Label::PinchHold => EmitPolicy::Continuous,
            Label::PinchStart
            | Label::PinchEnd
            | Label::SwipeLeft
            | Label::SwipeRight
            | Label::SwipeUp
            | Label::SwipeDown
            | Label::PushForward => EmitPolicy::Immediate,
            Label::OpenPalm | Label::ClosedFist | Label::None => EmitPolicy::Stable,
        }
    }
}

/// Metadata snapshot attached to every `RawDetection` and carried through to
/// the `GestureEvent` that it promotes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectionMetadata {
    pub hand_center: (f32, f32),
    pub hand_size: f32,
    pub wrist_z: f32,
    pub fingers_extended: u8,
}

/// A single frame's classification result for one hand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawDetection {
    pub label: Label,
    pub confidence: f32,
    pub metadata: DetectionMetadata,
}

/// A confidence-scored, temporally-stabilized gesture, ready for delivery to
/// subscribers. Immutable after emit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GestureEvent {
    pub gesture: Label,
    pub confidence: f32,
    pub hand_id: HandId,
    /// Milliseconds since epoch.
    pub timestamp: u64,
    pub metadata: DetectionMetadata,
}
