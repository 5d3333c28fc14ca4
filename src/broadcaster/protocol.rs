//! Subscriber Wire Protocol
//!
//! Framed JSON, one message per line over the WebSocket, matching the
//! server/client message shapes exactly — including the 3-decimal-place
//! confidence and `hand_center` as a 2-element array.

use serde::{Deserialize, Serialize};

use crate::types::{GestureEvent, HandId, Label};

pub const PROTOCOL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GestureMetadataWire {
    pub hand_center: [f32; 2],
    pub hand_size: f32,
    pub fingers_extended: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Hello {
        version: String,
        capabilities: Vec<String>,
    },
    Gesture {
        gesture: Label,
        confidence: f32,
        hand_id: HandId,
        timestamp: u64,
        metadata: GestureMetadataWire,
    },
    Status {
        fps: f32,
        latency_ms: f32,
        hands_detected: u8,
    },
    Pong {
        timestamp: u64,
    },
}

impl ServerMessage {
    pub fn hello() -> Self {
        ServerMessage::Hello {
            version: PROTOCOL_VERSION.to_string(),
            capabilities: vec!["gestures".to_string(), "status".to_string()],
        }
    }

    /// Builds the wire gesture message from a `GestureEvent`, mirroring the
    /// hand-center x coordinate when the subscriber has `mirror_mode` set.
    pub fn from_event(event: &GestureEvent, mirror: bool) -> Self {
        let (mut x, y) = event.metadata.hand_center;
        if mirror {
            x = 1.0 - x;
        }
        ServerMessage::Gesture {
            gesture: event.gesture,
            confidence: round3(event.confidence),
            hand_id: event.hand_id,
            timestamp: event.timestamp,
            metadata: GestureMetadataWire {
                hand_center: [round3(x), round3(y)],
                hand_size: round3(event.metadata.hand_size),
                fingers_extended: event.metadata.fingers_extended,
            },
        }
    }

    pub fn status(fps: f32, latency_ms: f32, hands_detected: u8) -> Self {
        ServerMessage::Status {
            fps,
            latency_ms,
            hands_detected,
        }
    }

    pub fn pong(timestamp: u64) -> Self {
        ServerMessage::Pong { timestamp }
    }
}

fn round3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Ping {
        timestamp: u64,
    },
    Config {
        #[serde(default)]
        camera_index: Option<u32>,
        #[serde(default)]
        flip_camera: Option<bool>,
        #[serde(default)]
        mirror_mode: Option<bool>,
    },
    ClearGestureHistory,
}
