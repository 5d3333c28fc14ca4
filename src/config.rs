//! Configuration Surface
//!
//! Loaded once at startup from a JSON file; never hot-reloaded. Every
//! section falls back to compiled-in defaults, so a minimal or absent
//! config file is valid.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DetectorConfig {
    pub max_hands: u8,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
    pub model_complexity: u8,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            max_hands: 2,
            min_detection_confidence: 0.5,
            min_tracking_confidence: 0.5,
            model_complexity: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassifierConfig {
    pub open_palm_finger_threshold: f32,
    pub open_palm_min_fingers: u8,
    pub closed_fist_distance_threshold: f32,
    pub closed_fist_min_fingers: u8,
    pub pinch_enter: f32,
    pub pinch_exit: f32,
    pub swipe_window_size: usize,
    pub swipe_dx_threshold: f32,
    pub swipe_dy_threshold: f32,
    pub cross_axis_ratio: f32,
    pub push_window_size: usize,
    pub push_size_increase_threshold: f32,
    pub push_z_threshold: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            open_palm_finger_threshold: 0.02,
            open_palm_min_fingers: 3,
            closed_fist_distance_threshold: 0.10,
            closed_fist_min_fingers: 4,
            pinch_enter: 0.05,
            pinch_exit: 0.07,
            swipe_window_size: 8,
            swipe_dx_threshold: 0.08,
            swipe_dy_threshold: 0.08,
            cross_axis_ratio: 0.8,
            push_window_size: 8,
            push_size_increase_threshold: 0.15,
            push_z_threshold: 0.10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StateMachineConfig {
    pub stability_frames: usize,
    pub cooldown_ms: u64,
    pub allow_same_gesture_repeat: bool,
    pub same_gesture_lockout_ms: Option<u64>,
}

impl Default for StateMachineConfig {
    fn default() -> Self {
        Self {
            stability_frames: 5,
            cooldown_ms: 1000,
            allow_same_gesture_repeat: false,
            same_gesture_lockout_ms: None,
        }
    }
}

impl StateMachineConfig {
    /// Defaults to `cooldown_ms` per §4.3 when not explicitly set.
    pub fn same_gesture_lockout_ms(&self) -> u64 {
        self.same_gesture_lockout_ms.unwrap_or(self.cooldown_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BroadcasterConfig {
    pub bind_host: String,
    pub bind_port: u16,
    pub subscriber_queue_capacity: usize,
    pub idle_timeout_secs: u64,
    pub status_interval_secs: u64,
}

impl Default for BroadcasterConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 8765,
            subscriber_queue_capacity: 64,
            idle_timeout_secs: 60,
            status_interval_secs: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct IntakeConfig {
    pub hand_match_distance_threshold: f32,
    pub miss_frames_to_retire: u32,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            hand_match_distance_threshold: 0.15,
            miss_frames_to_retire: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub detector: DetectorConfig,
    pub classifier: ClassifierConfig,
    pub state_machine: StateMachineConfig,
    pub broadcaster: BroadcasterConfig,
    pub intake: IntakeConfig,
}

impl Config {
    /// Load from a JSON file, falling back to defaults for missing
    /// sections. Absent file paths are a load-time decision made by the
    /// caller (see `main`), not by this function.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
