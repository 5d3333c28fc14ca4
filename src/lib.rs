//! Gesture recognition pipeline: hand landmark intake, geometric
//! classification, per-hand temporal stabilization, and a non-blocking
//! broadcaster fan-out to WebSocket subscribers.

pub mod broadcaster;
pub mod classifier;
pub mod config;
pub mod intake;
pub mod landmark_source;
pub mod pipeline;
pub mod state_machine;
pub mod stats;
pub mod types;
