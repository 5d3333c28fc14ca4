//! Per-Hand State Machine
//!
//! Converts a per-frame stream of `RawDetection | None` into a sparse
//! stream of `GestureEvent`s, one independent machine per `HandId`. Requires
//! temporal stability before promoting a detection, then enforces a
//! refractory (cooldown) period — except for `Continuous`-policy gestures,
//! which bypass both and are isolated to a single branch below.

use std::collections::{HashMap, VecDeque};

use crate::config::StateMachineConfig;
use crate::types::{EmitPolicy, GestureEvent, HandId, Label, RawDetection};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MachineState {
    Idle,
    Detecting,
    /// Entered only after a `Stable`-policy emission; while here, every
    /// input is ignored regardless of label until `cooldown_deadline`.
    /// `Immediate`-policy emissions never enter this state.
    Cooldown,
}

struct HandStateMachine {
    state: MachineState,
    buffer: VecDeque<RawDetection>,
    cooldown_deadline: Option<u64>,
    last_emitted: Option<(Label, u64)>,
}

impl HandStateMachine {
    fn new() -> Self {
        Self {
            state: MachineState::Idle,
            buffer: VecDeque::new(),
            cooldown_deadline: None,
            last_emitted: None,
        }
    }

    fn clear(&mut self) {
        self.state = MachineState::Idle;
        self.buffer.clear();
    }

    fn process(
        &mut self,
        hand_id: HandId,
        raw: Option<RawDetection>,
        now_ms: u64,
        cfg: &StateMachineConfig,
    ) -> Option<GestureEvent> {
        // Continuous gestures bypass stability and cooldown entirely: this
        // is the only place the refractory rule is skipped, and it never
        // touches buffer/state/cooldown so it can't corrupt the Stable path.
        if let Some(detection) = &raw {
            if detection.label.emit_policy() == EmitPolicy::Continuous {
                return Some(GestureEvent {
                    gesture: detection.label,
                    confidence: detection.confidence,
                    hand_id,
                    timestamp: now_ms,
                    metadata: detection.metadata,
                });
            }
        }

        // Only a Stable-policy emission blocks ALL subsequent input; see the
        // note on `MachineState::Cooldown` for why Immediate gestures never
        // set this gate (otherwise PINCH_END would be swallowed by the
        // cooldown PINCH_START just entered).
        if self.state == MachineState::Cooldown {
            match self.cooldown_deadline {
                Some(deadline) if now_ms >= deadline => {
                    self.clear();
                    self.cooldown_deadline = None;
                }
                _ => return None,
            }
        }

        let Some(detection) = raw else {
            self.clear();
            return None;
        };

        let policy = detection.label.emit_policy();
        let k = match policy {
            EmitPolicy::Stable => cfg.stability_frames.max(1),
            EmitPolicy::Immediate => 1,
            EmitPolicy::Continuous => unreachable!("handled above"),
        };

        self.buffer.push_back(detection);
        while self.buffer.len() > k {
            self.buffer.pop_front();
        }
        self.state = MachineState::Detecting;

        if self.buffer.len() < k {
            return None;
        }
        let g = self.buffer[0].label;
        if !self.buffer.iter().all(|d| d.label == g) {
            return None;
        }

        if !cfg.allow_same_gesture_repeat {
            if let Some((last_label, last_time)) = self.last_emitted {
                if last_label == g && now_ms.saturating_sub(last_time) < cfg.same_gesture_lockout_ms() {
                    // Drop silently: stay in Detecting, buffer untouched.
                    return None;
                }
            }
        }

        let confidence = self.buffer.iter().map(|d| d.confidence).sum::<f32>() / self.buffer.len() as f32;
        let metadata = self.buffer.back().unwrap().metadata;

        self.last_emitted = Some((g, now_ms));
        self.buffer.clear();

        match policy {
            EmitPolicy::Stable => {
                self.state = MachineState::Cooldown;
                self.cooldown_deadline = Some(now_ms + cfg.cooldown_ms);
            }
            EmitPolicy::Immediate => {
                // Refractory is scoped to this label alone (via
                // `last_emitted`, checked above), not to the hand as a
                // whole: a different immediate-policy label, or a
                // continuous one, must still fire on the very next frame.
                self.state = MachineState::Idle;
                self.cooldown_deadline = None;
            }
            EmitPolicy::Continuous => unreachable!("handled above"),
        }

        Some(GestureEvent {
            gesture: g,
            confidence,
            hand_id,
            timestamp: now_ms,
            metadata,
        })
    }
}

/// Arena of per-hand state machines, indexed by `HandId` (0 or 1); at most
/// two exist at a time.
pub struct StateMachines {
    config: StateMachineConfig,
    machines: HashMap<HandId, HandStateMachine>,
}

impl StateMachines {
    pub fn new(config: StateMachineConfig) -> Self {
        Self {
            config,
            machines: HashMap::new(),
        }
    }

    pub fn process(&mut self, hand_id: HandId, raw: Option<RawDetection>, now_ms: u64) -> Option<GestureEvent> {
        let machine = self.machines.entry(hand_id).or_insert_with(HandStateMachine::new);
        machine.process(hand_id, raw, now_ms, &self.config)
    }

    pub fn remove_hand(&mut self, hand_id: HandId) {
        self.machines.remove(&hand_id);
    }

    pub fn clear_all(&mut self) {
        self.machines.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetectionMetadata;

    fn meta() -> DetectionMetadata {
        DetectionMetadata {
            hand_center: (0.5, 0.5),
            hand_size: 0.1,
            wrist_z: 0.0,
            fingers_extended: 4,
        }
    }

    fn detection(label: Label) -> RawDetection {
        RawDetection {
            label,
            confidence: 1.0,
            metadata: meta(),
        }
    }

    fn cfg() -> StateMachineConfig {
        StateMachineConfig {
            stability_frames: 5,
            cooldown_ms: 1000,
            allow_same_gesture_repeat: false,
            same_gesture_lockout_ms: None,
        }
    }

    const FRAME_MS: u64 = 33;

    #[test]
    fn scenario_1_stable_palm_emits_once_at_frame_five() {
        let mut sm = StateMachines::new(cfg());
        let id = HandId(0);
        let mut emits = Vec::new();
        for i in 0..7u64 {
            emits.push(sm.process(id, Some(detection(Label::OpenPalm)), i * FRAME_MS));
        }
        assert!(emits[0].is_none());
        assert!(emits[1].is_none());
        assert!(emits[2].is_none());
        assert!(emits[3].is_none());
        assert!(emits[4].is_some());
        assert!(emits[5].is_none());
        assert!(emits[6].is_none());
    }

    #[test]
    fn scenario_2_unstable_mix_never_emits() {
        let mut sm = StateMachines::new(cfg());
        let id = HandId(0);
        let inputs = [
            Label::OpenPalm,
            Label::OpenPalm,
            Label::ClosedFist,
            Label::OpenPalm,
            Label::OpenPalm,
        ];
        for (i, label) in inputs.iter().enumerate() {
            let emit = sm.process(id, Some(detection(*label)), i as u64 * FRAME_MS);
            assert!(emit.is_none());
        }
    }

    #[test]
    fn scenario_3_cooldown_suppresses_repeat_emission() {
        let mut sm = StateMachines::new(cfg());
        let id = HandId(0);
        let mut emit_count = 0;
        for i in 0..10u64 {
            if sm.process(id, Some(detection(Label::OpenPalm)), i * FRAME_MS).is_some() {
                emit_count += 1;
            }
        }
        assert_eq!(emit_count, 1);

        // Same-gesture lockout keeps it suppressed at frame 10 even though
        // the 1000ms cooldown_ms window (≈30 frames) has elapsed by then for
        // bare cooldown but the buffer needs to refill to K first.
        let emit = sm.process(id, Some(detection(Label::OpenPalm)), 30 * FRAME_MS);
        assert!(emit.is_none());
    }

    #[test]
    fn scenario_6_two_hands_emit_independently() {
        let mut sm = StateMachines::new(cfg());
        let hand0 = HandId(0);
        let hand1 = HandId(1);
        let mut emits = Vec::new();
        for i in 0..5u64 {
            emits.push(sm.process(hand0, Some(detection(Label::OpenPalm)), i * FRAME_MS));
            emits.push(sm.process(hand1, Some(detection(Label::ClosedFist)), i * FRAME_MS));
        }
        let hand0_event = emits[8].as_ref().unwrap();
        let hand1_event = emits[9].as_ref().unwrap();
        assert_eq!(hand0_event.gesture, Label::OpenPalm);
        assert_eq!(hand0_event.hand_id, hand0);
        assert_eq!(hand1_event.gesture, Label::ClosedFist);
        assert_eq!(hand1_event.hand_id, hand1);
    }

    #[test]
    fn pinch_hold_bypasses_cooldown_and_emits_every_frame() {
        let mut sm = StateMachines::new(cfg());
        let id = HandId(0);
        // Push the hand into cooldown with an open-palm emission.
        for i in 0..5u64 {
            sm.process(id, Some(detection(Label::OpenPalm)), i * FRAME_MS);
        }
        // Still inside the cooldown window, but PinchHold must emit anyway.
        let emit = sm.process(id, Some(detection(Label::PinchHold)), 6 * FRAME_MS);
        assert!(emit.is_some());
        let emit2 = sm.process(id, Some(detection(Label::PinchHold)), 7 * FRAME_MS);
        assert!(emit2.is_some());
    }

    #[test]
    fn pinch_start_and_end_use_immediate_stability() {
        let mut sm = StateMachines::new(cfg());
        let id = HandId(0);
        let emit = sm.process(id, Some(detection(Label::PinchStart)), 0);
        assert!(emit.is_some());
    }

    #[test]
    fn none_input_clears_buffer_without_emitting() {
        let mut sm = StateMachines::new(cfg());
        let id = HandId(0);
        sm.process(id, Some(detection(Label::OpenPalm)), 0);
        sm.process(id, Some(detection(Label::OpenPalm)), FRAME_MS);
        let emit = sm.process(id, None, 2 * FRAME_MS);
        assert!(emit.is_none());
        // Buffer was cleared, so two more frames alone won't reach K=5.
        let emit = sm.process(id, Some(detection(Label::OpenPalm)), 3 * FRAME_MS);
        assert!(emit.is_none());
    }

    #[test]
    fn allow_same_gesture_repeat_skips_lockout() {
        let mut cfg = cfg();
        cfg.allow_same_gesture_repeat = true;
        let mut sm = StateMachines::new(cfg);
        let id = HandId(0);
        for i in 0..5u64 {
            sm.process(id, Some(detection(Label::OpenPalm)), i * FRAME_MS);
        }
        // Cooldown still applies (separate from the lockout), so we must
        // wait past cooldown_ms before the buffer can refill and re-emit.
        let mut emitted = false;
        for i in 5..40u64 {
            if sm
                .process(id, Some(detection(Label::OpenPalm)), i * FRAME_MS)
                .is_some()
            {
                emitted = true;
                break;
            }
        }
        assert!(emitted);
    }

    #[test]
    fn pinch_end_is_not_blocked_by_pinch_starts_own_lockout() {
        let mut sm = StateMachines::new(cfg());
        let id = HandId(0);
        assert!(sm.process(id, Some(detection(Label::PinchStart)), 0).is_some());
        // Despite cooldown_ms=1000, a different immediate-policy label on
        // the very next frame must still fire.
        assert!(sm.process(id, Some(detection(Label::PinchEnd)), FRAME_MS).is_some());
    }

    #[test]
    fn remove_hand_drops_its_machine() {
        let mut sm = StateMachines::new(cfg());
        let id = HandId(0);
        sm.process(id, Some(detection(Label::OpenPalm)), 0);
        sm.remove_hand(id);
        assert!(sm.machines.is_empty());
    }
}
