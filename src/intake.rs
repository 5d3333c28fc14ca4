//! Landmark Intake
//!
//! Assigns stable `HandId`s to the extractor's per-frame observations and
//! tracks how long each identity has gone unobserved, so the pipeline owner
//! knows when to tear down a `HandState`.

use crate::config::IntakeConfig;
use crate::types::{HandId, HandObservation};

struct TrackedHand {
    id: HandId,
    last_wrist: (f32, f32),
    /// The extractor's own tracking id for this hand, if it provides one.
    tracking_id: Option<u64>,
    /// Consecutive frames without a matching observation.
    miss_count: u32,
}

/// Assigns and retires `HandId`s. Owned exclusively by the vision loop.
pub struct Intake {
    config: IntakeConfig,
    tracked: Vec<TrackedHand>,
}

impl Intake {
    pub fn new(config: IntakeConfig) -> Self {
        Self {
            config,
            tracked: Vec::with_capacity(2),
        }
    }

    /// Processes one frame's observations, returning stable identities
    /// paired with their observation, and the set of `HandId`s retired this
    /// frame (for the caller to tear down `HandState`).
    pub fn process_frame(
        &mut self,
        mut observations: Vec<HandObservation>,
    ) -> (Vec<(HandId, HandObservation)>, Vec<HandId>) {
        // Failure semantics: keep the 2 highest-score observations, drop the rest.
        if observations.len() > 2 {
            observations.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
            observations.truncate(2);
        }

        let mut matched_ids = Vec::with_capacity(observations.len());
        let mut assigned = Vec::with_capacity(observations.len());

        for obs in observations {
            let id = self.assign_id(&obs);
            matched_ids.push(id);
            assigned.push((id, obs));
        }

        // Advance miss counters for every tracked hand not matched this frame.
        for hand in &mut self.tracked {
            if !matched_ids.contains(&hand.id) {
                hand.miss_count += 1;
            }
        }

        let retired: Vec<HandId> = self
            .tracked
            .iter()
            .filter(|h| h.miss_count >= self.config.miss_frames_to_retire)
            .map(|h| h.id)
            .collect();
        self.tracked.retain(|h| !retired.contains(&h.id));

        (assigned, retired)
    }

    fn assign_id(&mut self, obs: &HandObservation) -> HandId {
        let wrist = obs.wrist();
        let wrist_xy = (wrist.x, wrist.y);

        // 1. Honor the extractor's own tracking id if we've already seen it.
        if let Some(tracking_id) = obs.tracking_id {
            if let Some(hand) = self
                .tracked
                .iter_mut()
                .find(|h| h.tracking_id == Some(tracking_id))
            {
                hand.last_wrist = wrist_xy;
                hand.miss_count = 0;
                return hand.id;
            }
        }

        // 2. Otherwise match to the closest active hand within threshold.
        let threshold = self.config.hand_match_distance_threshold;
        let closest = self
            .tracked
            .iter_mut()
            .map(|h| {
                let dx = h.last_wrist.0 - wrist_xy.0;
                let dy = h.last_wrist.1 - wrist_xy.1;
                (h, (dx * dx + dy * dy).sqrt())
            })
            .filter(|(_, dist)| *dist <= threshold)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        if let Some((hand, _)) = closest {
            hand.last_wrist = wrist_xy;
            hand.tracking_id = obs.tracking_id;
            hand.miss_count = 0;
            return hand.id;
        }

        // 3. No match: allocate the lowest free id in {0,1}.
        let used: Vec<u8> = self.tracked.iter().map(|h| h.id.0).collect();
        let new_id = HandId(if used.contains(&0) { 1 } else { 0 });
        self.tracked.push(TrackedHand {
            id: new_id,
            last_wrist: wrist_xy,
            tracking_id: obs.tracking_id,
            miss_count: 0,
        });
        new_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Handedness, Landmark, LANDMARK_COUNT};

    fn obs_at(x: f32, y: f32, score: f32, tracking_id: Option<u64>) -> HandObservation {
        let mut landmarks = [Landmark::default(); LANDMARK_COUNT];
        landmarks[0] = Landmark::new(x, y, 0.0);
        HandObservation {
            landmarks,
            handedness: Handedness::Right,
            score,
            tracking_id,
        }
    }

    #[test]
    fn first_observation_gets_id_zero() {
        let mut intake = Intake::new(IntakeConfig::default());
        let (assigned, _) = intake.process_frame(vec![obs_at(0.5, 0.5, 0.9, None)]);
        assert_eq!(assigned[0].0, HandId(0));
    }

    #[test]
    fn two_hands_get_distinct_ids() {
        let mut intake = Intake::new(IntakeConfig::default());
        let (assigned, _) = intake.process_frame(vec![
            obs_at(0.2, 0.5, 0.9, None),
            obs_at(0.8, 0.5, 0.9, None),
        ]);
        let mut ids: Vec<u8> = assigned.iter().map(|(id, _)| id.0).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1]);
    }

    #[test]
    fn close_wrist_reuses_same_id_across_frames() {
        let mut intake = Intake::new(IntakeConfig::default());
        let (a1, _) = intake.process_frame(vec![obs_at(0.50, 0.50, 0.9, None)]);
        let id1 = a1[0].0;
        let (a2, _) = intake.process_frame(vec![obs_at(0.51, 0.51, 0.9, None)]);
        assert_eq!(a2[0].0, id1);
    }

    #[test]
    fn far_wrist_allocates_new_id() {
        let mut intake = Intake::new(IntakeConfig::default());
        intake.process_frame(vec![obs_at(0.1, 0.1, 0.9, None)]);
        let (a2, _) = intake.process_frame(vec![obs_at(0.9, 0.9, 0.9, None)]);
        // Far beyond the 0.15 threshold: a fresh id, not a reuse.
        assert_eq!(a2[0].0, HandId(1));
    }

    #[test]
    fn more_than_two_observations_keeps_highest_score() {
        let mut intake = Intake::new(IntakeConfig::default());
        let (assigned, _) = intake.process_frame(vec![
            obs_at(0.1, 0.1, 0.3, None),
            obs_at(0.5, 0.5, 0.9, None),
            obs_at(0.9, 0.9, 0.7, None),
        ]);
        assert_eq!(assigned.len(), 2);
        let scores: Vec<f32> = assigned.iter().map(|(_, o)| o.score).collect();
        assert!(!scores.contains(&0.3));
    }

    #[test]
    fn retirement_exactly_at_threshold_releases_id() {
        let mut cfg = IntakeConfig::default();
        cfg.miss_frames_to_retire = 3;
        let mut intake = Intake::new(cfg);
        intake.process_frame(vec![obs_at(0.5, 0.5, 0.9, None)]);

        // Two misses: not yet retired.
        intake.process_frame(vec![]);
        let (_, retired) = intake.process_frame(vec![]);
        assert!(retired.is_empty());

        // Third consecutive miss: retired.
        let (_, retired) = intake.process_frame(vec![]);
        assert_eq!(retired, vec![HandId(0)]);
    }

    #[test]
    fn tracking_id_is_honored_over_distance_matching() {
        let mut intake = Intake::new(IntakeConfig::default());
        // Tracking id 7 has no relation to the internal slot id (0 or 1);
        // picked deliberately to catch a match against `HandId.0` instead of
        // the extractor's actual tracking id.
        let (first, _) = intake.process_frame(vec![obs_at(0.1, 0.1, 0.9, Some(7))]);
        let hand_id = first[0].0;
        // Wrist moved far, but the extractor reports the same tracking id.
        let (assigned, _) = intake.process_frame(vec![obs_at(0.9, 0.9, 0.9, Some(7))]);
        assert_eq!(assigned[0].0, hand_id);
    }
}
