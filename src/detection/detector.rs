use uuid::Uuid;

use crate::kinematics::{angle, distance};
use crate::models::{
    joints, DetectedStrike, Landmark, LimbSnapshot, PoseFrame, Side, StrikeType, Trajectory,
};

use super::classify::{classify_elbow, classify_kick, classify_punch};
use super::config::DetectorConfig;
use super::history::PoseHistory;
use super::trajectory::analyze_trajectory;

// Per-frame hot path; flip on when tuning thresholds.
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info};

/// Joint indices of one body side.
#[derive(Debug, Clone, Copy)]
struct Limbs {
    shoulder: usize,
    elbow: usize,
    wrist: usize,
    hip: usize,
    knee: usize,
    ankle: usize,
}

impl Limbs {
    fn of(side: Side) -> Self {
        match side {
            Side::Left => Self {
                shoulder: joints::LEFT_SHOULDER,
                elbow: joints::LEFT_ELBOW,
                wrist: joints::LEFT_WRIST,
                hip: joints::LEFT_HIP,
                knee: joints::LEFT_KNEE,
                ankle: joints::LEFT_ANKLE,
            },
            Side::Right => Self {
                shoulder: joints::RIGHT_SHOULDER,
                elbow: joints::RIGHT_ELBOW,
                wrist: joints::RIGHT_WRIST,
                hip: joints::RIGHT_HIP,
                knee: joints::RIGHT_KNEE,
                ankle: joints::RIGHT_ANKLE,
            },
        }
    }
}

/// Classification outcome for one limb, before it becomes a strike.
struct Candidate {
    strike_type: StrikeType,
    side: Side,
    velocity: f64,
    threshold: f64,
    trajectory: Trajectory,
}

/// Per-session strike detection engine.
///
/// Owns its pose history, cooldown clock and strike list, so independent
/// sessions (one per camera) never share state. Frames must arrive in
/// increasing timestamp order.
///
/// The cooldown is measured on the frame timestamps, not the wall clock.
/// Live callers must pass monotonic capture times in seconds (for example
/// elapsed time since the camera started) for the debounce to hold.
pub struct StrikeDetector {
    config: DetectorConfig,
    history: PoseHistory,
    /// Session time of the last emitted strike, the cooldown reference.
    last_strike_at: Option<f64>,
    strikes: Vec<DetectedStrike>,
    /// Strikes emitted since the last `drain_events`.
    events: Vec<DetectedStrike>,
}

impl StrikeDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            history: PoseHistory::new(config.history_size),
            config,
            last_strike_at: None,
            strikes: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Feeds one landmark frame and returns the strikes it triggered.
    ///
    /// Arms and legs on both sides are judged independently, so a single
    /// tick can produce a combination (e.g. jab and kick together). On one
    /// side an elbow strike pre-empts the punch check and a kick pre-empts
    /// the knee check.
    pub fn ingest(&mut self, landmarks: Vec<Landmark>, timestamp: f64) -> Vec<DetectedStrike> {
        if let Some(last) = self.last_strike_at {
            if timestamp - last < self.config.cooldown_secs() {
                return Vec::new();
            }
        }

        self.history.push(PoseFrame::new(landmarks, timestamp));
        if self.history.len() < self.config.min_history {
            return Vec::new();
        }

        let dt = match (self.history.latest(), self.history.previous()) {
            (Some(current), Some(previous)) => current.timestamp - previous.timestamp,
            _ => return Vec::new(),
        };
        if dt <= 0.0 {
            log_debug!("skipping frame at {timestamp:.3}s: non-increasing timestamp");
            return Vec::new();
        }

        let mut candidates = Vec::new();
        for side in Side::BOTH {
            let limbs = Limbs::of(side);

            let elbow = if self.config.detect_elbows {
                self.check_elbow(side, limbs, dt)
            } else {
                None
            };
            let punch = if self.config.detect_punches && elbow.is_none() {
                self.check_punch(side, limbs, dt)
            } else {
                None
            };

            let kick = if self.config.detect_kicks {
                self.check_kick(side, limbs, dt)
            } else {
                None
            };
            let knee = if self.config.detect_knees && kick.is_none() {
                self.check_knee(side, limbs, dt)
            } else {
                None
            };

            candidates.extend([elbow, punch, kick, knee].into_iter().flatten());
        }

        if candidates.is_empty() {
            return Vec::new();
        }

        let emitted: Vec<DetectedStrike> = candidates
            .into_iter()
            .filter_map(|candidate| self.emit(candidate, timestamp))
            .collect();

        if !emitted.is_empty() {
            self.last_strike_at = Some(timestamp);
        }
        emitted
    }

    fn emit(&mut self, candidate: Candidate, timestamp: f64) -> Option<DetectedStrike> {
        let frame = self.history.latest()?;
        let strike = DetectedStrike {
            id: Uuid::new_v4().to_string(),
            strike_type: candidate.strike_type,
            category: candidate.strike_type.category(),
            side: candidate.side,
            timestamp,
            confidence: (candidate.velocity / candidate.threshold).min(1.0),
            velocity: candidate.velocity,
            trajectory: candidate.trajectory,
            landmarks: LimbSnapshot::capture(frame, candidate.side),
            is_verified: false,
        };

        log_info!(
            "Detected {} ({}) at {:.3}s, velocity={:.3}, confidence={:.2}",
            strike.strike_type.as_str(),
            strike.side.as_str(),
            strike.timestamp,
            strike.velocity,
            strike.confidence
        );

        self.strikes.push(strike.clone());
        self.events.push(strike.clone());
        Some(strike)
    }

    /// Speed of one joint between the previous and current frame, or `None`
    /// when either frame lacks it.
    fn joint_velocity(&self, joint: usize, dt: f64) -> Option<f64> {
        let current = self.history.latest()?.landmark(joint)?;
        let previous = self.history.previous()?.landmark(joint)?;
        Some(distance(previous, current) / dt)
    }

    fn current_joint(&self, joint: usize) -> Option<&Landmark> {
        self.history.latest()?.landmark(joint)
    }

    fn exceeds(velocity: f64, threshold: f64) -> bool {
        velocity > threshold && velocity > 0.0
    }

    fn check_punch(&self, side: Side, limbs: Limbs, dt: f64) -> Option<Candidate> {
        let threshold = self.config.thresholds.punch;
        let velocity = self.joint_velocity(limbs.wrist, dt)?;
        if !Self::exceeds(velocity, threshold) {
            return None;
        }

        let (Some(shoulder), Some(elbow), Some(wrist)) = (
            self.current_joint(limbs.shoulder),
            self.current_joint(limbs.elbow),
            self.current_joint(limbs.wrist),
        ) else {
            log_debug!("{} punch check skipped: arm joints missing", side.as_str());
            return None;
        };

        let elbow_angle = angle(shoulder, elbow, wrist);
        let trajectory = analyze_trajectory(&self.history, limbs.wrist, &self.config);

        Some(Candidate {
            strike_type: classify_punch(trajectory, elbow_angle, side),
            side,
            velocity,
            threshold,
            trajectory,
        })
    }

    fn check_kick(&self, side: Side, limbs: Limbs, dt: f64) -> Option<Candidate> {
        let threshold = self.config.thresholds.kick;
        let velocity = self.joint_velocity(limbs.ankle, dt)?;
        if !Self::exceeds(velocity, threshold) {
            return None;
        }

        let (Some(hip), Some(knee), Some(ankle)) = (
            self.current_joint(limbs.hip),
            self.current_joint(limbs.knee),
            self.current_joint(limbs.ankle),
        ) else {
            log_debug!("{} kick check skipped: leg joints missing", side.as_str());
            return None;
        };

        let knee_angle = angle(hip, knee, ankle);
        let hip_angle = self
            .current_joint(limbs.shoulder)
            .map(|shoulder| angle(shoulder, hip, knee));
        let trajectory = analyze_trajectory(&self.history, limbs.ankle, &self.config);

        Some(Candidate {
            strike_type: classify_kick(trajectory, knee_angle, hip_angle),
            side,
            velocity,
            threshold,
            trajectory,
        })
    }

    /// An elbow strike drives the elbow while the forearm stays locked, so
    /// the elbow has to outpace the wrist by `elbow_wrist_ratio`.
    fn check_elbow(&self, side: Side, limbs: Limbs, dt: f64) -> Option<Candidate> {
        let threshold = self.config.thresholds.elbow;
        let velocity = self.joint_velocity(limbs.elbow, dt)?;
        if !Self::exceeds(velocity, threshold) {
            return None;
        }

        let Some(wrist_velocity) = self.joint_velocity(limbs.wrist, dt) else {
            log_debug!("{} elbow check skipped: wrist missing", side.as_str());
            return None;
        };
        if velocity < self.config.elbow_wrist_ratio * wrist_velocity {
            return None;
        }

        let trajectory = analyze_trajectory(&self.history, limbs.elbow, &self.config);

        Some(Candidate {
            strike_type: classify_elbow(trajectory),
            side,
            velocity,
            threshold,
            trajectory,
        })
    }

    /// Knee strikes are rapid upward knee drives: the knee has to be moving
    /// toward the top of the frame.
    fn check_knee(&self, side: Side, limbs: Limbs, dt: f64) -> Option<Candidate> {
        let threshold = self.config.thresholds.knee;
        let velocity = self.joint_velocity(limbs.knee, dt)?;
        if !Self::exceeds(velocity, threshold) {
            return None;
        }

        let current = self.current_joint(limbs.knee)?;
        let previous = self.history.previous()?.landmark(limbs.knee)?;
        if current.y >= previous.y {
            return None;
        }

        let trajectory = analyze_trajectory(&self.history, limbs.knee, &self.config);

        Some(Candidate {
            strike_type: StrikeType::Knee,
            side,
            velocity,
            threshold,
            trajectory,
        })
    }

    /// Strikes emitted since the previous call, in emission order.
    pub fn drain_events(&mut self) -> Vec<DetectedStrike> {
        std::mem::take(&mut self.events)
    }

    pub fn strikes(&self) -> &[DetectedStrike] {
        &self.strikes
    }

    pub fn strike(&self, strike_id: &str) -> Option<&DetectedStrike> {
        self.strikes.iter().find(|s| s.id == strike_id)
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Sets the verification flag of a strike. Returns `false` for unknown ids.
    pub fn verify(&mut self, strike_id: &str, verified: bool) -> bool {
        match self.strikes.iter_mut().find(|s| s.id == strike_id) {
            Some(strike) => {
                strike.is_verified = verified;
                true
            }
            None => false,
        }
    }

    /// Drops a strike flagged as a false positive. Removing an id twice is a
    /// no-op the second time.
    pub fn remove(&mut self, strike_id: &str) -> Option<DetectedStrike> {
        let index = self.strikes.iter().position(|s| s.id == strike_id)?;
        Some(self.strikes.remove(index))
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.strikes.clear();
        self.events.clear();
        self.last_strike_at = None;
    }
}

impl Default for StrikeDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{StrikeCategory, Trajectory};

    /// Guard stance with every joint still; tests move individual joints.
    fn stance() -> Vec<Landmark> {
        let mut landmarks = vec![Landmark::new(0.5, 0.5); joints::LANDMARK_COUNT];
        let mut set = |i: usize, x: f64, y: f64| landmarks[i] = Landmark::new(x, y);
        set(joints::LEFT_SHOULDER, 0.40, 0.30);
        set(joints::RIGHT_SHOULDER, 0.60, 0.30);
        set(joints::LEFT_ELBOW, 0.35, 0.40);
        set(joints::RIGHT_ELBOW, 0.65, 0.40);
        set(joints::LEFT_WRIST, 0.35, 0.50);
        set(joints::RIGHT_WRIST, 0.65, 0.50);
        set(joints::LEFT_HIP, 0.45, 0.60);
        set(joints::RIGHT_HIP, 0.55, 0.60);
        set(joints::LEFT_KNEE, 0.45, 0.75);
        set(joints::RIGHT_KNEE, 0.55, 0.75);
        set(joints::LEFT_ANKLE, 0.45, 0.90);
        set(joints::RIGHT_ANKLE, 0.55, 0.90);
        landmarks
    }

    /// Right arm extended horizontally with the wrist at `wrist_x`.
    fn right_arm_extended(wrist_x: f64) -> Vec<Landmark> {
        let mut landmarks = stance();
        landmarks[joints::RIGHT_SHOULDER] = Landmark::new(0.1, 0.5);
        landmarks[joints::RIGHT_ELBOW] = Landmark::new(0.2, 0.5);
        landmarks[joints::RIGHT_WRIST] = Landmark::new(wrist_x, 0.5);
        landmarks
    }

    fn detector() -> StrikeDetector {
        StrikeDetector::new(DetectorConfig::default())
    }

    #[test]
    fn fast_right_straight_punch_is_a_cross() {
        let mut detector = detector();
        assert!(detector.ingest(right_arm_extended(0.25), 0.00).is_empty());
        assert!(detector.ingest(right_arm_extended(0.30), 0.05).is_empty());
        let strikes = detector.ingest(right_arm_extended(0.60), 0.10);

        assert_eq!(strikes.len(), 1);
        let strike = &strikes[0];
        assert_eq!(strike.strike_type, StrikeType::Cross);
        assert_eq!(strike.category, StrikeCategory::Punch);
        assert_eq!(strike.side, Side::Right);
        assert_eq!(strike.trajectory, Trajectory::Straight);
        assert!((strike.velocity - 6.0).abs() < 1e-9);
        assert_eq!(strike.confidence, 1.0);
        assert!(!strike.is_verified);
        assert_eq!(strike.landmarks.wrist, Some(Landmark::new(0.60, 0.5)));
    }

    #[test]
    fn nothing_is_classified_before_three_frames() {
        let mut detector = detector();
        assert!(detector.ingest(right_arm_extended(0.2), 0.00).is_empty());
        assert!(detector.ingest(right_arm_extended(0.9), 0.05).is_empty());
        assert_eq!(detector.history_len(), 2);
        assert!(detector.strikes().is_empty());
    }

    #[test]
    fn second_punch_inside_cooldown_is_suppressed() {
        let mut detector = detector();
        detector.ingest(right_arm_extended(0.25), 0.00);
        detector.ingest(right_arm_extended(0.30), 0.05);
        assert_eq!(detector.ingest(right_arm_extended(0.60), 0.10).len(), 1);

        // 50ms later, inside the 150ms medium cooldown.
        assert!(detector.ingest(right_arm_extended(0.95), 0.15).is_empty());
        assert_eq!(detector.strikes().len(), 1);

        // Past the window the detector listens again.
        assert_eq!(detector.ingest(right_arm_extended(0.30), 0.30).len(), 1);
        assert_eq!(detector.strikes().len(), 2);
    }

    #[test]
    fn cooldown_runs_on_frame_timestamps() {
        let mut detector = detector();
        detector.ingest(right_arm_extended(0.25), 10.00);
        detector.ingest(right_arm_extended(0.30), 10.05);
        assert_eq!(detector.ingest(right_arm_extended(0.60), 10.10).len(), 1);

        // Fed back to back, but half a second apart on the capture clock.
        assert_eq!(detector.ingest(right_arm_extended(0.25), 10.60).len(), 1);
    }

    #[test]
    fn elbow_outpacing_wrist_is_an_elbow_not_a_punch() {
        let mut detector = detector();
        for step in 0..3 {
            let t = step as f64;
            let mut landmarks = stance();
            landmarks[joints::LEFT_ELBOW] = Landmark::new(0.35 + 0.05 * t, 0.40);
            landmarks[joints::LEFT_WRIST] = Landmark::new(0.35 + 0.02 * t, 0.50);
            let strikes = detector.ingest(landmarks, t);
            if step < 2 {
                assert!(strikes.is_empty());
            } else {
                assert_eq!(strikes.len(), 1);
                assert_eq!(strikes[0].strike_type, StrikeType::Elbow);
                assert_eq!(strikes[0].side, Side::Left);
                assert!((strikes[0].velocity - 0.05).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn elbow_moving_with_wrist_is_not_an_elbow() {
        let mut config = DetectorConfig::default();
        config.detect_punches = false;
        let mut detector = StrikeDetector::new(config);
        for step in 0..3 {
            let t = step as f64;
            let mut landmarks = stance();
            landmarks[joints::LEFT_ELBOW] = Landmark::new(0.35 + 0.05 * t, 0.40);
            landmarks[joints::LEFT_WRIST] = Landmark::new(0.35 + 0.05 * t, 0.50);
            assert!(detector.ingest(landmarks, t).is_empty());
        }
    }

    #[test]
    fn knee_must_drive_upward() {
        let run = |dy: f64| {
            let mut detector = detector();
            let mut last = Vec::new();
            for step in 0..3 {
                let t = step as f64;
                let mut landmarks = stance();
                landmarks[joints::RIGHT_KNEE] = Landmark::new(0.55, 0.75 + dy * t);
                last = detector.ingest(landmarks, t);
            }
            last
        };

        let upward = run(-0.05);
        assert_eq!(upward.len(), 1);
        assert_eq!(upward[0].strike_type, StrikeType::Knee);
        assert_eq!(upward[0].trajectory, Trajectory::Upward);

        assert!(run(0.05).is_empty());
    }

    #[test]
    fn circular_ankle_path_is_a_roundhouse() {
        let mut detector = detector();
        let path = [(0.55, 0.90), (0.65, 0.80), (0.80, 0.70), (0.65, 0.60), (0.55, 0.55)];
        let mut last = Vec::new();
        for (step, (x, y)) in path.iter().enumerate() {
            let mut landmarks = stance();
            landmarks[joints::RIGHT_ANKLE] = Landmark::new(*x, *y);
            last = detector.ingest(landmarks, step as f64);
        }

        assert_eq!(last.len(), 1);
        assert_eq!(last[0].strike_type, StrikeType::RoundhouseKick);
        assert_eq!(last[0].category, StrikeCategory::Kick);
    }

    #[test]
    fn simultaneous_punch_and_kick_are_both_recorded() {
        let mut detector = detector();
        for step in 0..3 {
            let t = step as f64 * 0.05;
            let mut landmarks = right_arm_extended(0.25 + 0.1 * step as f64);
            landmarks[joints::LEFT_ANKLE] = Landmark::new(0.45 + 0.1 * step as f64, 0.90);
            let strikes = detector.ingest(landmarks, t);
            if step == 2 {
                let categories: Vec<StrikeCategory> = strikes.iter().map(|s| s.category).collect();
                assert_eq!(categories.len(), 2);
                assert!(categories.contains(&StrikeCategory::Punch));
                assert!(categories.contains(&StrikeCategory::Kick));
            }
        }
    }

    #[test]
    fn disabled_categories_are_ignored() {
        let mut config = DetectorConfig::default();
        config.detect_punches = false;
        let mut detector = StrikeDetector::new(config);
        detector.ingest(right_arm_extended(0.25), 0.00);
        detector.ingest(right_arm_extended(0.30), 0.05);
        assert!(detector.ingest(right_arm_extended(0.60), 0.10).is_empty());
    }

    #[test]
    fn missing_joint_only_skips_that_limb() {
        let mut detector = detector();
        for step in 0..3 {
            let t = step as f64 * 0.05;
            let mut landmarks = stance();
            landmarks[joints::LEFT_WRIST] = Landmark::new(0.35 - 0.1 * step as f64, 0.50);
            landmarks[joints::RIGHT_WRIST] = Landmark::new(0.65 + 0.1 * step as f64, 0.50);
            landmarks[joints::RIGHT_SHOULDER].x = f64::NAN;
            let strikes = detector.ingest(landmarks, t);
            if step == 2 {
                assert_eq!(strikes.len(), 1);
                assert_eq!(strikes[0].side, Side::Left);
            }
        }
    }

    #[test]
    fn truncated_landmark_list_does_not_panic() {
        let mut detector = detector();
        for step in 0..4 {
            let landmarks = stance()[..joints::RIGHT_WRIST].to_vec();
            assert!(detector.ingest(landmarks, step as f64).is_empty());
        }
    }

    #[test]
    fn duplicate_timestamp_is_skipped() {
        let mut detector = detector();
        detector.ingest(right_arm_extended(0.25), 0.00);
        detector.ingest(right_arm_extended(0.30), 0.05);
        assert!(detector.ingest(right_arm_extended(0.60), 0.05).is_empty());
    }

    #[test]
    fn drain_events_returns_each_strike_once() {
        let mut detector = detector();
        detector.ingest(right_arm_extended(0.25), 0.00);
        detector.ingest(right_arm_extended(0.30), 0.05);
        detector.ingest(right_arm_extended(0.60), 0.10);

        let events = detector.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0], detector.strikes()[0]);
        assert!(detector.drain_events().is_empty());
    }

    #[test]
    fn remove_is_idempotent_and_keeps_other_ids() {
        let mut detector = detector();
        detector.ingest(right_arm_extended(0.25), 0.00);
        detector.ingest(right_arm_extended(0.30), 0.05);
        detector.ingest(right_arm_extended(0.60), 0.10);
        detector.ingest(right_arm_extended(0.30), 0.30);
        let ids: Vec<String> = detector.strikes().iter().map(|s| s.id.clone()).collect();
        assert_eq!(ids.len(), 2);

        assert!(detector.remove(&ids[0]).is_some());
        assert!(detector.remove(&ids[0]).is_none());
        assert_eq!(detector.strikes().len(), 1);
        assert_eq!(detector.strikes()[0].id, ids[1]);
    }

    #[test]
    fn verify_toggles_only_the_flag() {
        let mut detector = detector();
        detector.ingest(right_arm_extended(0.25), 0.00);
        detector.ingest(right_arm_extended(0.30), 0.05);
        detector.ingest(right_arm_extended(0.60), 0.10);
        let before = detector.strikes()[0].clone();

        assert!(detector.verify(&before.id, true));
        assert!(!detector.verify("unknown", true));

        let after = detector.strike(&before.id).unwrap();
        assert!(after.is_verified);
        assert_eq!(after.strike_type, before.strike_type);
        assert_eq!(after.confidence, before.confidence);
    }

    #[test]
    fn reset_clears_history_strikes_and_cooldown() {
        let mut detector = detector();
        detector.ingest(right_arm_extended(0.25), 0.00);
        detector.ingest(right_arm_extended(0.30), 0.05);
        detector.ingest(right_arm_extended(0.60), 0.10);
        detector.reset();

        assert_eq!(detector.history_len(), 0);
        assert!(detector.strikes().is_empty());
        assert!(detector.drain_events().is_empty());

        // Cooldown no longer applies right after the reset.
        detector.ingest(right_arm_extended(0.25), 0.11);
        detector.ingest(right_arm_extended(0.30), 0.16);
        assert_eq!(detector.ingest(right_arm_extended(0.60), 0.21).len(), 1);
    }
}
