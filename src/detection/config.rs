use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sensitivity {
    Low,
    #[default]
    Medium,
    High,
}

/// Minimum joint speed (normalized units per second) that counts as a strike.
///
/// These are empirically tuned starting points, not physical constants.
/// Punches are the fastest limb motion, knees the slowest.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VelocityThresholds {
    pub punch: f64,
    pub kick: f64,
    pub elbow: f64,
    pub knee: f64,
}

impl Default for VelocityThresholds {
    fn default() -> Self {
        Self {
            punch: 0.03,
            kick: 0.025,
            elbow: 0.02,
            knee: 0.015,
        }
    }
}

/// Debounce window per sensitivity, in seconds of session time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CooldownWindows {
    pub low_secs: f64,
    pub medium_secs: f64,
    pub high_secs: f64,
}

impl Default for CooldownWindows {
    fn default() -> Self {
        Self {
            low_secs: 0.200,
            medium_secs: 0.150,
            high_secs: 0.100,
        }
    }
}

impl CooldownWindows {
    pub fn for_sensitivity(&self, sensitivity: Sensitivity) -> f64 {
        match sensitivity {
            Sensitivity::Low => self.low_secs,
            Sensitivity::Medium => self.medium_secs,
            Sensitivity::High => self.high_secs,
        }
    }
}

/// Detector tuning, fixed for the lifetime of a [`super::StrikeDetector`].
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    pub sensitivity: Sensitivity,
    pub detect_punches: bool,
    pub detect_kicks: bool,
    pub detect_knees: bool,
    pub detect_elbows: bool,

    pub thresholds: VelocityThresholds,
    pub cooldowns: CooldownWindows,

    /// Frames kept in the pose history ring buffer
    pub history_size: usize,
    /// Frames required before any classification happens
    pub min_history: usize,
    /// Joint positions inspected by trajectory analysis
    pub trajectory_window: usize,
    /// Midpoint horizontal deviation that makes a path circular
    pub circular_margin: f64,
    /// |dy| must exceed this multiple of |dx| for upward/downward paths
    pub vertical_dominance: f64,
    /// Elbow speed must be at least this multiple of wrist speed
    pub elbow_wrist_ratio: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            detect_punches: true,
            detect_kicks: true,
            detect_knees: true,
            detect_elbows: true,
            thresholds: VelocityThresholds::default(),
            cooldowns: CooldownWindows::default(),
            history_size: 10,
            min_history: 3,
            trajectory_window: 5,
            circular_margin: 0.1,
            vertical_dominance: 1.5,
            elbow_wrist_ratio: 1.5,
        }
    }
}

impl DetectorConfig {
    /// Minimum gap between strikes, compared against frame timestamps.
    pub fn cooldown_secs(&self) -> f64 {
        self.cooldowns.for_sensitivity(self.sensitivity)
    }
}
