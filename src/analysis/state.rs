use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AiVerificationResult, DetectedStrike};

use super::stats::AnalysisStats;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AnalysisPhase {
    #[default]
    Idle,
    Loading,
    Analyzing,
    Verifying,
    Complete,
}

impl AnalysisPhase {
    pub fn is_running(&self) -> bool {
        matches!(
            self,
            AnalysisPhase::Loading | AnalysisPhase::Analyzing | AnalysisPhase::Verifying
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisPhase::Idle => "idle",
            AnalysisPhase::Loading => "loading",
            AnalysisPhase::Analyzing => "analyzing",
            AnalysisPhase::Verifying => "verifying",
            AnalysisPhase::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisProgress {
    pub phase: AnalysisPhase,
    /// Overall progress, 0 to 100
    pub progress: f64,
    pub frames_processed: usize,
    pub total_frames: usize,
    pub strikes_detected: usize,
    /// Video time of the last sampled frame
    pub current_time: f64,
    pub started_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub strikes: Vec<DetectedStrike>,
    pub verifications: Vec<AiVerificationResult>,
    pub stats: AnalysisStats,
    /// Set when the scan succeeded but AI verification did not.
    pub verification_error: Option<String>,
    pub video_duration: f64,
    pub frames_analyzed: usize,
    pub analyzed_at: DateTime<Utc>,
}

/// Broadcast to subscribers while a session runs.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum AnalysisEvent {
    PhaseChanged { phase: AnalysisPhase },
    Progress(AnalysisProgress),
    StrikeDetected(DetectedStrike),
}

/// Everything the orchestrator caches between calls.
#[derive(Debug, Default)]
pub(super) struct AnalysisState {
    pub progress: AnalysisProgress,
    pub result: Option<AnalysisResult>,
    pub error: Option<String>,
}

impl AnalysisState {
    pub fn begin(&mut self) {
        *self = Self {
            progress: AnalysisProgress {
                phase: AnalysisPhase::Loading,
                started_at: Some(Utc::now()),
                ..AnalysisProgress::default()
            },
            result: None,
            error: None,
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}
