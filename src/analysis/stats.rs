use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{AiVerificationResult, DetectedStrike, Side, StrikeCategory};

/// Summary of a finished analysis, always recomputed from the final sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStats {
    pub total_strikes: usize,
    pub punches: usize,
    pub kicks: usize,
    pub knees: usize,
    pub elbows: usize,
    pub clinches: usize,
    pub left_side: usize,
    pub right_side: usize,
    pub average_confidence: f64,
    pub verified: usize,
    pub correct_technique: usize,
}

impl AnalysisStats {
    pub fn compute(strikes: &[DetectedStrike], verifications: &[AiVerificationResult]) -> Self {
        let count = |category: StrikeCategory| strikes.iter().filter(|s| s.category == category).count();
        let side = |side: Side| strikes.iter().filter(|s| s.side == side).count();

        let average_confidence = if strikes.is_empty() {
            0.0
        } else {
            strikes.iter().map(|s| s.confidence).sum::<f64>() / strikes.len() as f64
        };

        // Verdicts for strikes removed since verification do not count.
        let ids: HashSet<&str> = strikes.iter().map(|s| s.id.as_str()).collect();
        let correct_technique = verifications
            .iter()
            .filter(|v| v.is_correct_technique && ids.contains(v.strike_id.as_str()))
            .count();

        Self {
            total_strikes: strikes.len(),
            punches: count(StrikeCategory::Punch),
            kicks: count(StrikeCategory::Kick),
            knees: count(StrikeCategory::Knee),
            elbows: count(StrikeCategory::Elbow),
            clinches: count(StrikeCategory::Clinch),
            left_side: side(Side::Left),
            right_side: side(Side::Right),
            average_confidence,
            verified: strikes.iter().filter(|s| s.is_verified).count(),
            correct_technique,
        }
    }
}
