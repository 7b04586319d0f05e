use serde::{Deserialize, Serialize};

use super::strike::StrikeType;

/// Verdict returned by the AI verification service for one strike.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiVerificationResult {
    pub strike_id: String,
    pub is_valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_type: Option<StrikeType>,
    pub confidence: f64,
    #[serde(default)]
    pub technical_notes: String,
    pub is_correct_technique: bool,
}
