//! Contract with the external AI verification service.
//!
//! Transport and authentication live behind [`VerificationService`]; the
//! crate only builds requests and reads verdicts.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::models::{AiVerificationResult, DetectedStrike, Side, StrikeCategory, StrikeType, Trajectory};

use super::snapshot::FrameSnapshot;

/// The classification being checked, without the landmark payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrikeSummary {
    pub strike_id: String,
    #[serde(rename = "type")]
    pub strike_type: StrikeType,
    pub category: StrikeCategory,
    pub side: Side,
    pub confidence: f64,
    pub trajectory: Trajectory,
}

impl From<&DetectedStrike> for StrikeSummary {
    fn from(strike: &DetectedStrike) -> Self {
        Self {
            strike_id: strike.id.clone(),
            strike_type: strike.strike_type,
            category: strike.category,
            side: strike.side,
            confidence: strike.confidence,
            trajectory: strike.trajectory,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationItem {
    /// PNG-encoded frame the strike was detected on
    pub image_data: Vec<u8>,
    pub timestamp: f64,
    pub detected_strike: StrikeSummary,
}

impl From<&FrameSnapshot> for VerificationItem {
    fn from(snapshot: &FrameSnapshot) -> Self {
        Self {
            image_data: snapshot.image_png.as_ref().clone(),
            timestamp: snapshot.timestamp,
            detected_strike: StrikeSummary::from(&snapshot.strike),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub frames: Vec<VerificationItem>,
}

impl VerificationRequest {
    pub fn from_snapshots(snapshots: &[FrameSnapshot]) -> Self {
        Self {
            frames: snapshots.iter().map(VerificationItem::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerificationResponse {
    pub verifications: Vec<AiVerificationResult>,
}

/// Remote verifier. Responses may list verdicts in any order.
#[async_trait]
pub trait VerificationService: Send + Sync {
    async fn verify_batch(&self, request: VerificationRequest) -> anyhow::Result<VerificationResponse>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}
