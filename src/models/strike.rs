use serde::{Deserialize, Serialize};

use super::landmark::{joints, Landmark, PoseFrame};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrikeType {
    Jab,
    Cross,
    Hook,
    Uppercut,
    FrontKick,
    RoundhouseKick,
    SideKick,
    BackKick,
    Knee,
    FlyingKnee,
    Elbow,
    SpinningElbow,
    Clinch,
}

impl StrikeType {
    pub fn category(&self) -> StrikeCategory {
        match self {
            StrikeType::Jab | StrikeType::Cross | StrikeType::Hook | StrikeType::Uppercut => {
                StrikeCategory::Punch
            }
            StrikeType::FrontKick
            | StrikeType::RoundhouseKick
            | StrikeType::SideKick
            | StrikeType::BackKick => StrikeCategory::Kick,
            StrikeType::Knee | StrikeType::FlyingKnee => StrikeCategory::Knee,
            StrikeType::Elbow | StrikeType::SpinningElbow => StrikeCategory::Elbow,
            StrikeType::Clinch => StrikeCategory::Clinch,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StrikeType::Jab => "jab",
            StrikeType::Cross => "cross",
            StrikeType::Hook => "hook",
            StrikeType::Uppercut => "uppercut",
            StrikeType::FrontKick => "front_kick",
            StrikeType::RoundhouseKick => "roundhouse_kick",
            StrikeType::SideKick => "side_kick",
            StrikeType::BackKick => "back_kick",
            StrikeType::Knee => "knee",
            StrikeType::FlyingKnee => "flying_knee",
            StrikeType::Elbow => "elbow",
            StrikeType::SpinningElbow => "spinning_elbow",
            StrikeType::Clinch => "clinch",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum StrikeCategory {
    Punch,
    Kick,
    Knee,
    Elbow,
    Clinch,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Left, Side::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Trajectory {
    Straight,
    Circular,
    Upward,
    Downward,
}

/// The six joints of one body side at the moment a strike was detected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimbSnapshot {
    pub shoulder: Option<Landmark>,
    pub elbow: Option<Landmark>,
    pub wrist: Option<Landmark>,
    pub hip: Option<Landmark>,
    pub knee: Option<Landmark>,
    pub ankle: Option<Landmark>,
}

impl LimbSnapshot {
    pub fn capture(frame: &PoseFrame, side: Side) -> Self {
        let pick = |left: usize, right: usize| {
            let index = match side {
                Side::Left => left,
                Side::Right => right,
            };
            frame.landmark(index).copied()
        };

        Self {
            shoulder: pick(joints::LEFT_SHOULDER, joints::RIGHT_SHOULDER),
            elbow: pick(joints::LEFT_ELBOW, joints::RIGHT_ELBOW),
            wrist: pick(joints::LEFT_WRIST, joints::RIGHT_WRIST),
            hip: pick(joints::LEFT_HIP, joints::RIGHT_HIP),
            knee: pick(joints::LEFT_KNEE, joints::RIGHT_KNEE),
            ankle: pick(joints::LEFT_ANKLE, joints::RIGHT_ANKLE),
        }
    }
}

/// A classified strike. Classification fields never change after
/// detection; only `is_verified` is toggled later.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedStrike {
    pub id: String,
    #[serde(rename = "type")]
    pub strike_type: StrikeType,
    pub category: StrikeCategory,
    pub side: Side,
    pub timestamp: f64,
    pub confidence: f64,
    pub velocity: f64,
    pub trajectory: Trajectory,
    pub landmarks: LimbSnapshot,
    pub is_verified: bool,
}
