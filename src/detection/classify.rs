//! Decision tables mapping kinematic features to a strike type.

use crate::models::{Side, StrikeType, Trajectory};

pub fn classify_punch(trajectory: Trajectory, elbow_angle: f64, side: Side) -> StrikeType {
    match trajectory {
        Trajectory::Upward if (60.0..=100.0).contains(&elbow_angle) => StrikeType::Uppercut,
        Trajectory::Circular if (70.0..=110.0).contains(&elbow_angle) => StrikeType::Hook,
        Trajectory::Straight if elbow_angle >= 140.0 => match side {
            Side::Left => StrikeType::Jab,
            Side::Right => StrikeType::Cross,
        },
        _ => StrikeType::Jab,
    }
}

/// `hip_angle` is `None` when the shoulder needed to measure it is missing.
pub fn classify_kick(trajectory: Trajectory, knee_angle: f64, hip_angle: Option<f64>) -> StrikeType {
    if trajectory == Trajectory::Circular {
        StrikeType::RoundhouseKick
    } else if trajectory == Trajectory::Straight && knee_angle >= 140.0 {
        StrikeType::FrontKick
    } else if hip_angle.is_some_and(|angle| angle > 90.0) {
        StrikeType::SideKick
    } else {
        StrikeType::FrontKick
    }
}

pub fn classify_elbow(trajectory: Trajectory) -> StrikeType {
    match trajectory {
        Trajectory::Circular => StrikeType::SpinningElbow,
        _ => StrikeType::Elbow,
    }
}
