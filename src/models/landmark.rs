//! Pose landmark data model.
//!
//! Coordinates are normalized to [0, 1] relative to the frame, with `y`
//! growing toward the bottom of the image.

use serde::{Deserialize, Serialize};

/// Indices into the 33-point body layout produced by the pose service.
pub mod joints {
    pub const LANDMARK_COUNT: usize = 33;

    pub const LEFT_SHOULDER: usize = 11;
    pub const RIGHT_SHOULDER: usize = 12;
    pub const LEFT_ELBOW: usize = 13;
    pub const RIGHT_ELBOW: usize = 14;
    pub const LEFT_WRIST: usize = 15;
    pub const RIGHT_WRIST: usize = 16;
    pub const LEFT_HIP: usize = 23;
    pub const RIGHT_HIP: usize = 24;
    pub const LEFT_KNEE: usize = 25;
    pub const RIGHT_KNEE: usize = 26;
    pub const LEFT_ANKLE: usize = 27;
    pub const RIGHT_ANKLE: usize = 28;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<f64>,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: 0.0,
            visibility: None,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// One body pose sample at a point in session time (seconds).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrame {
    pub landmarks: Vec<Landmark>,
    pub timestamp: f64,
}

impl PoseFrame {
    pub fn new(landmarks: Vec<Landmark>, timestamp: f64) -> Self {
        Self {
            landmarks,
            timestamp,
        }
    }

    /// Returns the landmark at `index`, or `None` when the pose service left
    /// it out or produced a non-finite coordinate.
    pub fn landmark(&self, index: usize) -> Option<&Landmark> {
        self.landmarks.get(index).filter(|lm| lm.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_nan_landmarks_are_absent() {
        let mut landmarks = vec![Landmark::new(0.5, 0.5); 12];
        landmarks[3].x = f64::NAN;
        let frame = PoseFrame::new(landmarks, 0.0);

        assert!(frame.landmark(2).is_some());
        assert!(frame.landmark(3).is_none());
        assert!(frame.landmark(joints::RIGHT_WRIST).is_none());
    }

    #[test]
    fn deserializes_without_z_or_visibility() {
        let lm: Landmark = serde_json::from_str(r#"{"x":0.25,"y":0.75}"#).unwrap();
        assert_eq!(lm, Landmark::new(0.25, 0.75));
    }
}
