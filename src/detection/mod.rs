pub mod classify;
pub mod config;
pub mod detector;
pub mod history;
pub mod trajectory;

pub use config::{CooldownWindows, DetectorConfig, Sensitivity, VelocityThresholds};
pub use detector::StrikeDetector;
pub use history::PoseHistory;
pub use trajectory::analyze_trajectory;
