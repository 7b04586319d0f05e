pub mod landmark;
pub mod strike;
pub mod verification;

pub use landmark::{joints, Landmark, PoseFrame};
pub use strike::{DetectedStrike, LimbSnapshot, Side, StrikeCategory, StrikeType, Trajectory};
pub use verification::AiVerificationResult;
