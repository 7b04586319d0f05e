pub mod replay;
pub mod source;

pub use replay::{PoseRecording, RecordedPoseSource, RecordedVideo};
pub use source::{CapturedFrame, PoseSource, VideoSource};
