//! Collaborator contracts: the pose-estimation service and the video being
//! scanned. Both are owned exclusively by one analysis session.

use async_trait::async_trait;
use image::DynamicImage;

use crate::models::PoseFrame;

/// A decoded frame at a point on the video timeline (seconds).
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    pub image: DynamicImage,
    pub timestamp: f64,
}

#[async_trait]
pub trait PoseSource: Send {
    /// Loads models and warms up. Called once per session.
    async fn initialize(&mut self) -> anyhow::Result<()>;

    /// Landmarks for the body in `frame`, or `None` when nobody is visible.
    async fn detect(&mut self, frame: &CapturedFrame) -> anyhow::Result<Option<PoseFrame>>;

    /// Provider name for logging.
    fn name(&self) -> &'static str;
}

#[async_trait]
pub trait VideoSource: Send {
    /// Length in seconds, `None` while unknown.
    fn duration(&self) -> Option<f64>;

    /// Moves the playhead; resolves once the frame at `time` is ready.
    async fn seek(&mut self, time: f64) -> anyhow::Result<()>;

    /// Grabs the frame under the playhead.
    async fn capture_frame(&mut self) -> anyhow::Result<CapturedFrame>;
}
