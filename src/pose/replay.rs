//! Replays a pre-extracted pose track as if it were a live video and pose
//! service. Used by the command line tool and the tests.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use image::{DynamicImage, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::models::PoseFrame;

use super::source::{CapturedFrame, PoseSource, VideoSource};

fn default_width() -> u32 {
    64
}

fn default_height() -> u32 {
    36
}

/// Timestamped pose frames plus the length of the video they came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoseRecording {
    pub duration: f64,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    pub frames: Vec<PoseFrame>,
}

impl PoseRecording {
    pub fn new(duration: f64, mut frames: Vec<PoseFrame>) -> Self {
        frames.sort_by(|a, b| a.timestamp.total_cmp(&b.timestamp));
        Self {
            duration,
            width: default_width(),
            height: default_height(),
            frames,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read recording {}", path.display()))?;
        let recording: PoseRecording = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed recording {}", path.display()))?;
        if recording.width == 0 || recording.height == 0 {
            bail!("recording {} has an empty frame size", path.display());
        }
        Ok(Self::new(recording.duration, recording.frames).with_size(recording.width, recording.height))
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// The frame closest to `time`, if one lies within `tolerance` seconds.
    pub fn frame_near(&self, time: f64, tolerance: f64) -> Option<&PoseFrame> {
        let split = self.frames.partition_point(|f| f.timestamp < time);
        let before = split.checked_sub(1).and_then(|i| self.frames.get(i));
        let after = self.frames.get(split);

        [before, after]
            .into_iter()
            .flatten()
            .filter(|f| (f.timestamp - time).abs() <= tolerance)
            .min_by(|a, b| (a.timestamp - time).abs().total_cmp(&(b.timestamp - time).abs()))
    }
}

/// Video stand-in: tracks the playhead and hands out blank frames.
pub struct RecordedVideo {
    recording: Arc<PoseRecording>,
    position: f64,
}

impl RecordedVideo {
    pub fn new(recording: Arc<PoseRecording>) -> Self {
        Self {
            recording,
            position: 0.0,
        }
    }
}

#[async_trait]
impl VideoSource for RecordedVideo {
    fn duration(&self) -> Option<f64> {
        Some(self.recording.duration)
    }

    async fn seek(&mut self, time: f64) -> Result<()> {
        if !(0.0..=self.recording.duration).contains(&time) {
            bail!("seek to {time:.3}s outside recording");
        }
        self.position = time;
        Ok(())
    }

    async fn capture_frame(&mut self) -> Result<CapturedFrame> {
        Ok(CapturedFrame {
            image: DynamicImage::ImageRgba8(RgbaImage::new(
                self.recording.width,
                self.recording.height,
            )),
            timestamp: self.position,
        })
    }
}

/// Pose service stand-in answering from the recording.
pub struct RecordedPoseSource {
    recording: Arc<PoseRecording>,
    tolerance: f64,
}

impl RecordedPoseSource {
    pub fn new(recording: Arc<PoseRecording>, tolerance: f64) -> Self {
        Self {
            recording,
            tolerance,
        }
    }
}

#[async_trait]
impl PoseSource for RecordedPoseSource {
    async fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    async fn detect(&mut self, frame: &CapturedFrame) -> Result<Option<PoseFrame>> {
        Ok(self
            .recording
            .frame_near(frame.timestamp, self.tolerance)
            .map(|recorded| PoseFrame::new(recorded.landmarks.clone(), frame.timestamp)))
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
