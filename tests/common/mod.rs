//! Fixtures shared by the integration tests: a scripted fight clip and
//! collaborators that misbehave on demand.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use strikevision_lib::models::joints;
use strikevision_lib::pose::{
    CapturedFrame, PoseRecording, PoseSource, RecordedPoseSource, RecordedVideo, VideoSource,
};
use strikevision_lib::verification::{VerificationRequest, VerificationResponse, VerificationService};
use strikevision_lib::{AiVerificationResult, AnalysisSettings, Landmark, PoseFrame};

pub const FPS: f64 = 15.0;
pub const DURATION: f64 = 2.0;
pub const FRAME_COUNT: usize = 30;

/// Orthodox guard with the right arm chambered along the x axis.
pub fn guard() -> Vec<Landmark> {
    let mut landmarks = vec![Landmark::new(0.5, 0.5); joints::LANDMARK_COUNT];
    let mut set = |i: usize, x: f64, y: f64| landmarks[i] = Landmark::new(x, y);
    set(joints::LEFT_SHOULDER, 0.40, 0.30);
    set(joints::LEFT_ELBOW, 0.35, 0.40);
    set(joints::LEFT_WRIST, 0.35, 0.50);
    set(joints::RIGHT_SHOULDER, 0.10, 0.50);
    set(joints::RIGHT_ELBOW, 0.20, 0.50);
    set(joints::RIGHT_WRIST, 0.25, 0.50);
    set(joints::LEFT_HIP, 0.45, 0.60);
    set(joints::RIGHT_HIP, 0.55, 0.60);
    set(joints::LEFT_KNEE, 0.45, 0.75);
    set(joints::RIGHT_KNEE, 0.55, 0.75);
    set(joints::LEFT_ANKLE, 0.45, 0.90);
    set(joints::RIGHT_ANKLE, 0.55, 0.90);
    landmarks
}

/// Two seconds at 15 fps: the right hand fires out at frame 10, comes back
/// at frame 20, and the right leg kicks at frame 25. Three strikes, all on
/// the right side.
pub fn fight_clip() -> PoseRecording {
    let frames = (0..FRAME_COUNT)
        .map(|i| {
            let mut landmarks = guard();
            if (10..20).contains(&i) {
                landmarks[joints::RIGHT_WRIST] = Landmark::new(0.60, 0.50);
            }
            if i >= 25 {
                landmarks[joints::RIGHT_ANKLE] = Landmark::new(0.80, 0.70);
            }
            PoseFrame::new(landmarks, i as f64 / FPS)
        })
        .collect();
    PoseRecording::new(DURATION, frames)
}

pub fn replay() -> (RecordedVideo, RecordedPoseSource) {
    let recording = Arc::new(fight_clip());
    (
        RecordedVideo::new(recording.clone()),
        RecordedPoseSource::new(recording, 0.5 / FPS),
    )
}

pub fn settings(ai_verification: bool) -> AnalysisSettings {
    AnalysisSettings {
        enable_ai_verification: ai_verification,
        ..AnalysisSettings::default()
    }
}

/// Wraps the replayed video with slow, hanging or failing seeks.
pub struct FlakyVideo {
    pub inner: RecordedVideo,
    pub seek_delay: Option<Duration>,
    pub hang_at: HashSet<usize>,
    pub fail_at: HashSet<usize>,
    pub seeks: usize,
}

impl FlakyVideo {
    pub fn new(inner: RecordedVideo) -> Self {
        Self {
            inner,
            seek_delay: None,
            hang_at: HashSet::new(),
            fail_at: HashSet::new(),
            seeks: 0,
        }
    }
}

#[async_trait]
impl VideoSource for FlakyVideo {
    fn duration(&self) -> Option<f64> {
        self.inner.duration()
    }

    async fn seek(&mut self, time: f64) -> anyhow::Result<()> {
        let index = self.seeks;
        self.seeks += 1;
        if let Some(delay) = self.seek_delay {
            tokio::time::sleep(delay).await;
        }
        if self.hang_at.contains(&index) {
            std::future::pending::<()>().await;
        }
        if self.fail_at.contains(&index) {
            anyhow::bail!("decoder error at {time:.3}s");
        }
        self.inner.seek(time).await
    }

    async fn capture_frame(&mut self) -> anyhow::Result<CapturedFrame> {
        self.inner.capture_frame().await
    }
}

/// A video whose length never becomes known.
pub struct EndlessVideo;

#[async_trait]
impl VideoSource for EndlessVideo {
    fn duration(&self) -> Option<f64> {
        None
    }

    async fn seek(&mut self, _time: f64) -> anyhow::Result<()> {
        Ok(())
    }

    async fn capture_frame(&mut self) -> anyhow::Result<CapturedFrame> {
        anyhow::bail!("no frames")
    }
}

#[derive(Clone, Copy, PartialEq)]
pub enum InitBehavior {
    Fail,
    Hang,
}

/// Replayed pose service with a broken `initialize`.
pub struct BrokenInitPose {
    pub inner: RecordedPoseSource,
    pub behavior: InitBehavior,
}

#[async_trait]
impl PoseSource for BrokenInitPose {
    async fn initialize(&mut self) -> anyhow::Result<()> {
        match self.behavior {
            InitBehavior::Fail => anyhow::bail!("model weights missing"),
            InitBehavior::Hang => std::future::pending().await,
        }
    }

    async fn detect(&mut self, frame: &CapturedFrame) -> anyhow::Result<Option<PoseFrame>> {
        self.inner.detect(frame).await
    }

    fn name(&self) -> &'static str {
        "broken-init"
    }
}

/// Approves every strike; optionally fails one call (1-based) or takes
/// its time answering.
#[derive(Default)]
pub struct Reviewer {
    pub calls: AtomicUsize,
    pub fail_on_call: Option<usize>,
    pub delay: Option<Duration>,
}

impl Reviewer {
    pub fn failing_on(call: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on_call: Some(call),
            delay: None,
        }
    }

    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl VerificationService for Reviewer {
    async fn verify_batch(&self, request: VerificationRequest) -> anyhow::Result<VerificationResponse> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_on_call == Some(call) {
            anyhow::bail!("503 service unavailable");
        }

        let verifications = request
            .frames
            .iter()
            .map(|item| AiVerificationResult {
                strike_id: item.detected_strike.strike_id.clone(),
                is_valid: true,
                suggested_type: None,
                confidence: 0.85,
                technical_notes: "hips rotated through".into(),
                is_correct_technique: true,
            })
            .collect();
        Ok(VerificationResponse { verifications })
    }

    fn name(&self) -> &'static str {
        "reviewer"
    }
}
