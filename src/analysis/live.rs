use std::time::Duration;

use crate::detection::StrikeDetector;
use crate::error::{AnalysisError, VerificationError};
use crate::models::{AiVerificationResult, DetectedStrike};
use crate::pose::{CapturedFrame, PoseSource};
use crate::settings::AnalysisSettings;
use crate::utils::with_timeout;
use crate::verification::{encode_png, FrameSnapshot, VerificationQueue};

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Real-time (camera) session: frames arrive from the caller as they are
/// captured, strikes come back immediately, and AI verification runs in
/// small batches whenever the caller flushes the queue.
pub struct LiveSession<P: PoseSource> {
    pose: P,
    detector: StrikeDetector,
    queue: VerificationQueue,
    settings: AnalysisSettings,
    init_timeout: Duration,
    started: bool,
}

impl<P: PoseSource> LiveSession<P> {
    pub fn new(pose: P, settings: AnalysisSettings, queue: VerificationQueue) -> Self {
        Self {
            pose,
            detector: StrikeDetector::new(settings.detector_config()),
            queue,
            settings,
            init_timeout: Duration::from_secs(30),
            started: false,
        }
    }

    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    /// Brings up the pose service. Unlike whole-video analysis there is no
    /// point in continuing without it, so any failure is returned.
    pub async fn start(&mut self) -> Result<(), AnalysisError> {
        with_timeout("pose service initialization", self.init_timeout, self.pose.initialize())
            .await?
            .map_err(|err| AnalysisError::PoseInit(format!("{err:#}")))?;

        self.started = true;
        log_info!("Live session started with pose service {}", self.pose.name());
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Detects and classifies one camera frame. Strikes are returned right
    /// away and, with AI verification on, queued with their frame.
    ///
    /// A pose service error only costs this frame.
    pub async fn process_frame(
        &mut self,
        frame: &CapturedFrame,
    ) -> Result<Vec<DetectedStrike>, AnalysisError> {
        if !self.started {
            return Err(AnalysisError::PoseInit("live session not started".into()));
        }

        let pose_frame = match self.pose.detect(frame).await {
            Ok(Some(pose_frame)) => pose_frame,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => {
                log_warn!("pose detection failed at {:.3}s: {err:#}", frame.timestamp);
                return Ok(Vec::new());
            }
        };

        self.detector.ingest(pose_frame.landmarks, frame.timestamp);
        let emitted = self.detector.drain_events();

        if !emitted.is_empty() && self.settings.enable_ai_verification && self.queue.is_configured() {
            match encode_png(&frame.image) {
                Ok(image_png) => {
                    for strike in &emitted {
                        self.queue
                            .enqueue(FrameSnapshot::new(image_png.clone(), strike.clone()))
                            .await;
                    }
                }
                Err(err) => log_warn!("strikes at {:.3}s not queued for verification: {err}", frame.timestamp),
            }
        }

        Ok(emitted)
    }

    /// Sends the next pending batch to the AI service and marks the strikes
    /// that got a verdict.
    pub async fn flush_verifications(&mut self) -> Result<Vec<AiVerificationResult>, VerificationError> {
        let results = self.queue.process_queue().await?;
        for result in &results {
            self.detector.verify(&result.strike_id, true);
        }
        Ok(results)
    }

    pub fn strikes(&self) -> &[DetectedStrike] {
        self.detector.strikes()
    }

    pub fn detector(&self) -> &StrikeDetector {
        &self.detector
    }

    pub fn queue(&self) -> &VerificationQueue {
        &self.queue
    }

    pub async fn reset(&mut self) {
        self.detector.reset();
        self.queue.clear().await;
    }
}
