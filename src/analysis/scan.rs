use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::AnalysisError;
use crate::pose::{CapturedFrame, PoseSource, VideoSource};
use crate::utils::with_timeout;
use crate::verification::{encode_png, FrameSnapshot};

use super::controller::{ScanOutcome, VideoAnalyzer};
use super::state::AnalysisEvent;

// Set to true to log every skipped frame
const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Number of instants sampled from a video of `duration` seconds at `fps`.
pub(super) fn expected_frames(duration: f64, fps: f64) -> usize {
    ((duration * fps).ceil() as usize).max(1)
}

impl VideoAnalyzer {
    /// The analyzing phase: seeks through the video at the sampling rate,
    /// one instant at a time, feeding detected poses to the strike detector.
    ///
    /// A seek that fails or times out skips that instant; the scan goes on.
    /// Cancellation is checked before every instant.
    pub(super) async fn scan<V, P>(
        &self,
        video: &mut V,
        pose: &mut P,
        duration: f64,
        fps: f64,
        progress_share: f64,
        token: &CancellationToken,
    ) -> Result<ScanOutcome, AnalysisError>
    where
        V: VideoSource,
        P: PoseSource,
    {
        let total_frames = expected_frames(duration, fps);
        let interval = 1.0 / fps;
        let mut snapshots = Vec::new();
        let mut skipped = 0usize;

        {
            let mut state = self.state.lock().await;
            state.progress.total_frames = total_frames;
        }
        log_info!(
            "Scanning {:.2}s of video at {} fps ({} frames)",
            duration,
            fps,
            total_frames
        );

        for index in 0..total_frames {
            if token.is_cancelled() {
                return Err(AnalysisError::Cancelled);
            }

            let time = (index as f64 * interval).min(duration);
            match self.sample(video, pose, time).await {
                Ok(mut taken) => snapshots.append(&mut taken),
                Err(reason) => {
                    skipped += 1;
                    log_warn!("Skipping frame at {time:.3}s: {reason}");
                }
            }

            let progress = {
                let strikes_detected = self.detector.lock().await.strikes().len();
                let mut state = self.state.lock().await;
                state.progress.frames_processed = index + 1;
                state.progress.current_time = time;
                state.progress.strikes_detected = strikes_detected;
                state.progress.progress =
                    (index + 1) as f64 / total_frames as f64 * 100.0 * progress_share;
                state.progress.clone()
            };
            let _ = self.events.send(AnalysisEvent::Progress(progress));
        }

        if skipped > 0 {
            log_warn!("{skipped} of {total_frames} frames skipped during scan");
        }

        Ok(ScanOutcome {
            snapshots,
            frames_analyzed: total_frames - skipped,
        })
    }

    /// Seek, capture, detect and ingest one instant. Returns snapshots of
    /// the strikes it produced, or why the instant was skipped.
    async fn sample<V, P>(
        &self,
        video: &mut V,
        pose: &mut P,
        time: f64,
    ) -> Result<Vec<FrameSnapshot>, String>
    where
        V: VideoSource,
        P: PoseSource,
    {
        match with_timeout("video seek", self.config.seek_timeout, video.seek(time)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => return Err(format!("seek failed: {err:#}")),
            Err(timeout) => return Err(timeout.to_string()),
        }

        let frame: CapturedFrame = video
            .capture_frame()
            .await
            .map_err(|err| format!("capture failed: {err:#}"))?;

        let detected = pose
            .detect(&frame)
            .await
            .map_err(|err| format!("pose detection failed: {err:#}"))?;
        let Some(pose_frame) = detected else {
            return Ok(Vec::new());
        };

        let emitted = {
            let mut detector = self.detector.lock().await;
            detector.ingest(pose_frame.landmarks, time);
            detector.drain_events()
        };
        if emitted.is_empty() {
            return Ok(Vec::new());
        }

        for strike in &emitted {
            let _ = self.events.send(AnalysisEvent::StrikeDetected(strike.clone()));
        }

        // The strikes stand even if the frame cannot be kept for verification.
        let image_png = match encode_png(&frame.image) {
            Ok(bytes) => bytes,
            Err(err) => {
                log_warn!("No verification snapshot for frame at {time:.3}s: {err}");
                return Ok(Vec::new());
            }
        };

        Ok(emitted
            .into_iter()
            .map(|strike| FrameSnapshot::new(Arc::clone(&image_png), strike))
            .collect())
    }
}
