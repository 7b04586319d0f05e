use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{broadcast, watch, Mutex};
use tokio_util::sync::CancellationToken;

use crate::detection::StrikeDetector;
use crate::error::AnalysisError;
use crate::models::DetectedStrike;
use crate::pose::{PoseSource, VideoSource};
use crate::settings::AnalysisSettings;
use crate::utils::with_timeout;
use crate::verification::{FrameSnapshot, QueueConfig, VerificationQueue, VerificationService};

use super::state::{AnalysisEvent, AnalysisPhase, AnalysisProgress, AnalysisResult, AnalysisState};
use super::stats::AnalysisStats;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub pose_init_timeout: Duration,
    pub seek_timeout: Duration,
    pub verification: QueueConfig,
    /// Share of the progress bar reserved for AI verification, 0 to 1
    pub verification_share: f64,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            pose_init_timeout: Duration::from_secs(30),
            seek_timeout: Duration::from_secs(3),
            verification: QueueConfig::default(),
            verification_share: 0.3,
        }
    }
}

/// What the analyzing phase hands to the verifying phase.
pub(super) struct ScanOutcome {
    pub snapshots: Vec<FrameSnapshot>,
    pub frames_analyzed: usize,
}

/// Drives a whole pre-recorded video through pose detection, strike
/// detection and AI verification.
///
/// Phases run `idle → loading → analyzing → verifying → complete`; any
/// failure or a cancel returns to `idle`. Clones share one session, so a
/// UI can hold a handle to cancel or poll progress while another task
/// awaits [`VideoAnalyzer::analyze`].
#[derive(Clone)]
pub struct VideoAnalyzer {
    pub(super) config: OrchestratorConfig,
    pub(super) state: Arc<Mutex<AnalysisState>>,
    pub(super) detector: Arc<Mutex<StrikeDetector>>,
    pub(super) queue: VerificationQueue,
    cancel_token: Arc<Mutex<Option<CancellationToken>>>,
    running: Arc<watch::Sender<bool>>,
    pub(super) events: broadcast::Sender<AnalysisEvent>,
}

impl VideoAnalyzer {
    pub fn new(config: OrchestratorConfig, service: Option<Arc<dyn VerificationService>>) -> Self {
        let queue = VerificationQueue::new(service, config.verification.clone());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (running, _) = watch::channel(false);

        Self {
            config,
            state: Arc::new(Mutex::new(AnalysisState::default())),
            detector: Arc::new(Mutex::new(StrikeDetector::default())),
            queue,
            cancel_token: Arc::new(Mutex::new(None)),
            running: Arc::new(running),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AnalysisEvent> {
        self.events.subscribe()
    }

    pub fn verification_queue(&self) -> &VerificationQueue {
        &self.queue
    }

    pub async fn progress(&self) -> AnalysisProgress {
        self.state.lock().await.progress.clone()
    }

    pub async fn result(&self) -> Option<AnalysisResult> {
        self.state.lock().await.result.clone()
    }

    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.error.clone()
    }

    /// Strikes found so far, including those of a cancelled or failed run.
    pub async fn strikes(&self) -> Vec<DetectedStrike> {
        self.detector.lock().await.strikes().to_vec()
    }

    pub async fn verify_strike(&self, strike_id: &str, verified: bool) -> bool {
        self.detector.lock().await.verify(strike_id, verified)
    }

    pub async fn remove_strike(&self, strike_id: &str) -> Option<DetectedStrike> {
        self.detector.lock().await.remove(strike_id)
    }

    /// Runs a full analysis of `video`. Both collaborators are owned by the
    /// session until it ends.
    pub async fn analyze<V, P>(
        &self,
        mut video: V,
        mut pose: P,
        settings: &AnalysisSettings,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        V: VideoSource,
        P: PoseSource,
    {
        let token = {
            let mut state = self.state.lock().await;
            if state.progress.phase.is_running() {
                return Err(AnalysisError::AlreadyRunning);
            }
            state.begin();

            let token = CancellationToken::new();
            *self.cancel_token.lock().await = Some(token.clone());
            self.running.send_replace(true);
            token
        };

        *self.detector.lock().await = StrikeDetector::new(settings.detector_config());
        self.queue.clear().await;
        self.emit_phase(AnalysisPhase::Loading);

        let outcome = self.run_phases(&mut video, &mut pose, settings, &token).await;

        {
            let mut state = self.state.lock().await;
            match &outcome {
                Ok(result) => {
                    state.progress.phase = AnalysisPhase::Complete;
                    state.progress.progress = 100.0;
                    state.result = Some(result.clone());
                    log_info!(
                        "Analysis complete: {} strikes over {} frames",
                        result.stats.total_strikes,
                        result.frames_analyzed
                    );
                }
                Err(AnalysisError::Cancelled) => {
                    state.progress.phase = AnalysisPhase::Idle;
                    log_info!("Analysis cancelled");
                }
                Err(err) => {
                    state.progress.phase = AnalysisPhase::Idle;
                    state.error = Some(err.to_string());
                    log_error!("Analysis failed: {err}");
                }
            }
            let phase = state.progress.phase;
            drop(state);
            self.emit_phase(phase);
        }

        self.cancel_token.lock().await.take();
        self.running.send_replace(false);
        outcome
    }

    async fn run_phases<V, P>(
        &self,
        video: &mut V,
        pose: &mut P,
        settings: &AnalysisSettings,
        token: &CancellationToken,
    ) -> Result<AnalysisResult, AnalysisError>
    where
        V: VideoSource,
        P: PoseSource,
    {
        // Loading: a hung pose service is fatal, a failing one is not.
        match with_timeout(
            "pose service initialization",
            self.config.pose_init_timeout,
            pose.initialize(),
        )
        .await?
        {
            Ok(()) => log_info!("Pose service {} ready", pose.name()),
            Err(err) => log_warn!(
                "Pose service {} failed to initialize, continuing: {err:#}",
                pose.name()
            ),
        }

        if token.is_cancelled() {
            return Err(AnalysisError::Cancelled);
        }

        let duration = video
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
            .ok_or_else(|| AnalysisError::Video("video duration unavailable".into()))?;

        let verify = settings.enable_ai_verification;
        let scan_share = if verify {
            1.0 - self.config.verification_share
        } else {
            1.0
        };

        self.set_phase(AnalysisPhase::Analyzing).await;
        let scan = self
            .scan(video, pose, duration, settings.analysis_speed.fps(), scan_share, token)
            .await?;

        let mut verification_error = None;
        if verify && !scan.snapshots.is_empty() {
            if self.queue.is_configured() {
                self.set_phase(AnalysisPhase::Verifying).await;
                verification_error = self.verify_snapshots(&scan.snapshots, token).await?;
            } else {
                log_warn!("AI verification requested but no service is configured; skipping");
            }
        }

        let strikes = self.detector.lock().await.strikes().to_vec();
        let verifications = self.queue.results().await;
        let stats = AnalysisStats::compute(&strikes, &verifications);

        Ok(AnalysisResult {
            strikes,
            verifications,
            stats,
            verification_error,
            video_duration: duration,
            frames_analyzed: scan.frames_analyzed,
            analyzed_at: Utc::now(),
        })
    }

    /// Submits every detected strike and marks the ones that got a verdict.
    /// Returns the failure reason, if any; verdicts from chunks that
    /// succeeded before the failure are kept.
    ///
    /// A cancel lets the call in flight finish, then drops every verdict of
    /// the session before any strike is marked.
    async fn verify_snapshots(
        &self,
        snapshots: &[FrameSnapshot],
        token: &CancellationToken,
    ) -> Result<Option<String>, AnalysisError> {
        let outcome = self.queue.analyze_batch_until(snapshots, token).await;
        if token.is_cancelled() {
            self.queue.clear().await;
            return Err(AnalysisError::Cancelled);
        }

        let verdicts = self.queue.results().await;
        {
            let mut detector = self.detector.lock().await;
            for verdict in &verdicts {
                detector.verify(&verdict.strike_id, true);
            }
        }

        {
            let mut state = self.state.lock().await;
            state.progress.progress = 100.0;
            let progress = state.progress.clone();
            drop(state);
            let _ = self.events.send(AnalysisEvent::Progress(progress));
        }

        match outcome {
            Ok(results) => {
                log_info!(
                    "AI verification returned {} verdicts for {} strikes",
                    results.len(),
                    snapshots.len()
                );
                Ok(None)
            }
            Err(err) => {
                log_warn!(
                    "AI verification failed, returning {} strikes with {} verdicts: {err}",
                    snapshots.len(),
                    verdicts.len()
                );
                Ok(Some(err.to_string()))
            }
        }
    }

    /// Requests cancellation; the scan stops at the next frame boundary.
    /// Returns `false` when nothing is running.
    pub async fn cancel(&self) -> bool {
        match self.cancel_token.lock().await.as_ref() {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels any running session, waits for it to wind down, then clears
    /// strikes, verdicts and the cached result.
    pub async fn reset(&self) {
        if self.cancel().await {
            let mut running = self.running.subscribe();
            let _ = running.wait_for(|busy| !*busy).await;
        }

        self.detector.lock().await.reset();
        self.queue.clear().await;
        self.state.lock().await.clear();
        self.emit_phase(AnalysisPhase::Idle);
    }

    pub(super) async fn set_phase(&self, phase: AnalysisPhase) {
        self.state.lock().await.progress.phase = phase;
        log_info!("Analysis phase: {}", phase.as_str());
        self.emit_phase(phase);
    }

    fn emit_phase(&self, phase: AnalysisPhase) {
        let _ = self.events.send(AnalysisEvent::PhaseChanged { phase });
    }
}
