use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::VerificationError;
use crate::models::AiVerificationResult;
use crate::utils::with_timeout;

use super::service::{VerificationRequest, VerificationService};
use super::snapshot::FrameSnapshot;

const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Items taken per `process_queue` round
    pub queue_batch_size: usize,
    /// Chunk size for whole-video `analyze_batch`
    pub analyze_batch_size: usize,
    /// Deadline for one AI service call
    pub call_timeout: Duration,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            queue_batch_size: 5,
            analyze_batch_size: 10,
            call_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Default)]
struct QueueState {
    pending: Vec<FrameSnapshot>,
    results: Vec<AiVerificationResult>,
    /// Bumped by `clear`; a submission started under an older generation
    /// must not touch the state when it returns.
    generation: u64,
}

impl QueueState {
    /// At most one verdict per strike; a newer verdict replaces the old one.
    fn merge(&mut self, incoming: &[AiVerificationResult]) {
        for result in incoming {
            match self
                .results
                .iter_mut()
                .find(|existing| existing.strike_id == result.strike_id)
            {
                Some(existing) => *existing = result.clone(),
                None => self.results.push(result.clone()),
            }
        }
    }
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Decouples frame-rate strike detection from network-bound AI verification.
///
/// Cloning yields another handle onto the same queue.
#[derive(Clone)]
pub struct VerificationQueue {
    service: Option<Arc<dyn VerificationService>>,
    config: QueueConfig,
    state: Arc<Mutex<QueueState>>,
    verifying: Arc<AtomicBool>,
}

impl VerificationQueue {
    pub fn new(service: Option<Arc<dyn VerificationService>>, config: QueueConfig) -> Self {
        Self {
            service,
            config,
            state: Arc::new(Mutex::new(QueueState::default())),
            verifying: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.service.is_some()
    }

    pub fn is_verifying(&self) -> bool {
        self.verifying.load(Ordering::Acquire)
    }

    pub async fn enqueue(&self, snapshot: FrameSnapshot) {
        self.state.lock().await.pending.push(snapshot);
    }

    pub async fn pending_len(&self) -> usize {
        self.state.lock().await.pending.len()
    }

    pub async fn results(&self) -> Vec<AiVerificationResult> {
        self.state.lock().await.results.clone()
    }

    pub async fn result_for(&self, strike_id: &str) -> Option<AiVerificationResult> {
        self.state
            .lock()
            .await
            .results
            .iter()
            .find(|r| r.strike_id == strike_id)
            .cloned()
    }

    /// Submits the oldest pending items as one batch.
    ///
    /// A call made while another submission is in flight returns an empty
    /// list without touching the queue. On failure the items stay pending.
    pub async fn process_queue(&self) -> Result<Vec<AiVerificationResult>, VerificationError> {
        if self
            .verifying
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(Vec::new());
        }
        let _in_flight = InFlight(self.verifying.as_ref());

        let (batch, generation): (Vec<FrameSnapshot>, u64) = {
            let state = self.state.lock().await;
            let take = state.pending.len().min(self.config.queue_batch_size);
            (state.pending[..take].to_vec(), state.generation)
        };
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let results = self.submit(&batch).await.map_err(|err| {
            log_error!("verification batch of {} failed: {err}", batch.len());
            err
        })?;

        let processed: HashSet<&str> = batch.iter().map(FrameSnapshot::strike_id).collect();
        let mut state = self.state.lock().await;
        if state.generation != generation {
            log_warn!("queue cleared during verification; dropping {} verdicts", results.len());
            return Ok(Vec::new());
        }
        state.merge(&results);
        state
            .pending
            .retain(|item| !processed.contains(item.strike_id()));

        Ok(results)
    }

    /// Verifies one snapshot right away, bypassing the pending queue.
    pub async fn verify_single(
        &self,
        snapshot: FrameSnapshot,
    ) -> Result<AiVerificationResult, VerificationError> {
        let strike_id = snapshot.strike_id().to_string();
        let generation = self.state.lock().await.generation;
        let results = self.submit(std::slice::from_ref(&snapshot)).await?;
        let result = results
            .into_iter()
            .find(|r| r.strike_id == strike_id)
            .ok_or_else(|| VerificationError::Service(format!("no verdict returned for strike {strike_id}")))?;

        let mut state = self.state.lock().await;
        if state.generation == generation {
            state.merge(std::slice::from_ref(&result));
        }
        Ok(result)
    }

    /// Verifies a whole list in fixed-size chunks, one chunk at a time.
    ///
    /// A failing chunk stops the run; verdicts from earlier chunks are kept.
    pub async fn analyze_batch(
        &self,
        frames: &[FrameSnapshot],
    ) -> Result<Vec<AiVerificationResult>, VerificationError> {
        self.analyze_batch_until(frames, &CancellationToken::new()).await
    }

    /// [`analyze_batch`](Self::analyze_batch) that stops once `cancel` fires.
    ///
    /// No chunk is submitted after cancellation, and the verdicts of the
    /// chunk in flight at that moment are discarded. A `clear` during the
    /// run has the same effect.
    pub async fn analyze_batch_until(
        &self,
        frames: &[FrameSnapshot],
        cancel: &CancellationToken,
    ) -> Result<Vec<AiVerificationResult>, VerificationError> {
        let chunk_size = self.config.analyze_batch_size.max(1);
        let mut collected = Vec::with_capacity(frames.len());
        let generation = self.state.lock().await.generation;

        for (index, chunk) in frames.chunks(chunk_size).enumerate() {
            if cancel.is_cancelled() {
                log_info!("verification cancelled before chunk {}", index + 1);
                break;
            }

            let results = match self.submit(chunk).await {
                Ok(results) => results,
                Err(err) => {
                    log_error!(
                        "verification chunk {} failed, keeping {} earlier verdicts: {err}",
                        index + 1,
                        collected.len()
                    );
                    return Err(err);
                }
            };

            {
                let mut state = self.state.lock().await;
                if cancel.is_cancelled() || state.generation != generation {
                    log_warn!(
                        "verification chunk {} finished after cancel; dropping {} verdicts",
                        index + 1,
                        results.len()
                    );
                    break;
                }
                state.merge(&results);
            }
            log_info!(
                "verification chunk {} returned {} verdicts for {} strikes",
                index + 1,
                results.len(),
                chunk.len()
            );
            collected.extend(results);
        }

        Ok(collected)
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.pending.clear();
        state.results.clear();
        state.generation += 1;
    }

    /// One call to the service. Verdicts for strikes that were not part of
    /// `batch` are dropped.
    async fn submit(
        &self,
        batch: &[FrameSnapshot],
    ) -> Result<Vec<AiVerificationResult>, VerificationError> {
        let service = self.service.as_ref().ok_or(VerificationError::NotConfigured)?;
        let request = VerificationRequest::from_snapshots(batch);

        let response = match with_timeout(
            "ai verification",
            self.config.call_timeout,
            service.verify_batch(request),
        )
        .await
        {
            Ok(Ok(response)) => response,
            Ok(Err(err)) => return Err(VerificationError::Service(format!("{err:#}"))),
            Err(_) => {
                return Err(VerificationError::Timeout {
                    duration_ms: self.config.call_timeout.as_millis() as u64,
                })
            }
        };

        let submitted: HashSet<&str> = batch.iter().map(FrameSnapshot::strike_id).collect();
        let (known, unknown): (Vec<_>, Vec<_>) = response
            .verifications
            .into_iter()
            .partition(|r| submitted.contains(r.strike_id.as_str()));
        if !unknown.is_empty() {
            log_warn!(
                "{} returned {} verdicts for strikes outside the batch; dropped",
                service.name(),
                unknown.len()
            );
        }

        Ok(known)
    }
}
