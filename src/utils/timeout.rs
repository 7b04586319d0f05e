use std::future::Future;
use std::time::Duration;

use crate::error::AnalysisError;

/// Awaits `fut` for at most `duration`.
///
/// Pose-service initialization, video seeks and AI verification calls all go
/// through here so an elapsed deadline always surfaces as
/// [`AnalysisError::Timeout`] and never as a generic failure.
pub async fn with_timeout<F, T>(
    operation: &str,
    duration: Duration,
    fut: F,
) -> Result<T, AnalysisError>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(duration, fut)
        .await
        .map_err(|_| AnalysisError::Timeout {
            operation: operation.to_string(),
            duration_ms: duration.as_millis() as u64,
        })
}
