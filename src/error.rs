//! Error taxonomy for analysis sessions and AI verification.
//!
//! Per-frame and per-limb problems never reach these types: they are logged
//! and skipped where they happen. What is left here is what a caller has to
//! react to.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// The pose service could not be brought up.
    #[error("pose service initialization failed: {0}")]
    PoseInit(String),

    /// A suspension point exceeded its deadline.
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// The video cannot be analysed at all (unknown length, unreadable).
    #[error("video error: {0}")]
    Video(String),

    #[error("verification failed: {0}")]
    Verification(#[from] VerificationError),

    #[error("an analysis is already running")]
    AlreadyRunning,

    #[error("analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            AnalysisError::Timeout { .. }
                | AnalysisError::Verification(VerificationError::Timeout { .. })
        )
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerificationError {
    #[error("no verification service configured")]
    NotConfigured,

    #[error("verification service error: {0}")]
    Service(String),

    #[error("verification call timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    #[error("could not encode frame snapshot: {0}")]
    Snapshot(String),
}
