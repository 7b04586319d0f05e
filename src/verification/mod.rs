pub mod queue;
pub mod service;
pub mod snapshot;

pub use queue::{QueueConfig, VerificationQueue};
pub use service::{
    StrikeSummary, VerificationItem, VerificationRequest, VerificationResponse, VerificationService,
};
pub use snapshot::{encode_png, FrameSnapshot};
