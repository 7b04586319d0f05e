pub mod controller;
pub mod live;
mod scan;
pub mod state;
pub mod stats;

pub use controller::{OrchestratorConfig, VideoAnalyzer};
pub use live::LiveSession;
pub use state::{AnalysisEvent, AnalysisPhase, AnalysisProgress, AnalysisResult};
pub use stats::AnalysisStats;
