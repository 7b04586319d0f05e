pub mod analysis;
pub mod detection;
pub mod error;
pub mod kinematics;
pub mod models;
pub mod pose;
pub mod settings;
pub mod utils;
pub mod verification;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};

pub use analysis::{
    AnalysisEvent, AnalysisPhase, AnalysisProgress, AnalysisResult, AnalysisStats, LiveSession,
    OrchestratorConfig, VideoAnalyzer,
};
pub use detection::{DetectorConfig, Sensitivity, StrikeDetector};
pub use error::{AnalysisError, VerificationError};
pub use models::{AiVerificationResult, DetectedStrike, Landmark, PoseFrame, Side, StrikeCategory, StrikeType};
pub use settings::{AnalysisSettings, AnalysisSpeed, SettingsStore};
pub use verification::{VerificationQueue, VerificationService};

const USAGE: &str = "usage: strikevision <recording.json> [settings.json]";

/// Command line entry point: replays a recorded pose track through the
/// whole-video analyzer and prints the result as JSON.
pub fn run() -> anyhow::Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let Some(recording_path) = args.next().map(PathBuf::from) else {
        bail!(USAGE);
    };
    let settings_path = args.next().map(PathBuf::from);
    if args.next().is_some() {
        bail!(USAGE);
    }

    let recording = Arc::new(pose::PoseRecording::load(&recording_path)?);
    let mut settings = match settings_path {
        Some(path) => SettingsStore::new(path)?.get(),
        None => AnalysisSettings::default(),
    };

    // The command line build has no AI transport wired in.
    if settings.enable_ai_verification {
        log::warn!("No verification service available; AI verification disabled");
        settings.enable_ai_verification = false;
    }

    log::info!(
        "Analyzing {} ({} pose frames, {:.2}s)",
        recording_path.display(),
        recording.frames.len(),
        recording.duration
    );

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    let result = runtime.block_on(async {
        let analyzer = VideoAnalyzer::new(OrchestratorConfig::default(), None);
        let tolerance = 0.5 / settings.analysis_speed.fps();
        analyzer
            .analyze(
                pose::RecordedVideo::new(recording.clone()),
                pose::RecordedPoseSource::new(recording.clone(), tolerance),
                &settings,
            )
            .await
    })?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
