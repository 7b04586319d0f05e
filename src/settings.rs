use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::detection::{CooldownWindows, DetectorConfig, Sensitivity, VelocityThresholds};

/// Frame sampling rate for whole-video analysis.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisSpeed {
    Fast,
    #[default]
    Normal,
    Thorough,
}

impl AnalysisSpeed {
    pub fn fps(&self) -> f64 {
        match self {
            AnalysisSpeed::Fast => 10.0,
            AnalysisSpeed::Normal => 15.0,
            AnalysisSpeed::Thorough => 30.0,
        }
    }
}

/// Options a session is started with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisSettings {
    pub sensitivity: Sensitivity,
    pub detect_punches: bool,
    pub detect_kicks: bool,
    pub detect_knees: bool,
    pub detect_elbows: bool,
    #[serde(alias = "enableAIVerification")]
    pub enable_ai_verification: bool,
    pub analysis_speed: AnalysisSpeed,
    pub thresholds: VelocityThresholds,
    pub cooldowns: CooldownWindows,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Medium,
            detect_punches: true,
            detect_kicks: true,
            detect_knees: true,
            detect_elbows: true,
            enable_ai_verification: true,
            analysis_speed: AnalysisSpeed::Normal,
            thresholds: VelocityThresholds::default(),
            cooldowns: CooldownWindows::default(),
        }
    }
}

impl AnalysisSettings {
    pub fn detector_config(&self) -> DetectorConfig {
        DetectorConfig {
            sensitivity: self.sensitivity,
            detect_punches: self.detect_punches,
            detect_kicks: self.detect_kicks,
            detect_knees: self.detect_knees,
            detect_elbows: self.detect_elbows,
            thresholds: self.thresholds,
            cooldowns: self.cooldowns,
            ..DetectorConfig::default()
        }
    }
}

/// JSON file backed settings. A missing or unreadable file yields defaults.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<AnalysisSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!(
                    "Ignoring malformed settings in {}: {err}; using defaults",
                    path.display()
                );
                AnalysisSettings::default()
            })
        } else {
            AnalysisSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn get(&self) -> AnalysisSettings {
        match self.data.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn update(&self, settings: AnalysisSettings) -> Result<()> {
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        self.persist(&settings)?;
        *guard = settings;
        Ok(())
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read settings from {}", self.path.display()))?;
        let data: AnalysisSettings = serde_json::from_str(&contents)
            .with_context(|| format!("Malformed settings in {}", self.path.display()))?;
        let mut guard = self
            .data
            .write()
            .map_err(|_| anyhow!("settings lock poisoned"))?;
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &AnalysisSettings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
