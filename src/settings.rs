//! Run settings
//!
//! Loaded from an optional JSON file; every field falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::DEFAULT_CAMPAIGN_SECONDS;

/// Failure to produce usable settings
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Settings file could not be read
    #[error("failed to read settings: {0}")]
    Io(#[from] std::io::Error),
    /// Settings file is not valid JSON for `Settings`
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
    /// Settings parsed but hold an unusable value
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Run configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Campaign ===
    /// Length of the finite campaign in seconds
    pub campaign_seconds: u32,
    /// Fixed RNG seed; the runner picks one from the clock when absent
    pub seed: Option<u64>,

    // === Endless mode ===
    /// Campaigns this short or shorter get the overdrive bundle
    pub overdrive_max_campaign_seconds: u32,
    /// Cap on the endless spawn volume exponent
    pub max_endless_exponent: u32,

    // === Headless runner ===
    /// Stop after this many ticks
    pub max_ticks: u64,
    /// Drive the player automatically
    pub autopilot: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            campaign_seconds: DEFAULT_CAMPAIGN_SECONDS,
            seed: None,

            overdrive_max_campaign_seconds: 60,
            max_endless_exponent: 10,

            // Ten simulated minutes
            max_ticks: 18_000,
            autopilot: true,
        }
    }
}

impl Settings {
    /// Parse and validate settings from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Read settings from `path` if given, falling back to defaults on any error
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            log::info!("Using default settings");
            return Self::default();
        };
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.campaign_seconds == 0 {
            return Err(SettingsError::Invalid(
                "campaign_seconds must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
