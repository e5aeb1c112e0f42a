//! Application configuration

use crate::cli::Cli;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use validin_advisor::AdvisorConfig;
use validin_classifiers::DetectorConfig;

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "validin.yaml";

/// Contents of `validin.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Detection pipeline
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Recommendation client
    #[serde(default)]
    pub advisor: AdvisorConfig,
}

impl AppConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let mut config = match resolve_path(cli.config.as_deref()) {
            Some(path) if path.exists() => {
                info!("Loading configuration from {}", path.display());
                let content = std::fs::read_to_string(&path)?;
                Self::from_yaml(&content)?
            }
            Some(path) => {
                warn!("Configuration file {} not found, using defaults", path.display());
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_overrides(cli);
        config.validate()?;

        Ok(config)
    }

    /// Parse YAML without validating
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Apply CLI overrides
    pub fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(model) = &cli.model {
            self.detector.set_model_path(model.clone());
        }

        if let Some(vocab) = &cli.vocab {
            self.detector.vocabulary.path = vocab.clone();
        }

        if let Some(threshold) = cli.threshold {
            self.detector.threshold = threshold;
        }
    }

    /// Check both sections
    pub fn validate(&self) -> validin_core::Result<()> {
        self.detector.validate()?;
        self.advisor.validate()
    }
}

/// Explicit path, else `./validin.yaml`, else the user config directory
fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir().map(|dir| dir.join("validin").join(CONFIG_FILE_NAME))
}
