// ⚙️ Application Configuration
//
// Defaults, optionally overridden by a JSON file, then by CLI flags and
// environment variables in the binary.

use crate::locale::Locale;
use crate::workflow::WorkflowSettings;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite file holding diagnosis history
    pub database_path: PathBuf,

    pub default_locale: Locale,

    /// tracing filter directive (trace, debug, info, warn, error)
    pub log_level: String,

    pub analysis_timeout_ms: u64,

    /// Delay of the simulated inference backend
    pub simulated_delay_ms: u64,

    pub max_image_bytes: usize,

    /// Optional JSON file merged over the built-in translations
    pub catalog_overrides: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: PathBuf::from("diagnosis_history.db"),
            default_locale: Locale::En,
            log_level: "info".to_string(),
            analysis_timeout_ms: 30_000,
            simulated_delay_ms: 3_000,
            max_image_bytes: 10 * 1024 * 1024,
            catalog_overrides: None,
        }
    }
}

impl AppConfig {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let config: AppConfig =
            serde_json::from_str(&content).context("Failed to parse config JSON")?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.analysis_timeout_ms == 0 {
            bail!("analysis_timeout_ms must be greater than zero");
        }
        if self.max_image_bytes == 0 {
            bail!("max_image_bytes must be greater than zero");
        }
        if self.log_level.trim().is_empty() {
            bail!("log_level must not be empty");
        }
        Ok(())
    }

    pub fn workflow_settings(&self) -> WorkflowSettings {
        WorkflowSettings {
            analysis_timeout: Duration::from_millis(self.analysis_timeout_ms),
            max_image_bytes: self.max_image_bytes,
        }
    }

    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }
}
