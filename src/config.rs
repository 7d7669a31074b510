//! Environment-driven runtime configuration
//!
//! Settings load from `GALLRISK_*` environment variables with sensible
//! defaults and are validated up front; CLI flags override them per
//! invocation.
//!
//! - `GALLRISK_ARTIFACTS`: artifact directory - default: "./artifacts"
//! - `GALLRISK_THRESHOLD`: decision threshold in (0,1) - default: "0.5"
//! - `GALLRISK_LOG_LEVEL`: logging level - default: "info"

use std::env;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_ARTIFACT_DIR: &str = "artifacts";
const DEFAULT_THRESHOLD: f64 = 0.5;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration validation failed: {0}")]
    ValidationFailed(String),
}

#[derive(Debug, Clone)]
pub struct GallriskConfig {
    /// Directory holding categories.json, defaults.json, model.json and the
    /// optional manifest.json.
    pub artifact_dir: PathBuf,

    /// Probability at or above which the condition is reported as expected.
    pub threshold: f64,

    /// Logging level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GallriskConfig {
    fn default() -> Self {
        let artifact_dir = env::var("GALLRISK_ARTIFACTS")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_ARTIFACT_DIR));

        let threshold = env::var("GALLRISK_THRESHOLD")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(DEFAULT_THRESHOLD);

        let log_level = env::var("GALLRISK_LOG_LEVEL")
            .unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string())
            .to_lowercase();

        Self {
            artifact_dir,
            threshold,
            log_level,
        }
    }
}

impl GallriskConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(ConfigError::ValidationFailed(format!(
                "threshold must be strictly between 0 and 1, got {}",
                self.threshold
            )));
        }

        match self.log_level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(ConfigError::ValidationFailed(format!(
                    "invalid log level: {}. Valid options: trace, debug, info, warn, error",
                    other
                )))
            }
        }

        Ok(())
    }
}

impl fmt::Display for GallriskConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Gallrisk Configuration:")?;
        writeln!(f, "  Artifacts: {}", self.artifact_dir.display())?;
        writeln!(f, "  Threshold: {}", self.threshold)?;
        writeln!(f, "  Log Level: {}", self.log_level)?;
        Ok(())
    }
}
