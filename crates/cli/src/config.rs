//! Configuration management for the CLI
//!
//! Layers, lowest precedence first: built-in defaults, a JSON/TOML config
//! file, `CHURN_*` environment variables. Command-line flags are applied
//! on top by the caller.

use anyhow::{Context, Result};
use churn_lib::predictor::{
    ModelConfig, DEFAULT_DECISION_THRESHOLD, DEFAULT_MODEL_PATH, DEFAULT_SLOW_INFERENCE,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// CLI settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Path to the serialized churn classifier
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Expected SHA-256 of the model artifact
    #[serde(default)]
    pub model_sha256: Option<String>,

    /// Probability at or above which a customer is labelled as churned
    #[serde(default = "default_decision_threshold")]
    pub decision_threshold: f64,

    /// Inference latency (ms) above which a warning is logged
    #[serde(default = "default_slow_inference_ms")]
    pub slow_inference_ms: u64,
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_decision_threshold() -> f64 {
    DEFAULT_DECISION_THRESHOLD
}

fn default_slow_inference_ms() -> u64 {
    DEFAULT_SLOW_INFERENCE.as_millis() as u64
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model_path: default_model_path(),
            model_sha256: None,
            decision_threshold: default_decision_threshold(),
            slow_inference_ms: default_slow_inference_ms(),
        }
    }
}

impl Settings {
    /// Load settings from an explicit file (which must exist) or the
    /// default location (which may not), then the environment.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        match config_file {
            Some(path) => {
                builder = builder.add_source(config::File::from(path).required(true));
            }
            None => {
                if let Some(path) = default_config_path() {
                    builder = builder.add_source(config::File::from(path).required(false));
                }
            }
        }

        let settings = builder
            .add_source(config::Environment::with_prefix("CHURN"))
            .build()
            .context("Failed to read configuration")?;

        let settings: Settings = settings
            .try_deserialize()
            .context("Failed to parse configuration")?;
        settings.validate()?;
        debug!(
            model_path = %settings.model_path.display(),
            pinned = settings.model_sha256.is_some(),
            decision_threshold = settings.decision_threshold,
            slow_inference_ms = settings.slow_inference_ms,
            "Resolved settings"
        );
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.decision_threshold) {
            anyhow::bail!(
                "decision_threshold must be between 0 and 1, got {}",
                self.decision_threshold
            );
        }
        Ok(())
    }

    /// Apply the `--model` flag
    pub fn with_model_override(mut self, model: Option<PathBuf>) -> Self {
        if let Some(path) = model {
            self.model_path = path;
        }
        self
    }

    pub fn model_config(&self) -> ModelConfig {
        ModelConfig {
            path: self.model_path.clone(),
            expected_sha256: self.model_sha256.clone(),
            decision_threshold: self.decision_threshold,
            slow_inference: Duration::from_millis(self.slow_inference_ms),
        }
    }
}

/// Get the default configuration file path
fn default_config_path() -> Option<PathBuf> {
    dirs_next::home_dir().map(|home| home.join(".config").join("churn").join("config.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.model_path, PathBuf::from("xgb_churn_model.onnx"));
        assert_eq!(settings.decision_threshold, 0.5);
        assert!(settings.model_sha256.is_none());
    }

    #[test]
    fn test_explicit_file_is_read() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"{{"model_path": "/models/churn.json", "decision_threshold": 0.4}}"#
        )
        .unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.model_path, PathBuf::from("/models/churn.json"));
        assert_eq!(settings.decision_threshold, 0.4);
        assert_eq!(settings.slow_inference_ms, 50);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Settings::load(Some(Path::new("/nonexistent/churn.json"))).is_err());
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"{{"decision_threshold": 1.5}}"#).unwrap();
        assert!(Settings::load(Some(file.path())).is_err());
    }

    #[test]
    fn test_model_override_wins() {
        let settings = Settings::default().with_model_override(Some(PathBuf::from("other.onnx")));
        let model = settings.model_config();
        assert_eq!(model.path, PathBuf::from("other.onnx"));
        assert_eq!(model.slow_inference, Duration::from_millis(50));
    }
}
