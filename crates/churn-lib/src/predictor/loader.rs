//! Model artifact loading
//!
//! This module provides:
//! - Format detection by file extension (`.onnx`, `.json`)
//! - Optional SHA-256 validation before parsing
//! - A one-time-guarded cache so an artifact is loaded once per process

use super::inference::{OnnxPredictor, DEFAULT_SLOW_INFERENCE};
use super::logistic::{LogisticArtifact, LogisticPredictor};
use super::output::{OutputConfig, OutputFormatter, DEFAULT_DECISION_THRESHOLD};
use super::Predictor;
use crate::error::ChurnError;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default artifact file name, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "xgb_churn_model.onnx";

/// Configuration for loading a churn model
#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Path to the serialized classifier
    pub path: PathBuf,
    /// Expected hex-encoded SHA-256 of the artifact, if pinned
    pub expected_sha256: Option<String>,
    /// Threshold used when the model emits probabilities only
    pub decision_threshold: f64,
    /// Latency above which an inference is logged as slow
    pub slow_inference: Duration,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            expected_sha256: None,
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
            slow_inference: DEFAULT_SLOW_INFERENCE,
        }
    }
}

impl ModelConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }
}

/// Supported artifact formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Onnx,
    LogisticJson,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "onnx" => Some(ModelFormat::Onnx),
            "json" => Some(ModelFormat::LogisticJson),
            _ => None,
        }
    }
}

/// Compute SHA256 checksum of data
pub fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Load a churn model from disk.
///
/// Any failure to read, verify or parse the artifact is reported as
/// `ModelUnavailable` (or `SchemaMismatch` for a layout divergence); no
/// placeholder model is ever substituted.
pub fn load_model(config: &ModelConfig) -> Result<Arc<dyn Predictor>, ChurnError> {
    let path = config.path.as_path();
    info!(path = %path.display(), "Loading churn model");

    let format = ModelFormat::from_path(path).ok_or_else(|| {
        ChurnError::model_unavailable(path, "unrecognized artifact extension (expected .onnx or .json)")
    })?;

    let bytes = std::fs::read(path).map_err(|e| ChurnError::model_unavailable(path, e))?;
    let checksum = compute_checksum(&bytes);

    if let Some(expected) = &config.expected_sha256 {
        if !expected.eq_ignore_ascii_case(&checksum) {
            return Err(ChurnError::model_unavailable(
                path,
                format!("checksum mismatch: expected {}, got {}", expected, checksum),
            ));
        }
        debug!(checksum = %checksum, "Model checksum validated");
    }

    let formatter = OutputFormatter::with_config(OutputConfig {
        decision_threshold: config.decision_threshold,
    });

    let predictor: Arc<dyn Predictor> = match format {
        ModelFormat::Onnx => {
            let version = onnx_version(path, &checksum);
            let model = OnnxPredictor::new(&bytes, version, formatter, config.slow_inference)
                .map_err(|e| match e.downcast::<ChurnError>() {
                    Ok(err) => err,
                    Err(e) => ChurnError::model_unavailable(path, format!("{:#}", e)),
                })?;
            Arc::new(model)
        }
        ModelFormat::LogisticJson => {
            let artifact: LogisticArtifact = serde_json::from_slice(&bytes)
                .map_err(|e| ChurnError::model_unavailable(path, e))?;
            let model = LogisticPredictor::from_artifact(artifact, formatter, config.slow_inference)
                .map_err(|e| match e {
                    ChurnError::SchemaMismatch(_) | ChurnError::ModelUnavailable { .. } => e,
                    other => ChurnError::model_unavailable(path, other),
                })?;
            Arc::new(model)
        }
    };

    info!(
        path = %path.display(),
        model_version = %predictor.model_version(),
        schema = %predictor.schema().version(),
        size = bytes.len(),
        "Model loaded successfully"
    );
    Ok(predictor)
}

/// ONNX files carry no version we rely on; derive one from the file name and content
fn onnx_version(path: &Path, checksum: &str) -> String {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");
    format!("{}@{}", stem, &checksum[..12])
}

/// Lazily loads a model once and hands out the same handle afterwards.
///
/// Concurrent first callers serialize on the load guard, so the artifact is
/// read at most once on success. A failed load leaves the cache empty.
pub struct ModelCache {
    config: ModelConfig,
    handle: OnceLock<Arc<dyn Predictor>>,
    load_guard: Mutex<()>,
}

impl ModelCache {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            handle: OnceLock::new(),
            load_guard: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.handle.get().is_some()
    }

    pub fn get_or_load(&self) -> Result<Arc<dyn Predictor>, ChurnError> {
        if let Some(model) = self.handle.get() {
            return Ok(model.clone());
        }

        // Nothing is mutated under the guard, so a poisoned lock is still usable.
        let _guard = self
            .load_guard
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(model) = self.handle.get() {
            return Ok(model.clone());
        }

        match load_model(&self.config) {
            Ok(model) => {
                let _ = self.handle.set(model.clone());
                Ok(model)
            }
            Err(e) => {
                warn!(error = %e, "Model load failed");
                Err(e)
            }
        }
    }
}
