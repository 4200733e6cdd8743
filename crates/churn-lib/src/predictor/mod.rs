//! Churn classifier adapter

mod features;
mod inference;
mod loader;
mod logistic;
mod output;

pub use features::{
    FeatureEncoder, FeatureField, FeatureSchema, CHURN_SCHEMA_V1, HIGH_BALANCE_THRESHOLD,
    NUM_FEATURES,
};
pub use inference::{InferenceStats, OnnxPredictor, DEFAULT_SLOW_INFERENCE};
pub use loader::{
    compute_checksum, load_model, ModelCache, ModelConfig, ModelFormat, DEFAULT_MODEL_PATH,
};
pub use logistic::{LogisticArtifact, LogisticPredictor};
pub use output::{OutputConfig, OutputFormatter, RawClassifierOutput, DEFAULT_DECISION_THRESHOLD};

use crate::models::{FeatureVector, PredictionResult};
use anyhow::Result;

/// Trait for churn classifier implementations
pub trait Predictor: Send + Sync {
    /// Classify one encoded profile
    fn predict(&self, features: &FeatureVector) -> Result<PredictionResult>;

    /// Feature schema the model was fit against
    fn schema(&self) -> &'static FeatureSchema;

    /// Get current model version
    fn model_version(&self) -> &str;

    fn stats(&self) -> InferenceStats {
        InferenceStats::default()
    }
}

/// A vector built for another schema is a caller bug, not a prediction.
pub(crate) fn ensure_schema(expected: &FeatureSchema, features: &FeatureVector) -> Result<()> {
    if features.schema_version() != expected.version() || features.len() != expected.len() {
        anyhow::bail!(
            "Feature vector uses schema {} ({} values), model expects {} ({} values)",
            features.schema_version(),
            features.len(),
            expected.version(),
            expected.len()
        );
    }
    Ok(())
}
