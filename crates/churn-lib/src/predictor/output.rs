//! Classifier output post-processing
//!
//! Handles conversion of raw classifier outputs (class label and class
//! probabilities) into a PredictionResult.

use crate::models::{PredictedLabel, PredictionResult};
use anyhow::Result;

/// Default probability at or above which a customer is labelled as churned
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

/// Raw values read off a binary classifier
#[derive(Debug, Clone, Default)]
pub struct RawClassifierOutput {
    /// Predicted class index, if the model emits one
    pub label: Option<i64>,
    /// Either `[p(retained), p(churned)]` or a single `p(churned)`
    pub probabilities: Vec<f32>,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Threshold used when the model emits probabilities only
    pub decision_threshold: f64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            decision_threshold: DEFAULT_DECISION_THRESHOLD,
        }
    }
}

/// Formats raw classifier outputs into a PredictionResult
#[derive(Debug, Clone, Default)]
pub struct OutputFormatter {
    config: OutputConfig,
}

impl OutputFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: OutputConfig) -> Self {
        Self { config }
    }

    pub fn decision_threshold(&self) -> f64 {
        self.config.decision_threshold
    }

    pub fn format(&self, raw: &RawClassifierOutput, model_version: &str) -> Result<PredictionResult> {
        let churn_probability = match raw.probabilities.as_slice() {
            [_, churned] => *churned as f64,
            [churned] => *churned as f64,
            other => anyhow::bail!(
                "Classifier returned {} probabilities, expected 1 or 2",
                other.len()
            ),
        };

        if !churn_probability.is_finite() {
            anyhow::bail!("Classifier returned a non-finite probability");
        }
        let churn_probability = churn_probability.clamp(0.0, 1.0);

        let label = match raw.label {
            Some(class) => PredictedLabel::from_class(class).ok_or_else(|| {
                anyhow::anyhow!("Classifier returned class {}, expected 0 or 1", class)
            })?,
            None => self.label_for(churn_probability),
        };

        Ok(PredictionResult {
            label,
            churn_probability,
            model_version: model_version.to_string(),
        })
    }

    /// Label implied by a churn probability under the configured threshold
    pub fn label_for(&self, churn_probability: f64) -> PredictedLabel {
        if churn_probability >= self.config.decision_threshold {
            PredictedLabel::Churned
        } else {
            PredictedLabel::Retained
        }
    }
}
