//! Logistic-regression classifier stored as JSON
//!
//! A lightweight artifact format for linear churn models: one coefficient
//! per schema column plus an intercept. The column list travels with the
//! weights so the layout can be checked against the schema on load.

use super::features::{FeatureSchema, CHURN_SCHEMA_V1};
use super::inference::{InferenceCounter, InferenceStats};
use super::output::{OutputConfig, OutputFormatter, RawClassifierOutput};
use super::{ensure_schema, Predictor};
use crate::error::ChurnError;
use crate::models::{FeatureVector, PredictionResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// On-disk representation of a logistic churn model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticArtifact {
    pub version: String,
    pub schema_version: String,
    pub features: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decision_threshold: Option<f64>,
}

pub struct LogisticPredictor {
    schema: &'static FeatureSchema,
    model_version: String,
    intercept: f64,
    coefficients: Vec<f64>,
    output_formatter: OutputFormatter,
    counter: InferenceCounter,
}

impl LogisticPredictor {
    pub fn from_artifact(
        artifact: LogisticArtifact,
        output_formatter: OutputFormatter,
        slow_after: Duration,
    ) -> Result<Self, ChurnError> {
        let schema = &CHURN_SCHEMA_V1;
        if artifact.schema_version != schema.version() {
            return Err(ChurnError::SchemaMismatch(format!(
                "artifact targets schema {}, encoder produces {}",
                artifact.schema_version,
                schema.version()
            )));
        }
        schema.verify(&artifact.features)?;
        if artifact.coefficients.len() != artifact.features.len() {
            return Err(ChurnError::SchemaMismatch(format!(
                "{} coefficients for {} features",
                artifact.coefficients.len(),
                artifact.features.len()
            )));
        }
        if !artifact.intercept.is_finite() || artifact.coefficients.iter().any(|w| !w.is_finite()) {
            return Err(ChurnError::Inference(
                "artifact contains non-finite weights".to_string(),
            ));
        }

        let output_formatter = match artifact.decision_threshold {
            Some(decision_threshold) => {
                OutputFormatter::with_config(OutputConfig { decision_threshold })
            }
            None => output_formatter,
        };

        Ok(Self {
            schema,
            model_version: artifact.version,
            intercept: artifact.intercept,
            coefficients: artifact.coefficients,
            output_formatter,
            counter: InferenceCounter::new(slow_after),
        })
    }

    fn churn_probability(&self, features: &FeatureVector) -> f64 {
        let logit = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features.values())
                .map(|(w, x)| w * x)
                .sum::<f64>();
        sigmoid(logit)
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Predictor for LogisticPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        ensure_schema(self.schema, features)?;
        let start = Instant::now();

        let p = self.churn_probability(features);
        let raw = RawClassifierOutput {
            label: None,
            probabilities: vec![(1.0 - p) as f32, p as f32],
        };

        self.counter.record(start.elapsed());
        self.output_formatter.format(&raw, &self.model_version)
    }

    fn schema(&self) -> &'static FeatureSchema {
        self.schema
    }

    fn model_version(&self) -> &str {
        &self.model_version
    }

    fn stats(&self) -> InferenceStats {
        self.counter.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CustomerProfile, PredictedLabel};
    use crate::predictor::FeatureEncoder;

    fn artifact(intercept: f64) -> LogisticArtifact {
        LogisticArtifact {
            version: "logit-test".to_string(),
            schema_version: "churn-v1".to_string(),
            features: CHURN_SCHEMA_V1.names().map(String::from).collect(),
            intercept,
            coefficients: vec![0.0; CHURN_SCHEMA_V1.len()],
            decision_threshold: None,
        }
    }

    fn predictor(artifact: LogisticArtifact) -> LogisticPredictor {
        LogisticPredictor::from_artifact(artifact, OutputFormatter::new(), Duration::from_secs(1))
            .unwrap()
    }

    #[test]
    fn test_zero_weights_give_even_odds() {
        let model = predictor(artifact(0.0));
        let features = FeatureEncoder::new().encode(&CustomerProfile::default());
        let result = model.predict(&features).unwrap();
        assert!((result.churn_probability - 0.5).abs() < 1e-6);
        assert_eq!(result.label, PredictedLabel::Churned);
        assert_eq!(result.model_version, "logit-test");
    }

    #[test]
    fn test_coefficients_follow_schema_order() {
        let mut a = artifact(-2.0);
        let inactive_idx = CHURN_SCHEMA_V1.position("active_member").unwrap();
        a.coefficients[inactive_idx] = -3.0;
        let model = predictor(a);
        let encoder = FeatureEncoder::new();

        let active = encoder.encode(&CustomerProfile::default());
        let inactive = encoder.encode(&CustomerProfile {
            active_member: false,
            ..Default::default()
        });
        let p_active = model.predict(&active).unwrap().churn_probability;
        let p_inactive = model.predict(&inactive).unwrap().churn_probability;
        assert!(p_inactive > p_active);
        assert!((p_inactive - sigmoid(-2.0)).abs() < 1e-6);
    }

    #[test]
    fn test_artifact_threshold_overrides_default() {
        let mut a = artifact(0.0);
        a.decision_threshold = Some(0.6);
        let model = predictor(a);
        let features = FeatureEncoder::new().encode(&CustomerProfile::default());
        assert_eq!(model.predict(&features).unwrap().label, PredictedLabel::Retained);
    }

    #[test]
    fn test_reordered_features_rejected() {
        let mut a = artifact(0.0);
        a.features.swap(0, 1);
        let err = LogisticPredictor::from_artifact(a, OutputFormatter::new(), Duration::from_secs(1))
            .err()
            .unwrap();
        assert!(matches!(err, ChurnError::SchemaMismatch(_)));
    }

    #[test]
    fn test_wrong_schema_version_rejected() {
        let mut a = artifact(0.0);
        a.schema_version = "churn-v0".to_string();
        assert!(LogisticPredictor::from_artifact(a, OutputFormatter::new(), Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_coefficient_count_mismatch_rejected() {
        let mut a = artifact(0.0);
        a.coefficients.pop();
        assert!(LogisticPredictor::from_artifact(a, OutputFormatter::new(), Duration::from_secs(1)).is_err());
    }

    #[test]
    fn test_stats_count_predictions() {
        let model = predictor(artifact(0.0));
        let features = FeatureEncoder::new().encode(&CustomerProfile::default());
        model.predict(&features).unwrap();
        model.predict(&features).unwrap();
        assert_eq!(model.stats().total_inferences, 2);
    }
}
