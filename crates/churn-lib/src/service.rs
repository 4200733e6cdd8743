//! Prediction orchestration
//!
//! Composes encode -> predict -> assess risk -> recommend into one
//! request/response cycle. The service is only constructible from an
//! already-loaded model, so a failed load never reaches the encoder.

use crate::error::ChurnError;
use crate::models::{CustomerProfile, PredictionReport};
use crate::observability::PredictionLogger;
use crate::predictor::{load_model, FeatureEncoder, InferenceStats, ModelConfig, Predictor};
use crate::recommendations::recommend;
use crate::risk::assess_risk;
use std::sync::Arc;
use tracing::debug;

/// Runs churn predictions against one loaded model
#[derive(Clone)]
pub struct PredictionService {
    predictor: Arc<dyn Predictor>,
    encoder: FeatureEncoder,
    logger: Option<PredictionLogger>,
}

impl PredictionService {
    pub fn new(predictor: Arc<dyn Predictor>) -> Self {
        let encoder = FeatureEncoder::with_schema(predictor.schema());
        Self {
            predictor,
            encoder,
            logger: None,
        }
    }

    /// Load the configured artifact and build a service around it
    pub fn load(config: &ModelConfig) -> Result<Self, ChurnError> {
        Ok(Self::new(load_model(config)?))
    }

    pub fn with_logger(mut self, logger: PredictionLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn encoder(&self) -> &FeatureEncoder {
        &self.encoder
    }

    pub fn model_version(&self) -> &str {
        self.predictor.model_version()
    }

    pub fn stats(&self) -> InferenceStats {
        self.predictor.stats()
    }

    /// Score one profile. Any predictor failure fails the whole request.
    pub fn run(&self, profile: &CustomerProfile) -> Result<PredictionReport, ChurnError> {
        let features = self.encoder.encode(profile);
        debug!(schema = %features.schema_version(), "Encoded customer profile");

        let result = self
            .predictor
            .predict(&features)
            .map_err(|e| ChurnError::Inference(format!("{:#}", e)))?;

        let report = PredictionReport {
            risk: assess_risk(profile),
            recommendations: recommend(result.label),
            result,
        };

        if let Some(logger) = &self.logger {
            logger.log_prediction(&report);
        }
        Ok(report)
    }

    /// Score many profiles; each entry succeeds or fails on its own
    pub fn run_batch(&self, profiles: &[CustomerProfile]) -> Vec<Result<PredictionReport, ChurnError>> {
        profiles
            .iter()
            .enumerate()
            .map(|(idx, profile)| {
                let outcome = self.run(profile);
                if let (Err(e), Some(logger)) = (&outcome, &self.logger) {
                    logger.log_prediction_failed(idx, e);
                }
                outcome
            })
            .collect()
    }
}
