//! Structured logging for prediction events
//!
//! Provides consistent event-tagged tracing output for model loading and
//! predictions. The subscriber (JSON or text) is chosen by the binary.

use crate::error::ChurnError;
use crate::models::{CustomerProfile, PredictionReport};
use std::path::Path;
use tracing::{error, info, warn};

/// Structured logger for prediction events
#[derive(Debug, Clone)]
pub struct PredictionLogger {
    source: String,
}

impl PredictionLogger {
    /// `source` names the caller (e.g. "cli", "batch:customers.json")
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Log a prediction generation event
    pub fn log_prediction(&self, report: &PredictionReport) {
        info!(
            event = "prediction_generated",
            source = %self.source,
            label = %report.result.label,
            churn_probability = report.result.churn_probability,
            risk_factors = report.risk.len(),
            model_version = %report.result.model_version,
            "Generated churn prediction"
        );
    }

    /// Log a successful model load
    pub fn log_model_loaded(&self, path: &Path, model_version: &str, schema_version: &str) {
        info!(
            event = "model_loaded",
            source = %self.source,
            path = %path.display(),
            model_version = %model_version,
            schema = %schema_version,
            "Churn model ready"
        );
    }

    /// Log a failed model load; inference is halted afterwards
    pub fn log_model_unavailable(&self, err: &ChurnError) {
        error!(
            event = "model_unavailable",
            source = %self.source,
            error = %err,
            "Churn model unavailable, halting"
        );
    }

    /// Log a profile passed through despite failing range validation
    pub fn log_out_of_range(&self, profile: &CustomerProfile, err: &ChurnError) {
        warn!(
            event = "profile_out_of_range",
            source = %self.source,
            credit_score = profile.credit_score,
            age = profile.age,
            tenure = profile.tenure,
            products_number = profile.products_number,
            error = %err,
            "Scoring profile outside documented ranges"
        );
    }

    /// Log a single failed request in a batch
    pub fn log_prediction_failed(&self, index: usize, err: &ChurnError) {
        warn!(
            event = "prediction_failed",
            source = %self.source,
            index = index,
            error = %err,
            "Churn prediction failed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prediction_logger_creation() {
        let logger = PredictionLogger::new("test-cli");
        assert_eq!(logger.source(), "test-cli");
    }
}
