//! ONNX inference using tract
//!
//! Runs a binary churn classifier exported to ONNX (tree ensembles
//! converted with zipmap disabled, or any graph taking `f32[1, 21]`).

use super::features::{FeatureSchema, CHURN_SCHEMA_V1};
use super::output::{OutputFormatter, RawClassifierOutput};
use super::{ensure_schema, Predictor};
use crate::models::{FeatureVector, PredictionResult};
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tract_onnx::prelude::*;
use tracing::{debug, warn};

/// Default latency above which an inference is counted as slow
pub const DEFAULT_SLOW_INFERENCE: Duration = Duration::from_millis(50);

type TractModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// Inference statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InferenceStats {
    pub total_inferences: u64,
    pub slow_inferences: u64,
}

/// Lock-free counters shared by predictor implementations
#[derive(Debug)]
pub(crate) struct InferenceCounter {
    slow_after: Duration,
    total: AtomicU64,
    slow: AtomicU64,
}

impl InferenceCounter {
    pub(crate) fn new(slow_after: Duration) -> Self {
        Self {
            slow_after,
            total: AtomicU64::new(0),
            slow: AtomicU64::new(0),
        }
    }

    pub(crate) fn record(&self, elapsed: Duration) {
        self.total.fetch_add(1, Ordering::Relaxed);
        if elapsed > self.slow_after {
            self.slow.fetch_add(1, Ordering::Relaxed);
            warn!(
                elapsed_ms = elapsed.as_millis() as u64,
                "Inference exceeded {}ms target",
                self.slow_after.as_millis()
            );
        } else {
            debug!(elapsed_us = elapsed.as_micros() as u64, "Inference completed");
        }
    }

    pub(crate) fn snapshot(&self) -> InferenceStats {
        InferenceStats {
            total_inferences: self.total.load(Ordering::Relaxed),
            slow_inferences: self.slow.load(Ordering::Relaxed),
        }
    }
}

/// Last input dimension as declared by the graph, when it is concrete
fn declared_width(model: &InferenceModel) -> Option<usize> {
    let typed = model.clone().into_typed().ok()?;
    let fact = typed.input_fact(0).ok()?;
    fact.shape.as_concrete()?.last().copied()
}

/// ONNX-based churn classifier
pub struct OnnxPredictor {
    model: TractModel,
    schema: &'static FeatureSchema,
    model_version: String,
    output_formatter: OutputFormatter,
    counter: InferenceCounter,
}

impl OnnxPredictor {
    /// Create a new predictor from model bytes
    pub fn new(
        model_bytes: &[u8],
        model_version: impl Into<String>,
        output_formatter: OutputFormatter,
        slow_after: Duration,
    ) -> Result<Self> {
        let schema = &CHURN_SCHEMA_V1;
        let model = Self::load_model(model_bytes, schema)?;
        Ok(Self {
            model,
            schema,
            model_version: model_version.into(),
            output_formatter,
            counter: InferenceCounter::new(slow_after),
        })
    }

    /// Load and optimize an ONNX model from bytes.
    ///
    /// A graph that declares a concrete input width other than the schema's
    /// is a `SchemaMismatch`. Pinning the input fact to `[1, width]` covers
    /// graphs with symbolic dimensions.
    fn load_model(model_bytes: &[u8], schema: &FeatureSchema) -> Result<TractModel> {
        let model = tract_onnx::onnx()
            .model_for_read(&mut std::io::Cursor::new(model_bytes))
            .context("Failed to parse ONNX model")?;

        if let Some(width) = declared_width(&model) {
            schema.verify_width(width)?;
        }

        let width = schema.len();
        let model = model
            .with_input_fact(0, f32::fact([1, width]).into())
            .context("Failed to set input shape")?
            .into_optimized()
            .with_context(|| format!("Model does not accept a {}-feature input", width))?
            .into_runnable()
            .context("Failed to create runnable model")?;
        Ok(model)
    }

    /// Convert feature vector to tensor input
    fn features_to_tensor(&self, features: &FeatureVector) -> Result<Tensor> {
        let data = features.to_f32();
        let array = tract_ndarray::Array2::from_shape_vec((1, data.len()), data)
            .context("Failed to shape feature tensor")?;
        Ok(array.into())
    }

    /// Read label and probability tensors off the model outputs
    fn read_outputs(outputs: &[TValue]) -> Result<RawClassifierOutput> {
        let mut raw = RawClassifierOutput::default();
        for output in outputs {
            if let Ok(labels) = output.to_array_view::<i64>() {
                raw.label = raw.label.or_else(|| labels.iter().next().copied());
            } else if let Ok(probs) = output.to_array_view::<f32>() {
                if raw.probabilities.is_empty() {
                    raw.probabilities = probs.iter().copied().collect();
                }
            }
        }
        if raw.probabilities.is_empty() {
            anyhow::bail!("Model produced no probability output");
        }
        Ok(raw)
    }
}

impl Predictor for OnnxPredictor {
    fn predict(&self, features: &FeatureVector) -> Result<PredictionResult> {
        ensure_schema(self.schema, features)?;
        let start = Instant::now();

        let input = self.features_to_tensor(features)?;
        let outputs = self.model.run(tvec!(input.into()))?;
        let raw = Self::read_outputs(&outputs)?;

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

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = OnnxPredictor::new(
            b"definitely not a protobuf",
            "v1",
            OutputFormatter::new(),
            DEFAULT_SLOW_INFERENCE,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_counter_tracks_slow_inferences() {
        let counter = InferenceCounter::new(Duration::from_millis(10));
        counter.record(Duration::from_millis(1));
        counter.record(Duration::from_millis(20));
        let stats = counter.snapshot();
        assert_eq!(stats.total_inferences, 2);
        assert_eq!(stats.slow_inferences, 1);
    }

    #[test]
    fn test_read_outputs_label_and_probabilities() {
        let label: Tensor = tract_ndarray::arr1(&[1i64]).into();
        let probs: Tensor = tract_ndarray::arr2(&[[0.2f32, 0.8]]).into();
        let raw = OnnxPredictor::read_outputs(&[label.into(), probs.into()]).unwrap();
        assert_eq!(raw.label, Some(1));
        assert_eq!(raw.probabilities, vec![0.2, 0.8]);
    }

    #[test]
    fn test_read_outputs_requires_probabilities() {
        let label: Tensor = tract_ndarray::arr1(&[0i64]).into();
        assert!(OnnxPredictor::read_outputs(&[label.into()]).is_err());
    }
}
