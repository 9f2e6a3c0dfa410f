//! Inference Engine Implementation

use crate::bundle::ModelBundle;
use crate::{InferenceError, ScoringError};
use feature_engine::{encode, RawObservation};
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Position of the "will fail" class in the binary classifier output
pub const POSITIVE_CLASS_INDEX: usize = 1;

/// Outcome of one prediction.
///
/// `failure_type` is set exactly when `will_fail` is true.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    probability: f64,
    threshold: f64,
    will_fail: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    failure_type: Option<String>,
}

impl PredictionResult {
    /// Probability of the positive class
    pub fn probability(&self) -> f64 {
        self.probability
    }

    /// Threshold the verdict was taken against
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Whether failure is predicted
    pub fn will_fail(&self) -> bool {
        self.will_fail
    }

    /// Predicted failure type, only when failure is predicted
    pub fn failure_type(&self) -> Option<&str> {
        self.failure_type.as_deref()
    }
}

/// Stateless predictor over an immutable model bundle
pub struct InferenceEngine {
    bundle: ModelBundle,
}

impl InferenceEngine {
    /// Create an engine owning a bundle
    pub fn new(bundle: ModelBundle) -> Self {
        let schema = bundle.schema();

        let dropped = schema.dropped_by_schema();
        if !dropped.is_empty() {
            warn!("Encoded columns missing from the model schema will be ignored: {:?}", dropped);
        }
        let zero_filled = schema.missing_from_encoder();
        if !zero_filled.is_empty() {
            warn!("Schema columns never produced by the encoder will be zero: {:?}", zero_filled);
        }

        info!(
            "Inference engine ready: {} features, threshold {:.2}",
            schema.len(),
            bundle.threshold()
        );
        Self { bundle }
    }

    /// Load the artifact and create an engine
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        Ok(Self::new(ModelBundle::load(path)?))
    }

    /// Predict failure, and the failure type when failure is likely
    pub fn infer(&self, observation: &RawObservation) -> Result<PredictionResult, InferenceError> {
        let start = std::time::Instant::now();

        let features = encode(observation, self.bundle.schema())?;
        let row = features.as_slice();

        let probabilities = self.bundle.binary().predict_proba(row)?;
        let probability = *probabilities
            .get(POSITIVE_CLASS_INDEX)
            .ok_or(ScoringError::ProbabilityShape {
                expected: crate::bundle::BINARY_CLASS_COUNT,
                actual: probabilities.len(),
            })?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(ScoringError::InvalidProbability(probability).into());
        }

        let threshold = self.bundle.threshold();
        let will_fail = probability >= threshold;

        let failure_type = if will_fail {
            Some(self.bundle.failure_type().predict(row)?)
        } else {
            None
        };

        debug!(
            "Prediction: p={:.3} threshold={:.2} will_fail={} type={:?} ({}us)",
            probability,
            threshold,
            will_fail,
            failure_type,
            start.elapsed().as_micros()
        );

        Ok(PredictionResult {
            probability,
            threshold,
            will_fail,
            failure_type,
        })
    }

    /// Get the loaded bundle
    pub fn bundle(&self) -> &ModelBundle {
        &self.bundle
    }
}
