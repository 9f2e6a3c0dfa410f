//! Failure Inference Engine
//!
//! Scores an observation with the binary failure classifier, applies the
//! decision threshold and, when failure is predicted, asks the failure type
//! classifier for a label.

mod bundle;
mod classifier;
mod engine;
mod forest;
mod onnx;

pub use bundle::{ArtifactFile, ModelBundle, ModelSpec, OnnxModelRef, BINARY_CLASS_COUNT};
pub use classifier::Classifier;
pub use engine::{InferenceEngine, PredictionResult, POSITIVE_CLASS_INDEX};
pub use forest::{DecisionTree, ForestClassifier, TreeNode};
pub use onnx::OnnxClassifier;

use feature_engine::EncodeError;
use thiserror::Error;

/// Failures raised by a classifier while scoring
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("Model returned {actual} probabilities, expected {expected}")]
    ProbabilityShape { expected: usize, actual: usize },
    #[error("Model expects {expected} features, got {actual}")]
    InputWidth { expected: usize, actual: usize },
    #[error("Model returned probability {0} outside [0, 1]")]
    InvalidProbability(f64),
    #[error("Model produced no prediction")]
    EmptyPrediction,
    #[error("Model runtime error: {0}")]
    Runtime(String),
}

/// Errors during inference
#[derive(Debug, Error)]
pub enum InferenceError {
    /// Bad user input, passed through from the encoder
    #[error(transparent)]
    Encode(#[from] EncodeError),
    /// Classifier failure while scoring
    #[error(transparent)]
    Scoring(#[from] ScoringError),
    /// The model artifact could not be loaded
    #[error("Model load failed ({path}): {reason}")]
    ArtifactLoad { path: String, reason: String },
}

impl InferenceError {
    /// Whether the error was caused by user input rather than the models
    pub fn is_input_error(&self) -> bool {
        matches!(self, InferenceError::Encode(_))
    }
}
