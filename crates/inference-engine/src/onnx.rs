//! ONNX Classifier
//!
//! Runs an exported classifier graph with tract. The graph takes a single
//! `[1, n_features]` f32 input and must expose a `[1, n_classes]` f32
//! probability tensor (export without ZipMap).

use crate::classifier::Classifier;
use crate::ScoringError;
use std::path::Path;
use tracing::info;
use tract_onnx::prelude::*;

/// Classifier backed by an optimized tract plan
pub struct OnnxClassifier {
    plan: TypedRunnableModel<TypedModel>,
    classes: Vec<String>,
    n_features: usize,
    probabilities_output: usize,
}

impl OnnxClassifier {
    /// Load and optimize a graph for a fixed row width
    pub fn load(
        path: &Path,
        n_features: usize,
        classes: Vec<String>,
        probabilities_output: usize,
    ) -> Result<Self, String> {
        info!("Loading ONNX classifier from {}", path.display());

        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact([1, n_features]).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| format!("{}: {}", path.display(), e))?;

        Ok(Self {
            plan,
            classes,
            n_features,
            probabilities_output,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ScoringError> {
        if row.len() != self.n_features {
            return Err(ScoringError::InputWidth {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let data: Vec<f32> = row.iter().map(|&v| v as f32).collect();
        let input = Tensor::from_shape(&[1, self.n_features], &data)
            .map_err(|e| ScoringError::Runtime(e.to_string()))?;

        let outputs = self
            .plan
            .run(tvec!(input.into()))
            .map_err(|e| ScoringError::Runtime(e.to_string()))?;

        let tensor = outputs.get(self.probabilities_output).ok_or_else(|| {
            ScoringError::Runtime(format!(
                "graph has {} outputs, probabilities expected at {}",
                outputs.len(),
                self.probabilities_output
            ))
        })?;

        let probabilities: Vec<f64> = tensor
            .to_array_view::<f32>()
            .map_err(|e| ScoringError::Runtime(e.to_string()))?
            .iter()
            .map(|&p| p as f64)
            .collect();

        if probabilities.len() != self.classes.len() {
            return Err(ScoringError::ProbabilityShape {
                expected: self.classes.len(),
                actual: probabilities.len(),
            });
        }

        Ok(probabilities)
    }
}
