//! Classifier Seam

use crate::ScoringError;

/// A trained classifier scoring one feature row at a time.
///
/// Rows arrive in schema order. Implementations must be shareable across
/// threads; the bundle holding them is never mutated after load.
pub trait Classifier: Send + Sync {
    /// Class labels, in the order `predict_proba` reports them
    fn classes(&self) -> &[String];

    /// One probability per class
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ScoringError>;

    /// Label of the most probable class; the first class wins ties
    fn predict(&self, row: &[f64]) -> Result<String, ScoringError> {
        let probabilities = self.predict_proba(row)?;
        let idx = argmax(&probabilities).ok_or(ScoringError::EmptyPrediction)?;
        self.classes()
            .get(idx)
            .cloned()
            .ok_or(ScoringError::ProbabilityShape {
                expected: self.classes().len(),
                actual: probabilities.len(),
            })
    }
}

/// Index of the largest value, first one on ties
pub(crate) fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, top)) if value <= top => {}
            _ => best = Some((idx, value)),
        }
    }
    best.map(|(idx, _)| idx)
}
