//! Tree Ensemble Classifier
//!
//! Evaluates a random forest exported from training as plain node lists.
//! Each tree walks from node 0; split nodes send a row left when
//! `row[feature] <= threshold`, with the row value first rounded to f32 as
//! the trees were fit on f32 features. Leaf weights are normalized per tree and
//! the forest probability is the mean over trees.

use crate::classifier::Classifier;
use crate::ScoringError;
use serde::{Deserialize, Serialize};

/// A node of an exported decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Per-class weight (sample counts or fractions)
        value: Vec<f64>,
    },
}

/// A single decision tree; node 0 is the root
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Check the tree is well formed for a row width and class count.
    ///
    /// Children must come after their parent, which rules out cycles.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split { feature, threshold, left, right } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {} splits on feature {} but the schema has {} columns",
                            idx, feature, n_features
                        ));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {} has a NaN threshold", idx));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {} has invalid child {}", idx, child));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {} has {} weights for {} classes",
                            idx,
                            value.len(),
                            n_classes
                        ));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {} has a negative or non-finite weight", idx));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {} has no weight", idx));
                    }
                }
            }
        }

        Ok(())
    }

    /// Leaf weights reached by a row
    fn leaf(&self, row: &[f64]) -> Result<&[f64], ScoringError> {
        let mut idx = 0;
        // a well formed tree reaches a leaf within nodes.len() steps
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Split { feature, threshold, left, right }) => {
                    let value = row.get(*feature).ok_or(ScoringError::InputWidth {
                        expected: *feature + 1,
                        actual: row.len(),
                    })?;
                    idx = if (*value as f32) as f64 <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => return Ok(value),
                None => {
                    return Err(ScoringError::Runtime(format!("tree node {} does not exist", idx)))
                }
            }
        }
        Err(ScoringError::Runtime("tree walk did not reach a leaf".to_string()))
    }
}

/// Random forest classifier over exported trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestClassifier {
    /// Class labels as exported at training time
    pub classes: Vec<String>,
    pub trees: Vec<DecisionTree>,
}

impl ForestClassifier {
    /// Create a forest
    pub fn new(classes: Vec<String>, trees: Vec<DecisionTree>) -> Self {
        Self { classes, trees }
    }

    /// Check every tree against the schema width
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.classes.is_empty() {
            return Err("forest has no classes".to_string());
        }
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (idx, tree) in self.trees.iter().enumerate() {
            tree.validate(n_features, self.classes.len())
                .map_err(|e| format!("tree {}: {}", idx, e))?;
        }
        Ok(())
    }
}

impl Classifier for ForestClassifier {
    fn classes(&self) -> &[String] {
        &self.classes
    }

    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ScoringError> {
        if self.trees.is_empty() {
            return Err(ScoringError::EmptyPrediction);
        }

        let mut probabilities = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let weights = tree.leaf(row)?;
            if weights.len() != probabilities.len() {
                return Err(ScoringError::ProbabilityShape {
                    expected: probabilities.len(),
                    actual: weights.len(),
                });
            }
            let total: f64 = weights.iter().sum();
            for (p, w) in probabilities.iter_mut().zip(weights) {
                *p += w / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        probabilities.iter_mut().for_each(|p| *p /= n_trees);
        Ok(probabilities)
    }
}
