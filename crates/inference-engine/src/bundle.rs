//! Model Bundle and Artifact Loading
//!
//! The artifact is a single file with four members: the binary failure
//! classifier, the failure type classifier, the ordered feature columns and
//! the decision threshold. `.json` files are read with serde_json, anything
//! else as postcard.

use crate::classifier::Classifier;
use crate::forest::ForestClassifier;
use crate::onnx::OnnxClassifier;
use crate::InferenceError;
use feature_engine::Schema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Number of classes the binary classifier must expose
pub const BINARY_CLASS_COUNT: usize = 2;

/// Serialized form of one classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSpec {
    /// Tree ensemble stored inline
    Forest(ForestClassifier),
    /// ONNX graph stored next to the artifact
    Onnx(OnnxModelRef),
}

/// Reference to an ONNX graph file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnnxModelRef {
    /// Path, relative to the artifact file
    pub path: String,
    /// Class labels in probability order
    pub classes: Vec<String>,
    /// Index of the probability output tensor
    #[serde(default = "default_probabilities_output")]
    pub probabilities_output: usize,
}

fn default_probabilities_output() -> usize {
    1
}

/// On-disk artifact layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactFile {
    pub rf_binary_model: ModelSpec,
    pub rf_failure_type_model: ModelSpec,
    pub feature_cols: Vec<String>,
    pub final_threshold: f64,
}

impl ArtifactFile {
    /// Serialize to the encoding implied by the path extension
    pub fn to_bytes(&self, path: &Path) -> Result<Vec<u8>, String> {
        if is_json(path) {
            serde_json::to_vec_pretty(self).map_err(|e| e.to_string())
        } else {
            postcard::to_allocvec(self).map_err(|e| e.to_string())
        }
    }

    /// Parse bytes in the encoding implied by the path extension
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, String> {
        if is_json(path) {
            serde_json::from_slice(bytes).map_err(|e| e.to_string())
        } else {
            postcard::from_bytes(bytes).map_err(|e| e.to_string())
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Trained models plus the schema and threshold they were tuned with.
///
/// Immutable once built; share it behind an `Arc` across requests.
pub struct ModelBundle {
    binary: Box<dyn Classifier>,
    failure_type: Box<dyn Classifier>,
    schema: Schema,
    threshold: f64,
}

impl ModelBundle {
    /// Assemble a bundle from already constructed parts
    pub fn new(
        binary: Box<dyn Classifier>,
        failure_type: Box<dyn Classifier>,
        schema: Schema,
        threshold: f64,
    ) -> Result<Self, InferenceError> {
        let invalid = |reason: String| InferenceError::ArtifactLoad {
            path: "<in-memory>".to_string(),
            reason,
        };

        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            return Err(invalid(format!("threshold {} is outside [0, 1]", threshold)));
        }
        if schema.is_empty() {
            return Err(invalid("feature schema is empty".to_string()));
        }
        if let Some(name) = schema.first_duplicate() {
            return Err(invalid(format!("feature '{}' appears twice in the schema", name)));
        }
        if binary.classes().len() != BINARY_CLASS_COUNT {
            return Err(invalid(format!(
                "binary classifier has {} classes, expected {}",
                binary.classes().len(),
                BINARY_CLASS_COUNT
            )));
        }
        if failure_type.classes().is_empty() {
            return Err(invalid("failure type classifier has no classes".to_string()));
        }

        Ok(Self {
            binary,
            failure_type,
            schema,
            threshold,
        })
    }

    /// Load a bundle from an artifact file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, InferenceError> {
        let path = path.as_ref();
        info!("Loading model artifact: {}", path.display());

        let load_error = |reason: String| InferenceError::ArtifactLoad {
            path: path.display().to_string(),
            reason,
        };

        let bytes = std::fs::read(path).map_err(|e| load_error(e.to_string()))?;
        let artifact = ArtifactFile::from_bytes(path, &bytes).map_err(load_error)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        Self::from_artifact(artifact, base_dir).map_err(|e| match e {
            InferenceError::ArtifactLoad { reason, .. } => load_error(reason),
            other => other,
        })
    }

    /// Build a bundle from a parsed artifact, resolving ONNX paths against `base_dir`
    pub fn from_artifact(artifact: ArtifactFile, base_dir: &Path) -> Result<Self, InferenceError> {
        let schema = Schema::from(artifact.feature_cols);
        let binary = build_classifier("rf_binary_model", artifact.rf_binary_model, &schema, base_dir)?;
        let failure_type = build_classifier(
            "rf_failure_type_model",
            artifact.rf_failure_type_model,
            &schema,
            base_dir,
        )?;

        let bundle = Self::new(binary, failure_type, schema, artifact.final_threshold)?;
        info!(
            "Model bundle ready: {} features, threshold {:.2}",
            bundle.schema.len(),
            bundle.threshold
        );
        Ok(bundle)
    }

    /// Binary failure classifier
    pub fn binary(&self) -> &dyn Classifier {
        self.binary.as_ref()
    }

    /// Failure type classifier
    pub fn failure_type(&self) -> &dyn Classifier {
        self.failure_type.as_ref()
    }

    /// Feature schema
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Decision threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

fn build_classifier(
    member: &str,
    spec: ModelSpec,
    schema: &Schema,
    base_dir: &Path,
) -> Result<Box<dyn Classifier>, InferenceError> {
    let invalid = |reason: String| InferenceError::ArtifactLoad {
        path: member.to_string(),
        reason: format!("{}: {}", member, reason),
    };

    match spec {
        ModelSpec::Forest(forest) => {
            forest.validate(schema.len()).map_err(invalid)?;
            Ok(Box::new(forest))
        }
        ModelSpec::Onnx(model) => {
            let path: PathBuf = base_dir.join(&model.path);
            let classifier = OnnxClassifier::load(
                &path,
                schema.len(),
                model.classes,
                model.probabilities_output,
            )
            .map_err(invalid)?;
            Ok(Box::new(classifier))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{DecisionTree, TreeNode};
    use std::io::Write;

    fn stump_forest(classes: &[&str], feature: usize) -> ForestClassifier {
        let n = classes.len();
        let mut left = vec![0.0; n];
        let mut right = vec![0.0; n];
        left[0] = 1.0;
        right[n - 1] = 1.0;
        ForestClassifier::new(
            classes.iter().map(|c| c.to_string()).collect(),
            vec![DecisionTree {
                nodes: vec![
                    TreeNode::Split { feature, threshold: 1.0, left: 1, right: 2 },
                    TreeNode::Leaf { value: left },
                    TreeNode::Leaf { value: right },
                ],
            }],
        )
    }

    fn artifact(threshold: f64, feature_cols: &[&str]) -> ArtifactFile {
        ArtifactFile {
            rf_binary_model: ModelSpec::Forest(stump_forest(&["0", "1"], 0)),
            rf_failure_type_model: ModelSpec::Forest(stump_forest(
                &["Power Failure", "Tool Wear Failure"],
                1,
            )),
            feature_cols: feature_cols.iter().map(|c| c.to_string()).collect(),
            final_threshold: threshold,
        }
    }

    fn write_artifact(dir: &Path, name: &str, artifact: &ArtifactFile) -> PathBuf {
        let path = dir.join(name);
        let bytes = artifact.to_bytes(&path).unwrap();
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&bytes).unwrap();
        path
    }

    #[test]
    fn test_load_json_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), "artifacts.json", &artifact(0.35, &["Torque [Nm]", "Type_L"]));

        let bundle = ModelBundle::load(&path).unwrap();
        assert_eq!(bundle.threshold(), 0.35);
        assert_eq!(bundle.schema().names(), &["Torque [Nm]".to_string(), "Type_L".to_string()]);
        assert_eq!(bundle.binary().classes(), &["0".to_string(), "1".to_string()]);
    }

    #[test]
    fn test_load_postcard_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_artifact(dir.path(), "artifacts.bin", &artifact(0.5, &["a", "b"]));

        let bundle = ModelBundle::load(&path).unwrap();
        assert_eq!(bundle.schema().len(), 2);
        assert_eq!(bundle.failure_type().classes().len(), 2);
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let err = ModelBundle::load("/nonexistent/artifacts.json").err().unwrap();
        match err {
            InferenceError::ArtifactLoad { path, .. } => assert!(path.ends_with("artifacts.json")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_corrupt_file_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("artifacts.json");
        std::fs::write(&path, b"{ not json").unwrap();
        assert!(matches!(
            ModelBundle::load(&path),
            Err(InferenceError::ArtifactLoad { .. })
        ));
    }

    #[test]
    fn test_rejects_threshold_outside_unit_interval() {
        let dir = tempfile::tempdir().unwrap();
        for threshold in [-0.1, 1.5, f64::NAN] {
            let result = ModelBundle::from_artifact(artifact(threshold, &["a", "b"]), dir.path());
            assert!(matches!(result, Err(InferenceError::ArtifactLoad { .. })));
        }
    }

    #[test]
    fn test_rejects_duplicate_schema_names() {
        let result = ModelBundle::from_artifact(artifact(0.5, &["a", "a"]), Path::new("."));
        let reason = match result {
            Err(InferenceError::ArtifactLoad { reason, .. }) => reason,
            _ => panic!("expected load failure"),
        };
        assert!(reason.contains("'a'"));
    }

    #[test]
    fn test_rejects_forest_wider_than_schema() {
        // failure type stump splits on feature 1
        let result = ModelBundle::from_artifact(artifact(0.5, &["a"]), Path::new("."));
        let reason = match result {
            Err(InferenceError::ArtifactLoad { reason, .. }) => reason,
            _ => panic!("expected load failure"),
        };
        assert!(reason.starts_with("rf_failure_type_model"));
    }

    #[test]
    fn test_rejects_non_binary_classifier() {
        let mut file = artifact(0.5, &["a", "b"]);
        file.rf_binary_model = ModelSpec::Forest(stump_forest(&["0", "1", "2"], 0));
        assert!(ModelBundle::from_artifact(file, Path::new(".")).is_err());
    }

    #[test]
    fn test_missing_onnx_graph_is_load_failure() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = artifact(0.5, &["a", "b"]);
        file.rf_failure_type_model = ModelSpec::Onnx(OnnxModelRef {
            path: "missing.onnx".to_string(),
            classes: vec!["Power Failure".to_string()],
            probabilities_output: 1,
        });
        assert!(matches!(
            ModelBundle::from_artifact(file, dir.path()),
            Err(InferenceError::ArtifactLoad { .. })
        ));
    }
}
