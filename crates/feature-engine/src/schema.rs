//! Feature Schema and Aligned Feature Vectors

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::encoder::ENCODED_COLUMNS;

/// Ordered list of feature names the models were trained on.
///
/// Cloning is cheap; every vector encoded against a schema shares it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Schema {
    names: Arc<[String]>,
}

impl Schema {
    /// Create a schema from names, keeping their order
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Feature names in order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the schema has no features
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of a feature name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// First name that appears more than once
    pub fn first_duplicate(&self) -> Option<&str> {
        let mut seen = HashSet::with_capacity(self.names.len());
        self.names
            .iter()
            .find(|name| !seen.insert(name.as_str()))
            .map(String::as_str)
    }

    /// Schema columns the encoder never produces; always zero-filled
    pub fn missing_from_encoder(&self) -> Vec<&str> {
        self.names
            .iter()
            .map(String::as_str)
            .filter(|name| !ENCODED_COLUMNS.contains(name))
            .collect()
    }

    /// Encoder columns absent from the schema; silently dropped on encode
    pub fn dropped_by_schema(&self) -> Vec<&'static str> {
        ENCODED_COLUMNS
            .iter()
            .copied()
            .filter(|name| self.position(name).is_none())
            .collect()
    }
}

impl From<Vec<String>> for Schema {
    fn from(names: Vec<String>) -> Self {
        Self { names: names.into() }
    }
}

impl From<Schema> for Vec<String> {
    fn from(schema: Schema) -> Self {
        schema.names.to_vec()
    }
}

/// Feature values aligned to a schema, one value per schema name
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    schema: Schema,
    values: Vec<f64>,
}

impl FeatureVector {
    /// All-zero vector for a schema
    pub fn zeros(schema: &Schema) -> Self {
        Self {
            schema: schema.clone(),
            values: vec![0.0; schema.len()],
        }
    }

    /// Set a named value in every slot carrying that name; names outside
    /// the schema are ignored. Returns whether the name was present.
    pub(crate) fn set(&mut self, name: &str, value: f64) -> bool {
        let mut found = false;
        for (slot, _) in self
            .values
            .iter_mut()
            .zip(self.schema.names.iter())
            .filter(|(_, n)| n.as_str() == name)
        {
            *slot = value;
            found = true;
        }
        found
    }

    /// Value for a feature name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.schema.position(name).map(|idx| self.values[idx])
    }

    /// Schema this vector is aligned to
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Values in schema order, the single model input row
    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    /// Iterate `(name, value)` pairs in schema order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
        self.schema
            .names()
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().copied())
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the vector is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
