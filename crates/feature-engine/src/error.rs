//! Encoding Error Types

use thiserror::Error;

/// Errors raised while turning a raw observation into a feature vector.
///
/// Both variants describe bad user input, never a model problem.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EncodeError {
    /// Machine type outside the L / M / H set
    #[error("machine type must be one of: L, M, H (got '{0}')")]
    InvalidCategory(String),

    /// A reading could not be coerced to its numeric type
    #[error("{field} {reason} (got '{value}')")]
    InvalidNumericInput {
        field: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl EncodeError {
    /// Name of the offending input column
    pub fn field(&self) -> &'static str {
        match self {
            EncodeError::InvalidCategory(_) => "Type",
            EncodeError::InvalidNumericInput { field, .. } => field,
        }
    }
}
