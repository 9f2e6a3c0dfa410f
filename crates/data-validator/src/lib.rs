//! Input Range Validation
//!
//! Sanity ranges for the five machine readings, checked by the
//! presentation layer before a prediction is requested.

mod error;
mod validator;

pub use error::ValidationError;
pub use validator::{Range, ValidationConfig, ValidationResult, Validator};
