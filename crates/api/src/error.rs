//! API Error Types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use data_validator::ValidationError;
use feature_engine::EncodeError;
use inference_engine::InferenceError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Errors a prediction request can end in
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid machine type or unparseable reading
    #[error(transparent)]
    Input(#[from] EncodeError),
    /// Reading outside the configured sanity range
    #[error(transparent)]
    OutOfRange(#[from] ValidationError),
    /// Model scoring failure
    #[error(transparent)]
    Inference(InferenceError),
    /// Request body that is not a JSON observation
    #[error("malformed request body: {0}")]
    MalformedBody(String),
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Encode(e) => ApiError::Input(e),
            other => ApiError::Inference(other),
        }
    }
}

/// JSON error body
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl ApiError {
    /// HTTP status for the error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Input(_) | ApiError::MalformedBody(_) => StatusCode::BAD_REQUEST,
            ApiError::OutOfRange(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable error kind, also used as the metrics label
    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Input(EncodeError::InvalidCategory(_)) => "invalid_category",
            ApiError::Input(EncodeError::InvalidNumericInput { .. }) => "invalid_numeric_input",
            ApiError::OutOfRange(_) => "out_of_range",
            ApiError::Inference(InferenceError::Scoring(_)) => "model_scoring_failure",
            ApiError::Inference(_) => "inference_failure",
            ApiError::MalformedBody(_) => "malformed_body",
        }
    }

    /// Offending input field, when known
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ApiError::Input(e) => Some(e.field()),
            ApiError::OutOfRange(ValidationError::OutOfRange { field, .. }) => Some(*field),
            ApiError::Inference(_) | ApiError::MalformedBody(_) => None,
        }
    }

    /// Log at a level matching who is at fault
    pub fn log(&self) {
        match self {
            ApiError::Inference(e) => error!("Prediction failed: {}", e),
            other => warn!("Rejected prediction input: {}", other),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.kind(),
            message: self.to_string(),
            field: self.field(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inference_engine::ScoringError;

    #[test]
    fn test_encode_errors_unwrap_from_inference() {
        let err = ApiError::from(InferenceError::Encode(EncodeError::InvalidCategory("X".into())));
        assert!(matches!(err, ApiError::Input(_)));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "invalid_category");
        assert_eq!(err.field(), Some("Type"));
    }

    #[test]
    fn test_scoring_failure_is_server_error() {
        let err = ApiError::from(InferenceError::Scoring(ScoringError::EmptyPrediction));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.kind(), "model_scoring_failure");
        assert_eq!(err.field(), None);
    }

    #[test]
    fn test_out_of_range_is_unprocessable() {
        let err = ApiError::from(ValidationError::OutOfRange {
            field: "Torque [Nm]",
            value: 250.0,
            min: 0.0,
            max: 200.0,
        });
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.field(), Some("Torque [Nm]"));
    }

    #[test]
    fn test_malformed_body_is_bad_request() {
        let err = ApiError::MalformedBody("expected value at line 1 column 1".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "malformed_body");
        assert_eq!(err.field(), None);
    }
}
