//! Prediction Routes

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form, Json,
};
use feature_engine::RawObservation;
use inference_engine::PredictionResult;
use serde::Serialize;
use std::sync::Arc;

use crate::error::ApiError;
use crate::render::{self, PredictForm, ResultView};
use crate::AppState;

/// JSON prediction response
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub display: ResultView,
}

/// Input form
pub async fn form_page() -> Html<String> {
    Html(render::form_page(&PredictForm::default(), None))
}

/// Form submission; errors are shown above the form
pub async fn submit_form(
    State(state): State<Arc<AppState>>,
    Form(form): Form<PredictForm>,
) -> Response {
    let observation = RawObservation::from(&form);
    match state.predict(&observation) {
        Ok(result) => {
            let view = ResultView::from(&result);
            Html(render::result_page(&form, &view)).into_response()
        }
        Err(err) => {
            let status: StatusCode = err.status();
            (status, Html(render::form_page(&form, Some(&err.to_string())))).into_response()
        }
    }
}

/// JSON prediction
pub async fn predict_json(
    State(state): State<Arc<AppState>>,
    body: Result<Json<RawObservation>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(observation) = body.map_err(|rejection| {
        let err = ApiError::MalformedBody(rejection.body_text());
        err.log();
        err
    })?;
    let result = state.predict(&observation)?;
    Ok(Json(PredictResponse {
        display: ResultView::from(&result),
        result,
    }))
}
