//! Vehicle Failure Prediction Server
//!
//! Web form and JSON API in front of the failure inference engine.

use axum::{
    routing::{get, post},
    Router,
};
use data_validator::Validator;
use feature_engine::RawObservation;
use inference_engine::{InferenceEngine, PredictionResult};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_governor::GovernorLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

pub mod config;
pub mod error;
pub mod rate_limit;
pub mod render;
mod routes;

pub use crate::config::AppConfig;
pub use error::ApiError;

/// Application state shared across handlers
pub struct AppState {
    /// Engine over the bundle loaded at startup
    pub engine: InferenceEngine,
    /// Range checks, `None` when disabled
    pub validator: Option<Validator>,
    /// Prometheus handle, `None` when no recorder is installed
    pub metrics: Option<PrometheusHandle>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: Instant,
}

impl AppState {
    /// Create new application state
    pub fn new(engine: InferenceEngine, validator: Option<Validator>) -> Self {
        Self {
            engine,
            validator,
            metrics: None,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: Instant::now(),
        }
    }

    /// Attach a Prometheus handle for `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    /// Validate the inputs, then run inference
    pub fn predict(&self, observation: &RawObservation) -> Result<PredictionResult, ApiError> {
        let outcome = self.check_ranges(observation).and_then(|()| {
            let start = Instant::now();
            let result = self.engine.infer(observation);
            metrics::histogram!("inference_duration_seconds").record(start.elapsed().as_secs_f64());
            result.map_err(ApiError::from)
        });

        match &outcome {
            Ok(result) => {
                let verdict = if result.will_fail() { "failure" } else { "no_failure" };
                metrics::counter!("predictions_total", "verdict" => verdict).increment(1);
            }
            Err(err) => {
                err.log();
                metrics::counter!("prediction_errors_total", "kind" => err.kind()).increment(1);
            }
        }
        outcome
    }

    fn check_ranges(&self, observation: &RawObservation) -> Result<(), ApiError> {
        let Some(validator) = &self.validator else {
            return Ok(());
        };
        // category first, matching the encoder's error order
        observation.machine_type()?;
        let readings = observation.readings()?;
        validator.validate(&readings).into_result()?;
        Ok(())
    }
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::predict::form_page))
        .route("/predict", post(routes::predict::submit_form))
        .route("/api/v1/predict", post(routes::predict::predict_json))
        .route("/api/v1/health", get(routes::health::health))
        .route("/metrics", get(routes::health::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Initialize logging; `RUST_LOG` takes precedence over the configured level
pub fn init_logging(config: &crate::config::LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow::anyhow!("failed to set tracing subscriber: {}", e))
}

/// Install the global Prometheus recorder
pub fn install_metrics() -> anyhow::Result<PrometheusHandle> {
    Ok(PrometheusBuilder::new().install_recorder()?)
}

/// Load the model bundle and serve until shutdown
pub async fn run_server(config: AppConfig) -> anyhow::Result<()> {
    // a bundle that fails to load is fatal
    let engine = InferenceEngine::load(&config.model.artifact_path)?;
    let validator = config
        .validation
        .enforce_ranges
        .then(|| Validator::new(config.validation.ranges.clone()));

    let state = AppState::new(engine, validator).with_metrics(install_metrics()?);
    let mut app = create_router(Arc::new(state));

    if config.rate_limit.enabled {
        match rate_limit::create_governor_config(&config.rate_limit) {
            Some(governor) => app = app.layer(GovernorLayer { config: governor }),
            None => warn!("Invalid rate limit settings {:?}, limiter disabled", config.rate_limit),
        }
    }

    info!("Starting API server on {}", config.server.addr);

    let listener = tokio::net::TcpListener::bind(&config.server.addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>()).await?;

    Ok(())
}
