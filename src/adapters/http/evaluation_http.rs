//! Evaluation HTTP Server.
//!
//! Exposes the evaluation pipeline to the judging panels: health probes,
//! multipart submission upload and rubric introspection.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domain::models::{
    CriteriaOverview, EvaluationParameters, EvaluationResult, ServerConfig, SubmittedArtifact,
    DEFAULT_AGENT_MODE,
};
use crate::services::{criteria_overview, EvaluationPipeline};

/// Service name reported by the health endpoints.
pub const SERVICE_NAME: &str = "HackEval Agent API";

/// Filename used when the upload part carries none.
const UNNAMED_UPLOAD: &str = "upload";

/// Configuration for the evaluation HTTP server.
#[derive(Debug, Clone)]
pub struct EvaluationHttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Allowed CORS origins; `None` allows any origin.
    pub allowed_origins: Option<Vec<String>>,
    /// Largest accepted request body in bytes.
    pub max_upload_bytes: usize,
}

impl Default for EvaluationHttpConfig {
    fn default() -> Self {
        Self::from(&ServerConfig::default())
    }
}

impl From<&ServerConfig> for EvaluationHttpConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            allowed_origins: config.allowed_origins(),
            max_upload_bytes: config.max_upload_bytes,
        }
    }
}

/// Health probe response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub service: String,
}

/// Error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

/// Shared state for the evaluation HTTP server.
struct AppState {
    pipeline: EvaluationPipeline,
    params: Arc<EvaluationParameters>,
}

/// Evaluation HTTP Server.
pub struct EvaluationHttpServer {
    config: EvaluationHttpConfig,
    pipeline: EvaluationPipeline,
    params: Arc<EvaluationParameters>,
}

impl EvaluationHttpServer {
    pub fn new(
        pipeline: EvaluationPipeline,
        params: Arc<EvaluationParameters>,
        config: EvaluationHttpConfig,
    ) -> Self {
        Self {
            config,
            pipeline,
            params,
        }
    }

    /// Build the router.
    pub fn router(self) -> Router {
        let cors = cors_layer(self.config.allowed_origins.as_deref());
        let state = Arc::new(AppState {
            pipeline: self.pipeline,
            params: self.params,
        });

        Router::new()
            // Health checks
            .route("/", get(health_check))
            .route("/health", get(health_check))
            // Evaluation
            .route("/evaluate", post(evaluate_submission))
            .route("/criteria", get(get_criteria))
            .with_state(state)
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
    }

    /// Start the server.
    pub async fn serve(self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.serve_with_shutdown(std::future::pending()).await
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let router = self.router();

        tracing::info!("Evaluation HTTP server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

fn cors_layer(allowed_origins: Option<&[String]>) -> CorsLayer {
    let Some(origins) = allowed_origins else {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    };

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

// Handler functions

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        service: SERVICE_NAME.to_string(),
    })
}

async fn evaluate_submission(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<EvaluationResult>, ApiError> {
    let mut artifact = None;
    let mut mode = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(e.status(), e.body_text()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field
                    .file_name()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(UNNAMED_UPLOAD)
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| api_error(e.status(), e.body_text()))?;
                artifact = Some(SubmittedArtifact::new(filename, bytes.to_vec()));
            }
            Some("agent_mode") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| api_error(e.status(), e.body_text()))?;
                mode = Some(text);
            }
            _ => {}
        }
    }

    let artifact = artifact.ok_or_else(|| {
        api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "multipart field 'file' is required",
        )
    })?;
    let mode = mode
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AGENT_MODE.to_string());

    state
        .pipeline
        .evaluate(artifact, &mode, Arc::clone(&state.params))
        .await
        .map(Json)
        .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}

async fn get_criteria(State(state): State<Arc<AppState>>) -> Json<CriteriaOverview> {
    Json(criteria_overview(&state.params))
}
