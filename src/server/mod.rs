//! Axum-based HTTP surface for the pipelines.
//!
//! Thin plumbing: handlers deserialize the request body, call the pipeline,
//! and translate [`ChainError`] into a status code — schema violations from
//! the model become a client-visible 422 with the detail string, everything
//! else an opaque 500. Request-body limits and timeouts follow the gateway
//! conventions: a small cap on the JSON routes, a separate budget on the
//! upload route.

pub mod upload;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::error;

use crate::client::CompletionClient;
use crate::error::ChainError;
use crate::pipeline::{DiaryAnalyzer, TaskPlanner};
use crate::schema::DiaryAnalysis;
use self::upload::UploadConfig;

/// Maximum JSON request body size (64 KiB).
pub const MAX_JSON_BODY: usize = 65_536;
/// Whole-request timeout. Generous: one completion call can take a while.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TaskPlanner>,
    pub analyzer: Arc<DiaryAnalyzer>,
    pub uploads: UploadConfig,
}

impl AppState {
    /// Build the state from the process-wide completion client.
    pub fn new(client: Arc<CompletionClient>, uploads: UploadConfig) -> Self {
        Self {
            planner: Arc::new(TaskPlanner::new(client.clone())),
            analyzer: Arc::new(DiaryAnalyzer::new(client)),
            uploads,
        }
    }
}

/// `POST /task/parse` request body.
#[derive(Debug, Deserialize)]
pub struct TaskParseRequest {
    /// The user's natural-language feature request.
    pub prompt: String,
}

/// `POST /task/parse` response body.
#[derive(Debug, Serialize)]
pub struct TaskParseResponse {
    pub tasks: Vec<String>,
}

/// `POST /analyze-diary` request body.
#[derive(Debug, Deserialize)]
pub struct DiaryRequest {
    /// The diary text.
    pub content: String,
}

/// Error wrapper translating [`ChainError`] to an HTTP response.
pub struct ApiError(ChainError);

impl From<ChainError> for ApiError {
    fn from(err: ChainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            // Bad prompt → bad model output: client-visible with detail.
            ChainError::Parse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            // Infrastructure failure: opaque server error.
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }

        (status, Json(json!({"detail": self.0.to_string()}))).into_response()
    }
}

async fn parse_task(
    State(state): State<AppState>,
    Json(req): Json<TaskParseRequest>,
) -> Result<Json<TaskParseResponse>, ApiError> {
    let list = state.planner.plan(&req.prompt).await?;
    Ok(Json(TaskParseResponse { tasks: list.tasks }))
}

async fn analyze_diary(
    State(state): State<AppState>,
    Json(req): Json<DiaryRequest>,
) -> Result<Json<DiaryAnalysis>, ApiError> {
    let result = state.analyzer.analyze(&req.content).await?;
    Ok(Json(result))
}

async fn index() -> Json<Value> {
    Json(json!({"message": "prompt-chain service is running"}))
}

async fn health() -> Json<Value> {
    Json(json!({"status": "ok"}))
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/task/parse", post(parse_task))
        .route("/analyze-diary", post(analyze_diary))
        .layer(RequestBodyLimitLayer::new(MAX_JSON_BODY));

    let uploads = Router::new()
        .route("/api/v1/upload", post(upload::handle))
        .layer(DefaultBodyLimit::max(state.uploads.body_budget()));

    Router::new()
        .merge(api)
        .merge(uploads)
        .layer(TimeoutLayer::new(Duration::from_secs(REQUEST_TIMEOUT_SECS)))
        .with_state(state)
}
