//! HTTP API server.
//!
//! # Routes
//!
//! ```text
//! POST /analyze-website    { websiteUrl, budget, goal }  → text/event-stream (proxied)
//! POST /generate-strategy  { websiteUrl, budget, goal }  → { strategy } | { error }
//! POST /answer-followup    { question, strategy }        → { answer }   | { error }
//! POST /render             { content }                   → { blocks }
//! ```
//!
//! CORS allows any origin. Errors are always the `{ "error": message }` envelope,
//! including request bodies that fail to deserialize. Rejected input (bad body,
//! non-positive budget, empty question) answers 400 rather than the blanket 500
//! the browser client was first written against; every other failure is 500.

use crate::domain::{DomainError, StrategyRequest};
use crate::usecases::{FollowUpService, StrategyService, render_content};
use axum::{
    Json, Router,
    body::Body,
    extract::{State, rejection::JsonRejection},
    http::{HeaderName, HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared state passed to all request handlers.
#[derive(Clone)]
pub struct ApiState {
    pub strategy: Arc<StrategyService>,
    pub followup: Arc<FollowUpService>,
}

/// `DomainError` → JSON error envelope. Bad input is 400, everything else 500.
struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        error!(status = %status, error = %self.0, "request failed");
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

/// Unwrap a JSON body, turning axum's plain-text rejection into the error envelope.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| ApiError(DomainError::Validation(rejection.body_text())))
}

#[derive(Debug, Deserialize)]
struct FollowUpBody {
    question: String,
    #[serde(default)]
    strategy: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct RenderBody {
    content: String,
}

/// Build the router with CORS applied to every route (including preflight).
pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static("api-key"),
        ]);

    Router::new()
        .route("/analyze-website", post(analyze_website))
        .route("/generate-strategy", post(generate_strategy))
        .route("/answer-followup", post(answer_followup))
        .route("/render", post(render))
        .with_state(state)
        .layer(cors)
}

/// Bind `addr` and serve until Ctrl-C.
pub async fn serve(addr: &str, state: ApiState) -> Result<(), DomainError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| DomainError::Config(format!("bind {}: {}", addr, e)))?;
    let local = listener
        .local_addr()
        .map_err(|e| DomainError::Config(e.to_string()))?;
    info!(addr = %local, "API server listening on http://{}", local);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            tokio::signal::ctrl_c().await.ok();
            info!("API server shutdown initiated");
        })
        .await
        .map_err(|e| DomainError::Http(e.to_string()))
}

/// Runs the analysis step, then proxies the strategy stream unchanged.
async fn analyze_website(
    State(state): State<ApiState>,
    body: Result<Json<StrategyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(body)?;
    let stream = state.strategy.stream(&request).await?;
    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static("text/event-stream")),
            (header::CACHE_CONTROL, HeaderValue::from_static("no-cache")),
            (header::CONNECTION, HeaderValue::from_static("keep-alive")),
        ],
        Body::from_stream(stream),
    )
        .into_response())
}

async fn generate_strategy(
    State(state): State<ApiState>,
    body: Result<Json<StrategyRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request = json_body(body)?;
    let strategy = state.strategy.generate(&request, |_| {}).await?;
    Ok(Json(serde_json::json!({ "strategy": strategy })).into_response())
}

async fn answer_followup(
    State(state): State<ApiState>,
    body: Result<Json<FollowUpBody>, JsonRejection>,
) -> Result<Response, ApiError> {
    let body = json_body(body)?;
    let answer = state.followup.answer(&body.question, &body.strategy).await?;
    Ok(Json(serde_json::json!({ "answer": answer })).into_response())
}

async fn render(body: Result<Json<RenderBody>, JsonRejection>) -> Result<Response, ApiError> {
    let body = json_body(body)?;
    Ok(Json(serde_json::json!({ "blocks": render_content(&body.content) })).into_response())
}
