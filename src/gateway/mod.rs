//! HTTP gateway (Axum) for analysis requests and cache maintenance.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::{analyze_handler, invalidate_handler};
pub use state::AppState;

use crate::constants::{
    RANKER_STATUS_HEADER, RANKER_STATUS_HEALTHY, RANKER_STATUS_NOT_READY, RANKER_STATUS_READY,
};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler))
        .route("/v1/analyze", post(analyze_handler))
        .route("/v1/taxonomy/invalidate", post(invalidate_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(serde::Serialize)]
pub struct ReadyResponse {
    pub status: &'static str,
    pub components: ComponentStatus,
    pub cached_keys: usize,
}

#[derive(serde::Serialize)]
pub struct ComponentStatus {
    pub http: &'static str,
    pub taxonomy: &'static str,
    pub scorer: &'static str,
    pub scorer_mode: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        RANKER_STATUS_HEADER,
        HeaderValue::from_static(RANKER_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler(State(state): State<AppState>) -> Response {
    let taxonomy_status = if state.is_ready() {
        RANKER_STATUS_READY
    } else {
        "pending"
    };

    let components = ComponentStatus {
        http: RANKER_STATUS_READY,
        taxonomy: taxonomy_status,
        scorer: RANKER_STATUS_READY,
        scorer_mode: state.analyzer.orchestrator().scorer().mode().as_str(),
    };

    let is_ready = components.taxonomy == RANKER_STATUS_READY;
    let (status_code, status_msg) = if is_ready {
        (StatusCode::OK, RANKER_STATUS_READY)
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, RANKER_STATUS_NOT_READY)
    };

    let mut headers = HeaderMap::new();
    headers.insert(RANKER_STATUS_HEADER, HeaderValue::from_static(status_msg));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg,
            components,
            cached_keys: state.analyzer.cache().cached_keys(),
        }),
    )
        .into_response()
}
