use std::time::Instant;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::analysis::{AnalysisRequest, AnalysisResponse, CategoryStatus};
use crate::constants::RANKER_STATUS_HEADER;
use crate::gateway::error::GatewayError;
use crate::gateway::state::AppState;
use crate::taxonomy::Category;

/// Analysis result plus per-request metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub request_id: Uuid,
    pub processing_time_ms: u64,
    #[serde(flatten)]
    pub analysis: AnalysisResponse,
}

#[derive(Debug, Default, Deserialize)]
pub struct InvalidateRequest {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvalidateResponse {
    pub invalidated: usize,
}

#[instrument(skip(state, request), fields(request_id = tracing::field::Empty))]
pub async fn analyze_handler(
    State(state): State<AppState>,
    Json(request): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let request: AnalysisRequest = serde_json::from_value(request)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;

    let request_id = Uuid::new_v4();
    tracing::Span::current().record("request_id", tracing::field::display(&request_id));

    let started = Instant::now();
    let analysis = state.analyzer.analyze(request).await?;
    let processing_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

    let degraded = analysis
        .per_category
        .values()
        .any(|outcome| outcome.status == CategoryStatus::Error);
    let ranker_status = if degraded { "partial" } else { "ok" };

    info!(
        language = %analysis.language,
        processing_time_ms,
        status = ranker_status,
        "Analysis request served"
    );

    let mut headers = HeaderMap::new();
    headers.insert(RANKER_STATUS_HEADER, HeaderValue::from_static(ranker_status));

    Ok((
        StatusCode::OK,
        headers,
        Json(AnalyzeResponse {
            request_id,
            processing_time_ms,
            analysis,
        }),
    )
        .into_response())
}

/// Marks cached taxonomies for refresh. Missing fields match everything.
#[instrument(skip(state, body))]
pub async fn invalidate_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<InvalidateResponse>, GatewayError> {
    let request: InvalidateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        InvalidateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?
    };

    let category = request
        .category
        .as_deref()
        .map(str::parse::<Category>)
        .transpose()
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
    let language = request
        .language
        .as_deref()
        .map(|l| l.trim().to_lowercase())
        .filter(|l| !l.is_empty());

    debug!(?language, ?category, "Invalidating taxonomy cache");
    let invalidated = state
        .analyzer
        .cache()
        .invalidate(language.as_deref(), category);

    Ok(Json(InvalidateResponse { invalidated }))
}
