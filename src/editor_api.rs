// SYNOID Editor API: session transcripts and highlight endpoints
// Copyright (c) 2026 Xing_The_Creator | SYNOID

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::agent::highlights::{update_with_range, Highlight, SelectionOptions};
use crate::agent::transcription::TranscriptBundle;
use crate::error::HighlightError;
use crate::server::AppState;

// ─── Request types ────────────────────────────────────────────────────────────
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeRequest {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
}

// ─── Errors ───────────────────────────────────────────────────────────────────
#[derive(Debug)]
pub enum ApiError {
    SessionNotFound(String),
    Highlight(HighlightError),
}

impl From<HighlightError> for ApiError {
    fn from(err: HighlightError) -> Self {
        ApiError::Highlight(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Highlight(HighlightError::MissingCredential(_)) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Highlight(HighlightError::Transport { .. })
            | ApiError::Highlight(HighlightError::Request(_)) => StatusCode::BAD_GATEWAY,
            ApiError::Highlight(HighlightError::NoHighlights) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            ApiError::SessionNotFound(id) => format!("Session {} has no transcript", id),
            ApiError::Highlight(err) => err.to_string(),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

// ─── Router Factory ──────────────────────────────────────────────────────────
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/sessions/:id/transcript",
            put(put_transcript).get(get_transcript),
        )
        .route("/sessions/:id/highlights", post(select_highlights))
        .route("/sessions/:id/highlights/range", post(update_range))
        .with_state(state)
}

// ─── Transcript Handlers ──────────────────────────────────────────────────────
async fn put_transcript(
    Path(id): Path<String>,
    State(s): State<AppState>,
    Json(bundle): Json<TranscriptBundle>,
) -> impl IntoResponse {
    let segments = bundle.segments.len();
    s.sessions.write().await.insert(id.clone(), bundle);
    info!("[EDITOR-API] Stored transcript for session {} ({} segments)", id, segments);
    Json(json!({ "id": id, "segments": segments }))
}

async fn get_transcript(
    Path(id): Path<String>,
    State(s): State<AppState>,
) -> Result<Json<TranscriptBundle>, ApiError> {
    s.transcript(&id)
        .await
        .map(Json)
        .ok_or(ApiError::SessionNotFound(id))
}

// ─── Highlight Handlers ───────────────────────────────────────────────────────
async fn select_highlights(
    Path(id): Path<String>,
    State(s): State<AppState>,
    Json(options): Json<SelectionOptions>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let bundle = s
        .transcript(&id)
        .await
        .ok_or_else(|| ApiError::SessionNotFound(id.clone()))?;

    let selector = s.selector().map_err(|e| {
        warn!("[EDITOR-API] Highlight request for {} rejected: {}", id, e);
        e
    })?;

    match selector.select(&bundle, &options).await {
        Ok(highlights) => {
            info!("[EDITOR-API] Session {}: {} highlight(s)", id, highlights.len());
            Ok(Json(json!({ "highlights": highlights })))
        }
        Err(e) => {
            error!("[EDITOR-API] Highlight selection failed for {}: {}", id, e);
            Err(e.into())
        }
    }
}

async fn update_range(
    Path(id): Path<String>,
    State(s): State<AppState>,
    Json(req): Json<RangeRequest>,
) -> Result<Json<Highlight>, ApiError> {
    let bundle = s
        .transcript(&id)
        .await
        .ok_or(ApiError::SessionNotFound(id))?;

    Ok(Json(update_with_range(
        &bundle.segments,
        req.start,
        req.end,
        req.title.as_deref(),
        req.duration_seconds,
        &s.strategy,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        let status = |e: HighlightError| ApiError::from(e).status();
        assert_eq!(status(HighlightError::MissingCredential("KEY")), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(status(HighlightError::from_status(500, "boom")), StatusCode::BAD_GATEWAY);
        assert_eq!(status(HighlightError::NoHighlights), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            ApiError::SessionNotFound("x".to_string()).status(),
            StatusCode::NOT_FOUND
        );
    }
}
