use axum::{extract::State, Json};
use serde_json::Value;

use super::error::ApiError;
use super::models::{
    AnalyzeRequest, HealthResponse, RegenerateRequest, RegenerateResponse, SummarizeRequest,
};
use super::AppState;
use crate::orchestrator::AnalyzeResponse;
use crate::schema::SessionSummary;

/// Always succeeds, regardless of the external capability's state.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        capability_configured: state.orchestrator.capability_configured(),
    })
}

pub async fn analyze(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let req = AnalyzeRequest::from_value(&body)?;
    let response = state
        .orchestrator
        .analyze(req.image, &req.session_id, &req.existing_entities)
        .await;
    Ok(Json(response))
}

pub async fn regenerate(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<RegenerateResponse>, ApiError> {
    let req = RegenerateRequest::from_value(&body)?;
    let summary = state
        .orchestrator
        .regenerate(
            &req.session_id,
            &req.deleted_ids,
            &req.remaining_screenshots,
            req.previous_summary.as_deref(),
        )
        .await;
    Ok(Json(RegenerateResponse { summary }))
}

pub async fn summarize(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> Result<Json<SessionSummary>, ApiError> {
    let req = SummarizeRequest::from_value(&body)?;
    let summary = state
        .orchestrator
        .summarize(&req.session_id, &req.session_name, &req.entities)
        .await;
    Ok(Json(summary))
}
