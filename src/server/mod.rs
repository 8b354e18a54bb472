//! HTTP surface: routing, request DTOs, and the 400/200 policy.
//!
//! Transport plumbing only — all decision logic lives in the orchestrator
//! and below. A malformed request is the single condition that produces an
//! error status; a well-formed request always gets a 200, fallback body
//! included.

pub mod error;
pub mod handlers;
pub mod models;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use crate::orchestrator::Orchestrator;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/api/health", get(handlers::health))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/regenerate", post(handlers::regenerate))
        .route("/api/summarize", post(handlers::summarize))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
