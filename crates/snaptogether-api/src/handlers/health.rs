//! Health check handler and response type.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub provider: &'static str,
    pub mode: &'static str,
    /// Every describer compiled into this build
    pub providers: Vec<String>,
    pub timestamp: String,
}

/// Liveness probe - process is running. Does not call the upstream model.
pub async fn liveness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let providers = state
        .describers
        .list()
        .await
        .into_iter()
        .map(|info| info.name)
        .collect();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "alive",
            provider: state.config.provider().name(),
            mode: state.config.generation_mode().as_str(),
            providers,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }),
    )
}
