use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use formatshift_core::{Config, ToolStatus};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::metrics::encode_metrics;
use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Config> {
    Json(state.config().clone())
}

/// Supported extensions per category.
pub async fn list_formats(
    State(state): State<Arc<AppState>>,
) -> Json<BTreeMap<&'static str, Vec<&'static str>>> {
    Json(state.formats().by_category())
}

#[derive(Serialize)]
pub struct ToolsResponse {
    pub tools: Vec<ToolStatus>,
    pub all_available: bool,
}

/// Probes the external tools.
pub async fn list_tools(State(state): State<Arc<AppState>>) -> Json<ToolsResponse> {
    let tools = state.invoker().check_availability().await;
    let all_available = tools.iter().all(|t| t.available);
    Json(ToolsResponse {
        tools,
        all_available,
    })
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        encode_metrics(),
    )
}
