use axum::{extract::State, Json};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: HashMap<String, String>,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service health", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let mut services = HashMap::new();

    let storage = match state.persist.ping().await {
        Ok(()) => "healthy".to_string(),
        Err(e) => {
            tracing::warn!("Storage health check failed: {}", e);
            "unhealthy".to_string()
        }
    };
    let degraded = storage != "healthy";
    services.insert("storage".to_string(), storage);
    services.insert(
        "weather".to_string(),
        if state.weather.is_some() { "configured" } else { "disabled" }.to_string(),
    );

    Json(HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
