use axum::{extract::State, Json};
use parley_llm::Temperature;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{error::ApiResult, extractors::CurrentUser, state::AppState};

#[derive(Serialize, ToSchema)]
pub struct OptionsResponse {
    /// Names of the active models
    pub models: Vec<String>,
    pub temperatures: Vec<f64>,
}

/// Models and temperature presets the frontend offers
#[utoipa::path(
    get,
    path = "/api/get-options/",
    responses(
        (status = 200, description = "Available options", body = OptionsResponse),
        (status = 401, description = "Missing or unknown token")
    ),
    security(("bearer" = [])),
    tag = "options"
)]
pub async fn get_options(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
) -> ApiResult<Json<OptionsResponse>> {
    let models = state
        .persist
        .list_active_models()
        .await?
        .into_iter()
        .map(|m| m.name)
        .collect();

    Ok(Json(OptionsResponse {
        models,
        temperatures: Temperature::values(),
    }))
}
