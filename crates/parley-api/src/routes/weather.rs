use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

use crate::{
    error::{ApiError, ApiResult},
    extractors::CurrentUser,
    services::WeatherReport,
    state::AppState,
};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WeatherQuery {
    pub city: Option<String>,
}

/// Current weather for a city
#[utoipa::path(
    get,
    path = "/api/get-weather/",
    params(WeatherQuery),
    responses(
        (status = 200, description = "Current conditions", body = WeatherReport),
        (status = 400, description = "City missing"),
        (status = 404, description = "City not found"),
        (status = 503, description = "Weather lookups are not configured")
    ),
    security(("bearer" = [])),
    tag = "weather"
)]
pub async fn get_weather(
    State(state): State<Arc<AppState>>,
    _user: CurrentUser,
    query: Result<Query<WeatherQuery>, QueryRejection>,
) -> ApiResult<Json<WeatherReport>> {
    let Query(query) =
        query.map_err(|_| ApiError::BadRequest("Invalid query parameters".to_string()))?;

    let city = query
        .city
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| ApiError::BadRequest("City is required".to_string()))?;

    let provider = state
        .weather
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Weather service is not configured".to_string()))?;

    Ok(Json(provider.current(city).await?))
}
