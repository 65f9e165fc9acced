use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use parley_llm::Temperature;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    extractors::CurrentUser,
    routes::{chats::MessageView, parse_chat_id},
    services::{GenerateInput, InFlightGuard},
    state::AppState,
};

pub const MIN_TEMPERATURE: f64 = 0.0;
pub const MAX_TEMPERATURE: f64 = 2.0;

#[derive(Debug, Deserialize, ToSchema)]
pub struct GenerateRequest {
    pub message: Option<String>,
    pub model: Option<String>,
    /// Number or numeric string
    #[schema(value_type = Option<f64>)]
    pub temperature: Option<Value>,
    /// Continue and store into this chat
    pub chat_id: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegenerateRequest {
    pub model: Option<String>,
    #[schema(value_type = Option<f64>)]
    pub temperature: Option<Value>,
}

#[derive(Serialize, ToSchema)]
pub struct RegenerateResponse {
    pub message: MessageView,
}

/// Accepts a JSON number or a numeric string within the model's range
pub fn parse_temperature(value: Option<&Value>) -> ApiResult<f64> {
    let invalid = || ApiError::BadRequest("Invalid temperature value provided".to_string());

    let temperature = match value {
        None | Some(Value::Null) => return Ok(Temperature::default().value()),
        Some(Value::Number(n)) => n.as_f64().ok_or_else(invalid)?,
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid())?,
        Some(_) => return Err(invalid()),
    };

    if !temperature.is_finite() || !(MIN_TEMPERATURE..=MAX_TEMPERATURE).contains(&temperature) {
        return Err(invalid());
    }
    Ok(temperature)
}

fn claim_slot(state: &AppState, user: &CurrentUser) -> ApiResult<InFlightGuard> {
    state.in_flight.try_acquire(user.name()).ok_or_else(|| {
        tracing::warn!(user = %user.name(), "Rejected concurrent generation");
        ApiError::BadRequest("Another request is already in progress".to_string())
    })
}

/// Send a message to the model
///
/// Returns the provider's response body. When `chat_id` is given the
/// exchange is stored and `chat_id` and `message_id` are added to it.
#[utoipa::path(
    post,
    path = "/api/generate-response/",
    request_body = GenerateRequest,
    responses(
        (status = 200, description = "Provider response", content_type = "application/json"),
        (status = 400, description = "Invalid input, unknown model or request already running"),
        (status = 404, description = "Chat not found"),
        (status = 502, description = "Model request failed"),
        (status = 503, description = "No active models")
    ),
    security(("bearer" = [])),
    tag = "generate"
)]
pub async fn generate_response(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let _slot = claim_slot(&state, &user)?;

    let Json(req) = payload?;
    let temperature = parse_temperature(req.temperature.as_ref())?;
    let chat_id = req
        .chat_id
        .as_deref()
        .map(|raw| {
            uuid::Uuid::parse_str(raw)
                .map_err(|_| ApiError::BadRequest("Invalid chat ID format".to_string()))
        })
        .transpose()?;

    let output = state
        .orchestrator
        .generate(
            user.name(),
            GenerateInput {
                message: req.message.unwrap_or_default(),
                model: req.model,
                temperature,
                chat_id,
            },
        )
        .await?;

    let mut body = output.raw;
    if let Value::Object(ref mut map) = body {
        if let Some(chat_id) = output.chat_id {
            map.insert("chat_id".to_string(), json!(chat_id));
        }
        if let Some(message_id) = output.message_id {
            map.insert("message_id".to_string(), json!(message_id));
        }
    }

    Ok(Json(body))
}

/// Replace the last assistant reply of a chat
#[utoipa::path(
    post,
    path = "/api/regenerate/{chat_id}/",
    params(("chat_id" = String, Path, description = "Chat ID")),
    request_body(content = RegenerateRequest, description = "Optional; an empty body uses the defaults"),
    responses(
        (status = 200, description = "New reply", body = RegenerateResponse),
        (status = 400, description = "Nothing to regenerate or invalid input"),
        (status = 404, description = "Chat not found"),
        (status = 502, description = "Model request failed")
    ),
    security(("bearer" = [])),
    tag = "generate"
)]
pub async fn regenerate(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(chat_id): Path<String>,
    body: Bytes,
) -> ApiResult<Json<RegenerateResponse>> {
    let _slot = claim_slot(&state, &user)?;

    let chat_id = parse_chat_id(&chat_id)?;
    let req: RegenerateRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RegenerateRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| ApiError::BadRequest("Invalid JSON data".to_string()))?
    };
    let temperature = parse_temperature(req.temperature.as_ref())?;

    let message = state
        .orchestrator
        .regenerate(user.name(), chat_id, req.model.as_deref(), temperature)
        .await?;

    Ok(Json(RegenerateResponse {
        message: message.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_temperature() {
        assert_eq!(parse_temperature(None).unwrap(), 0.7);
        assert_eq!(parse_temperature(Some(&Value::Null)).unwrap(), 0.7);
        assert_eq!(parse_temperature(Some(&json!(0.2))).unwrap(), 0.2);
        assert_eq!(parse_temperature(Some(&json!(1))).unwrap(), 1.0);
        assert_eq!(parse_temperature(Some(&json!(" 1.5 "))).unwrap(), 1.5);

        for bad in [json!("warm"), json!(true), json!([0.5]), json!(-0.1), json!(2.5)] {
            let err = parse_temperature(Some(&bad)).unwrap_err();
            assert!(
                matches!(err, ApiError::BadRequest(ref m) if m == "Invalid temperature value provided"),
                "accepted {bad}"
            );
        }
    }
}
