use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::services::weather::WeatherError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Chat not found: {0}")]
    ChatNotFound(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Upstream(String),

    #[error("Persistence error: {0}")]
    Persist(#[from] parley_persist::PersistError),

    #[error("Model request failed: {0}")]
    Llm(#[from] anyhow::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "Rejected request body");
        ApiError::BadRequest("Invalid JSON data".to_string())
    }
}

impl From<WeatherError> for ApiError {
    fn from(e: WeatherError) -> Self {
        match e {
            WeatherError::CityNotFound(_) => ApiError::NotFound(e.to_string()),
            WeatherError::Upstream { status, ref body } => {
                tracing::error!(status, body = %body, "Weather provider error");
                ApiError::Upstream(format!("Weather provider error ({status})"))
            }
            WeatherError::Transport(ref err) => {
                tracing::error!(error = %err, "Weather provider unreachable");
                ApiError::Upstream("Weather provider unreachable".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ChatNotFound(_) | ApiError::NotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            ApiError::Upstream(ref msg) => {
                tracing::warn!("Upstream error: {}", msg);
                (StatusCode::BAD_GATEWAY, self.to_string())
            }
            ApiError::Persist(parley_persist::PersistError::ChatNotFound(ref id)) => {
                (StatusCode::NOT_FOUND, format!("Chat not found: {}", id))
            }
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Llm(ref e) => {
                tracing::error!("Model request failed: {:#}", e);
                (StatusCode::BAD_GATEWAY, format!("Model request failed: {:#}", e))
            }
            ApiError::Config(ref msg) => {
                tracing::error!("Config error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Configuration error".to_string())
            }
            ApiError::Timeout => (StatusCode::REQUEST_TIMEOUT, self.to_string()),
            ApiError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::ChatNotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::Unavailable("x".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ApiError::Llm(anyhow::anyhow!("boom")), StatusCode::BAD_GATEWAY),
            (ApiError::Timeout, StatusCode::REQUEST_TIMEOUT),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (
                ApiError::Persist(parley_persist::PersistError::Internal("x".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Persist(parley_persist::PersistError::ChatNotFound("x".into())),
                StatusCode::NOT_FOUND,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[test]
    fn test_weather_error_mapping() {
        let err: ApiError = WeatherError::CityNotFound("Atlantis".into()).into();
        assert!(matches!(err, ApiError::NotFound(ref m) if m == "City not found: Atlantis"));

        let err: ApiError = WeatherError::Upstream { status: 500, body: "down".into() }.into();
        assert!(matches!(err, ApiError::Upstream(ref m) if m == "Weather provider error (500)"));
    }
}
