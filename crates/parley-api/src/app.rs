use axum::{
    error_handling::HandleErrorLayer,
    middleware,
    routing::{delete, get, post},
    BoxError, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::Config,
    error::ApiError,
    middleware::logging,
    routes::{auth, chats, docs, frontend, generate, health, options, weather},
    state::AppState,
};

pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Auth & options
        .route("/api/check-authentication/", get(auth::check_authentication))
        .route("/api/get-options/", get(options::get_options))
        // Generation
        .route("/api/generate-response/", post(generate::generate_response))
        .route("/api/regenerate/:chat_id/", post(generate::regenerate))
        // Chats
        .route("/api/create-chat/", post(chats::create_chat))
        .route("/api/chats/", get(chats::list_chats))
        .route("/api/chat-history/:chat_id/", get(chats::chat_history))
        .route("/api/delete-chat/:chat_id/", delete(chats::delete_chat))
        // Weather
        .route("/api/get-weather/", get(weather::get_weather))
        // Docs
        .route("/api/openapi.json", get(docs::openapi_json));

    Router::new()
        .route("/", get(frontend::redirect_to_frontend))
        .route("/app/", get(frontend::redirect_to_frontend))
        .route("/health", get(health::health_check))
        .merge(api_routes)
        .layer(middleware::from_fn(logging::log_request))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_layer_error))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    state.config.server.request_timeout_secs,
                ))),
        )
        .layer(CompressionLayer::new())
        .layer(build_cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Turn middleware failures into the usual JSON error body
async fn handle_layer_error(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        tracing::warn!("Request exceeded the configured timeout");
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

pub fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors.enabled {
        let mut cors = CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::DELETE,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers(Any);

        if config.cors.origins.iter().any(|o| o == "*") {
            cors = cors.allow_origin(Any);
        } else {
            let origins: Vec<axum::http::HeaderValue> = config
                .cors
                .origins
                .iter()
                .filter_map(|origin| match origin.parse() {
                    Ok(parsed) => Some(parsed),
                    Err(_) => {
                        tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect();
            cors = cors.allow_origin(origins);
        }

        cors
    } else {
        CorsLayer::permissive()
    }
}
