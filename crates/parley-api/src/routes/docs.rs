use axum::Json;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::routes::{auth, chats, frontend, generate, health, options, weather};
use crate::services::WeatherReport;

#[derive(OpenApi)]
#[openapi(
    info(title = "Parley API", description = "Chat sessions over Azure OpenAI"),
    paths(
        health::health_check,
        frontend::redirect_to_frontend,
        auth::check_authentication,
        options::get_options,
        generate::generate_response,
        generate::regenerate,
        chats::create_chat,
        chats::list_chats,
        chats::chat_history,
        chats::delete_chat,
        weather::get_weather,
    ),
    components(schemas(
        health::HealthResponse,
        auth::AuthStatus,
        options::OptionsResponse,
        generate::GenerateRequest,
        generate::RegenerateRequest,
        generate::RegenerateResponse,
        chats::CreateChatResponse,
        chats::ChatSummary,
        chats::ListChatsResponse,
        chats::MessageView,
        chats::ChatHistoryResponse,
        WeatherReport,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "options"),
        (name = "generate"),
        (name = "chats"),
        (name = "weather")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Serve the OpenAPI document
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
