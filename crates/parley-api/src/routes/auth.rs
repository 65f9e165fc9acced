use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

use crate::extractors::CurrentUser;

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub is_authenticated: bool,
    pub username: String,
}

/// Succeeds only for a valid bearer token
#[utoipa::path(
    get,
    path = "/api/check-authentication/",
    responses(
        (status = 200, description = "Token is valid", body = AuthStatus),
        (status = 401, description = "Missing or unknown token")
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn check_authentication(user: CurrentUser) -> Json<AuthStatus> {
    Json(AuthStatus {
        is_authenticated: true,
        username: user.0,
    })
}
