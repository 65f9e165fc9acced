use axum::{extract::State, response::Redirect};
use std::sync::Arc;

use crate::state::AppState;

/// `/` and `/app/` hand the browser over to the single-page frontend
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 307, description = "Redirect to the frontend")
    ),
    tag = "frontend"
)]
pub async fn redirect_to_frontend(State(state): State<Arc<AppState>>) -> Redirect {
    Redirect::temporary(&state.config.server.frontend_url)
}
