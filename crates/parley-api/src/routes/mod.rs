pub mod auth;
pub mod chats;
pub mod docs;
pub mod frontend;
pub mod generate;
pub mod health;
pub mod options;
pub mod weather;

use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

/// Chat id from a URL path; anything that is not a UUID names no chat
pub(crate) fn parse_chat_id(raw: &str) -> ApiResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| ApiError::ChatNotFound(raw.to_string()))
}
