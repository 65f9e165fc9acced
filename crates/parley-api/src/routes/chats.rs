use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use parley_persist::{ChatMessage, ChatSession, MessageRole};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extractors::CurrentUser,
    routes::parse_chat_id,
    state::AppState,
};

pub const DEFAULT_PAGE_SIZE: i64 = 20;
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Serialize, ToSchema)]
pub struct CreateChatResponse {
    pub chat_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListChatsQuery {
    /// Page size, 1 to 100
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct ChatSummary {
    pub chat_id: Uuid,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ChatSession> for ChatSummary {
    fn from(chat: ChatSession) -> Self {
        Self {
            chat_id: chat.id,
            title: chat.title,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ListChatsResponse {
    pub chats: Vec<ChatSummary>,
    pub has_more: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageView {
    pub id: Uuid,
    /// `user` or `assistant`
    #[schema(value_type = String)]
    pub role: MessageRole,
    pub content: String,
    pub regenerated: bool,
    pub created_at: DateTime<Utc>,
}

impl From<ChatMessage> for MessageView {
    fn from(msg: ChatMessage) -> Self {
        Self {
            id: msg.id,
            role: msg.role,
            content: msg.content,
            regenerated: msg.regenerated,
            created_at: msg.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct ChatHistoryResponse {
    pub chat_id: Uuid,
    pub title: Option<String>,
    pub messages: Vec<MessageView>,
}

/// Start a new, empty chat
#[utoipa::path(
    post,
    path = "/api/create-chat/",
    responses(
        (status = 201, description = "Chat created", body = CreateChatResponse),
        (status = 401, description = "Missing or unknown token")
    ),
    security(("bearer" = [])),
    tag = "chats"
)]
pub async fn create_chat(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<(StatusCode, Json<CreateChatResponse>)> {
    let chat = state.persist.create_chat(user.name()).await?;
    tracing::info!(chat_id = %chat.id, owner = %chat.owner, "Created chat");

    Ok((
        StatusCode::CREATED,
        Json(CreateChatResponse {
            chat_id: chat.id,
            created_at: chat.created_at,
        }),
    ))
}

/// The caller's chats, most recently active first
#[utoipa::path(
    get,
    path = "/api/chats/",
    params(ListChatsQuery),
    responses(
        (status = 200, description = "Page of chats", body = ListChatsResponse),
        (status = 400, description = "Invalid paging parameters")
    ),
    security(("bearer" = [])),
    tag = "chats"
)]
pub async fn list_chats(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    query: Result<Query<ListChatsQuery>, QueryRejection>,
) -> ApiResult<Json<ListChatsResponse>> {
    let Query(query) =
        query.map_err(|_| ApiError::BadRequest("Invalid query parameters".to_string()))?;

    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);
    let skip = query.skip.unwrap_or(0);
    if !(1..=MAX_PAGE_SIZE).contains(&limit) || skip < 0 {
        return Err(ApiError::BadRequest(format!(
            "limit must be between 1 and {MAX_PAGE_SIZE} and skip must not be negative"
        )));
    }

    // One extra row tells whether another page exists
    let mut chats = state
        .persist
        .list_chats(user.name(), Some(limit + 1), Some(skip))
        .await?;
    let has_more = chats.len() as i64 > limit;
    chats.truncate(limit as usize);

    Ok(Json(ListChatsResponse {
        chats: chats.into_iter().map(ChatSummary::from).collect(),
        has_more,
    }))
}

/// Messages of one chat in the order they were written
#[utoipa::path(
    get,
    path = "/api/chat-history/{chat_id}/",
    params(("chat_id" = String, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Chat history", body = ChatHistoryResponse),
        (status = 404, description = "Chat not found")
    ),
    security(("bearer" = [])),
    tag = "chats"
)]
pub async fn chat_history(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(chat_id): Path<String>,
) -> ApiResult<Json<ChatHistoryResponse>> {
    let id = parse_chat_id(&chat_id)?;

    let chat = state
        .persist
        .get_chat(id, user.name())
        .await?
        .ok_or_else(|| ApiError::ChatNotFound(chat_id.clone()))?;
    let messages = state.persist.get_messages(id).await?;

    Ok(Json(ChatHistoryResponse {
        chat_id: chat.id,
        title: chat.title,
        messages: messages.into_iter().map(MessageView::from).collect(),
    }))
}

/// Delete a chat together with its messages
#[utoipa::path(
    delete,
    path = "/api/delete-chat/{chat_id}/",
    params(("chat_id" = String, Path, description = "Chat ID")),
    responses(
        (status = 204, description = "Chat deleted"),
        (status = 404, description = "Chat not found")
    ),
    security(("bearer" = [])),
    tag = "chats"
)]
pub async fn delete_chat(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    Path(chat_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = parse_chat_id(&chat_id)?;

    if !state.persist.delete_chat(id, user.name()).await? {
        return Err(ApiError::ChatNotFound(chat_id));
    }
    tracing::info!(chat_id = %id, "Deleted chat");

    Ok(StatusCode::NO_CONTENT)
}
