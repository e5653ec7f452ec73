use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::{chat, message};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::chat::{
    ChatCreatedResponse, ChatDetailResponse, ChatListResponse, ChatResponse, CreateChatRequest,
    DeleteChatResponse, MessageResponse, validate_create_chat,
};
use crate::state::AppState;

pub const DEFAULT_CHAT_TITLE: &str = "New Chat";

/// Find a chat by id, scoped to its owner, or return 404. A chat belonging
/// to another user is indistinguishable from a missing one.
pub async fn find_owned_chat<C: ConnectionTrait>(
    db: &C,
    chat_id: i32,
    user_id: i32,
) -> Result<chat::Model, AppError> {
    chat::Entity::find_by_id(chat_id)
        .filter(chat::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat not found".into()))
}

#[utoipa::path(
    get,
    path = "/api/v1/chats",
    tag = "Chats",
    operation_id = "listChats",
    summary = "List the caller's chats",
    description = "Returns the authenticated user's chats sorted by most recent activity.",
    responses(
        (status = 200, description = "Chats", body = ChatListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_chats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ChatListResponse>, AppError> {
    let chats = chat::Entity::find()
        .filter(chat::Column::UserId.eq(auth_user.user_id))
        .order_by_desc(chat::Column::UpdatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(ChatResponse::from)
        .collect();

    Ok(Json(ChatListResponse { chats }))
}

#[utoipa::path(
    post,
    path = "/api/v1/chats",
    tag = "Chats",
    operation_id = "createChat",
    summary = "Create a chat",
    request_body = CreateChatRequest,
    responses(
        (status = 200, description = "Chat created", body = ChatCreatedResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_chat(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateChatRequest>,
) -> Result<Json<ChatCreatedResponse>, AppError> {
    validate_create_chat(&payload)?;

    let title = payload
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_CHAT_TITLE.to_string());

    let model = insert_chat(&state.db, auth_user.user_id, title).await?;

    Ok(Json(ChatCreatedResponse {
        chat: ChatResponse::from(model),
    }))
}

pub async fn insert_chat<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    title: String,
) -> Result<chat::Model, AppError> {
    let now = chrono::Utc::now();
    let new_chat = chat::ActiveModel {
        title: Set(title),
        user_id: Set(user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(new_chat.insert(db).await?)
}

#[utoipa::path(
    get,
    path = "/api/v1/chats/{id}",
    tag = "Chats",
    operation_id = "getChat",
    summary = "Get a chat with its messages",
    description = "Returns the chat and its full message history, oldest first. Owner-only; other users' chats answer 404.",
    params(("id" = i32, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Chat with messages", body = ChatDetailResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Chat not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn get_chat(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ChatDetailResponse>, AppError> {
    let chat = find_owned_chat(&state.db, id, auth_user.user_id).await?;

    let messages = message::Entity::find()
        .filter(message::Column::ChatId.eq(id))
        .order_by_asc(message::Column::CreatedAt)
        .all(&state.db)
        .await?
        .into_iter()
        .map(MessageResponse::from)
        .collect();

    Ok(Json(ChatDetailResponse {
        chat: ChatResponse::from(chat),
        messages,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/v1/chats/{id}",
    tag = "Chats",
    operation_id = "deleteChat",
    summary = "Delete a chat and its messages",
    description = "Permanently deletes the chat and every message in it. Owner-only; no soft delete.",
    params(("id" = i32, Path, description = "Chat ID")),
    responses(
        (status = 200, description = "Chat deleted", body = DeleteChatResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Chat not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id, id))]
pub async fn delete_chat(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<DeleteChatResponse>, AppError> {
    let txn = state.db.begin().await?;

    find_owned_chat(&txn, id, auth_user.user_id).await?;

    message::Entity::delete_many()
        .filter(message::Column::ChatId.eq(id))
        .exec(&txn)
        .await?;
    chat::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;

    Ok(Json(DeleteChatResponse { success: true }))
}
