use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{chat, message};
use crate::error::AppError;
use crate::models::shared::validate_title;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateChatRequest {
    /// Optional title; defaults to "New Chat".
    pub title: Option<String>,
}

pub fn validate_create_chat(payload: &CreateChatRequest) -> Result<(), AppError> {
    if let Some(ref title) = payload.title {
        validate_title(title)?;
    }
    Ok(())
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChatResponse {
    pub id: i32,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<chat::Model> for ChatResponse {
    fn from(model: chat::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Sidebar listing: chats sorted by most recent activity.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ChatListResponse {
    pub chats: Vec<ChatResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub id: i32,
    pub chat_id: i32,
    pub role: String,
    pub content: String,
    /// Attachments as stored: [{name, type, data}] with base64 data-URIs.
    #[schema(value_type = Object)]
    pub attachments: serde_json::Value,
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl From<message::Model> for MessageResponse {
    fn from(model: message::Model) -> Self {
        Self {
            id: model.id,
            chat_id: model.chat_id,
            role: model.role,
            content: model.content,
            attachments: model.attachments,
            metadata: model.metadata,
            created_at: model.created_at,
        }
    }
}

/// One chat with its full message history, oldest first.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ChatDetailResponse {
    pub chat: ChatResponse,
    pub messages: Vec<MessageResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ChatCreatedResponse {
    pub chat: ChatResponse,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteChatResponse {
    pub success: bool,
}
