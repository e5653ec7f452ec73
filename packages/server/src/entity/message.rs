use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A single attachment on a user message.
/// Stored as JSON array of {name, type, data} objects; `data` keeps the full
/// base64 data-URI the client uploaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: String,
    pub data: String,
}

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "message")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub chat_id: i32,
    #[sea_orm(belongs_to, from = "chat_id", to = "id")]
    pub chat: HasOne<super::chat::Entity>,

    /// One of: user, assistant, system
    pub role: String,
    pub content: String,

    /// Attachments stored as JSON array of {name, type, data} objects.
    #[sea_orm(column_type = "JsonBinary")]
    pub attachments: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub metadata: serde_json::Value,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
