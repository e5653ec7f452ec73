use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Immutable record of one input scan verdict. Written once when a user
/// prompt passes through the scan gate; never updated afterwards.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prompt_input")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub original_prompt: String,
    pub final_prompt: String,
    pub overall_valid: bool,
    pub max_risk_score: f64,
    pub scanners_run: i32,

    /// Per-scanner verdicts, tagged by `scanner_type`.
    #[sea_orm(column_type = "JsonBinary")]
    pub scanner_results: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub all_detected_entities: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub summary: serde_json::Value,

    pub timestamp: DateTimeUtc,

    /// The user message this verdict gated, when the turn had a chat.
    pub linked_message_id: Option<i32>,
    #[sea_orm(belongs_to, from = "linked_message_id", to = "id")]
    pub linked_message: BelongsTo<Option<super::message::Entity>>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
