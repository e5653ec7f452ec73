use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Immutable record of one output scan verdict, created only after a model
/// response exists for the turn.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "prompt_output")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub original_prompt: String,
    pub original_model_output: String,
    pub final_model_output: String,
    pub overall_valid: bool,
    pub max_risk_score: f64,
    pub scanners_run: i32,

    #[sea_orm(column_type = "JsonBinary")]
    pub scanner_results: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub all_detected_entities: serde_json::Value,
    #[sea_orm(column_type = "JsonBinary")]
    pub summary: serde_json::Value,

    pub timestamp: DateTimeUtc,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
