use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{prompt_input, prompt_output};
use crate::error::AppError;

pub use super::shared::Pagination;

/// Identity block every scanner attaches to its verdict.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScannerInfo {
    pub name: String,
    pub description: String,
    pub available: bool,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Aggregate counters over one scan pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub total_scanners: i32,
    pub failed_scanners: i32,
    pub invalid_results: i32,
    pub total_entities_detected: i32,
}

/// PII hit found by the anonymize scanner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnonymizeEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub original_value: String,
    pub placeholder: String,
    pub start: i64,
    pub end: i64,
}

/// Credential-shaped span found by the secrets scanner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecretEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub start: i64,
    pub end: i64,
    pub original_value: String,
    pub redacted_value: String,
}

/// Zero-width/control-character span found by the invisible-text scanner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InvisibleTextEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub start: i64,
    pub end: i64,
    pub original_value: String,
    pub redacted_value: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LanguageEntity {
    pub language: String,
    pub language_name: String,
    pub confidence: f64,
    pub is_valid: bool,
}

/// Category score from the toxicity scanner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToxicityEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub score: f64,
    pub severity: String,
    pub exceeds_threshold: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GibberishEntity {
    #[serde(rename = "type")]
    pub kind: String,
    pub score: f64,
    pub severity: String,
    pub exceeds_threshold: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BanTopicEntity {
    pub topic: String,
    pub confidence: f64,
    pub is_banned: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CodeEntity {
    pub language: String,
    pub code_snippet: String,
    pub is_blocked: bool,
    pub length: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// The polymorphic part of an input scanner verdict: `scanner_type` selects
/// the variant and `detected_entities` carries that variant's element shape.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "scanner_type",
    content = "detected_entities",
    rename_all = "snake_case"
)]
pub enum ScannerDetection {
    Anonymize(Vec<AnonymizeEntity>),
    PromptInjection(Vec<serde_json::Value>),
    Regex(Vec<serde_json::Value>),
    Secrets(Vec<SecretEntity>),
    InvisibleText(Vec<InvisibleTextEntity>),
    Language(Vec<LanguageEntity>),
    Toxicity(Vec<ToxicityEntity>),
    Gibberish(Vec<GibberishEntity>),
    BanTopics(Vec<BanTopicEntity>),
    Code(Vec<CodeEntity>),
}

/// One scanner's verdict over a prompt.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScannerVerdict {
    #[serde(flatten)]
    pub detection: ScannerDetection,
    pub sanitized_prompt: String,
    pub is_valid: bool,
    /// Normalized severity estimate in [0, 1].
    pub risk_score: f64,
    pub scanner_info: ScannerInfo,
}

/// Aggregate verdict returned by the scanner service's `/scan-all` endpoint
/// and persisted as a PromptInput record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScanReport {
    pub original_prompt: String,
    pub final_prompt: String,
    pub overall_valid: bool,
    pub max_risk_score: f64,
    pub scanners_run: i32,
    pub scanner_results: Vec<ScannerVerdict>,
    #[serde(default)]
    pub all_detected_entities: Vec<serde_json::Value>,
    #[serde(default)]
    pub summary: Option<ScanSummary>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// One scanner's verdict over a model output. Output scanners report a
/// looser shape than input scanners (free-form entities, optional echo of
/// the scanned texts, an `error` field for scanners that failed to run).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputScannerResult {
    pub scanner_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitized_output: Option<String>,
    pub is_valid: bool,
    pub risk_score: f64,
    #[serde(default)]
    pub detected_entities: Vec<serde_json::Value>,
    pub scanner_info: ScannerInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Aggregate verdict returned by `/scan-all-output` and persisted as a
/// PromptOutput record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OutputScanReport {
    pub original_prompt: String,
    pub original_model_output: String,
    pub final_model_output: String,
    pub overall_valid: bool,
    pub max_risk_score: f64,
    pub scanners_run: i32,
    pub scanner_results: Vec<OutputScannerResult>,
    #[serde(default)]
    pub all_detected_entities: Vec<serde_json::Value>,
    #[serde(default)]
    pub summary: Option<ScanSummary>,
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Query parameters for the scan-record listings. Key names are part of the
/// established client contract.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScanRecordListQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

/// Projected summary row for the prompt-input listing.
#[derive(FromQueryResult)]
pub struct PromptInputRow {
    pub id: Uuid,
    pub original_prompt: String,
    pub overall_valid: bool,
    pub max_risk_score: f64,
    pub scanners_run: i32,
    pub summary: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Projected summary row for the prompt-output listing.
#[derive(FromQueryResult)]
pub struct PromptOutputRow {
    pub id: Uuid,
    pub original_prompt: String,
    pub original_model_output: String,
    pub overall_valid: bool,
    pub max_risk_score: f64,
    pub scanners_run: i32,
    pub summary: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScanRecordListItem {
    pub id: Uuid,
    pub prompt: String,
    /// Present on output records only: the scanned model response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_output: Option<String>,
    pub overall_valid: bool,
    pub max_risk_score: f64,
    pub scanners_run: i32,
    /// Defaults to 0 when the stored summary is absent.
    pub total_entities_detected: i32,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

fn entities_from_summary(summary: &serde_json::Value) -> i32 {
    summary
        .get("total_entities_detected")
        .and_then(|v| v.as_i64())
        .unwrap_or(0) as i32
}

impl From<PromptInputRow> for ScanRecordListItem {
    fn from(row: PromptInputRow) -> Self {
        Self {
            id: row.id,
            prompt: row.original_prompt,
            model_output: None,
            overall_valid: row.overall_valid,
            max_risk_score: row.max_risk_score,
            scanners_run: row.scanners_run,
            total_entities_detected: entities_from_summary(&row.summary),
            timestamp: row.timestamp,
            created_at: row.created_at,
        }
    }
}

impl From<PromptOutputRow> for ScanRecordListItem {
    fn from(row: PromptOutputRow) -> Self {
        Self {
            id: row.id,
            prompt: row.original_prompt,
            model_output: Some(row.original_model_output),
            overall_valid: row.overall_valid,
            max_risk_score: row.max_risk_score,
            scanners_run: row.scanners_run,
            total_entities_detected: entities_from_summary(&row.summary),
            timestamp: row.timestamp,
            created_at: row.created_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ScanRecordListResponse {
    pub success: bool,
    pub data: Vec<ScanRecordListItem>,
    pub pagination: Pagination,
}

/// Full stored input record, embedded verdict JSON passed through as-is.
#[derive(Serialize)]
pub struct PromptInputResponse {
    pub id: Uuid,
    pub original_prompt: String,
    pub final_prompt: String,
    pub overall_valid: bool,
    pub max_risk_score: f64,
    pub scanners_run: i32,
    pub scanner_results: serde_json::Value,
    pub all_detected_entities: serde_json::Value,
    pub summary: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub linked_message_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl From<prompt_input::Model> for PromptInputResponse {
    fn from(m: prompt_input::Model) -> Self {
        Self {
            id: m.id,
            original_prompt: m.original_prompt,
            final_prompt: m.final_prompt,
            overall_valid: m.overall_valid,
            max_risk_score: m.max_risk_score,
            scanners_run: m.scanners_run,
            scanner_results: m.scanner_results,
            all_detected_entities: m.all_detected_entities,
            summary: m.summary,
            timestamp: m.timestamp,
            linked_message_id: m.linked_message_id,
            created_at: m.created_at,
        }
    }
}

/// Full stored output record.
#[derive(Serialize)]
pub struct PromptOutputResponse {
    pub id: Uuid,
    pub original_prompt: String,
    pub original_model_output: String,
    pub final_model_output: String,
    pub overall_valid: bool,
    pub max_risk_score: f64,
    pub scanners_run: i32,
    pub scanner_results: serde_json::Value,
    pub all_detected_entities: serde_json::Value,
    pub summary: serde_json::Value,
    pub timestamp: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<prompt_output::Model> for PromptOutputResponse {
    fn from(m: prompt_output::Model) -> Self {
        Self {
            id: m.id,
            original_prompt: m.original_prompt,
            original_model_output: m.original_model_output,
            final_model_output: m.final_model_output,
            overall_valid: m.overall_valid,
            max_risk_score: m.max_risk_score,
            scanners_run: m.scanners_run,
            scanner_results: m.scanner_results,
            all_detected_entities: m.all_detected_entities,
            summary: m.summary,
            timestamp: m.timestamp,
            created_at: m.created_at,
        }
    }
}

/// Validate and resolve the list query: page, clamped limit, sort column
/// name, descending flag.
pub fn resolve_list_query(
    query: &ScanRecordListQuery,
) -> Result<(u64, u64, &'static str, bool), AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let limit = query.limit.unwrap_or(10).clamp(1, 100);

    let sort_by = match query.sort_by.as_deref().unwrap_or("createdAt") {
        "createdAt" | "created_at" => "created_at",
        "timestamp" => "timestamp",
        "max_risk_score" => "max_risk_score",
        "scanners_run" => "scanners_run",
        _ => {
            return Err(AppError::Validation(
                "sortBy must be one of: createdAt, timestamp, max_risk_score, scanners_run".into(),
            ));
        }
    };
    let descending = query.sort_order.as_deref() != Some("asc");

    Ok((page, limit, sort_by, descending))
}
