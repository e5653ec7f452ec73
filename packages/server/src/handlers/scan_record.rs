use axum::Json;
use axum::extract::{Path, Query, State};
use sea_orm::*;
use serde_json::json;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::{prompt_input, prompt_output};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::scan::{
    Pagination, PromptInputResponse, PromptInputRow, PromptOutputResponse, PromptOutputRow,
    ScanRecordListItem, ScanRecordListQuery, ScanRecordListResponse, resolve_list_query,
};
use crate::state::AppState;

fn parse_record_id(raw: &str, kind: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::InvalidId(format!("Invalid {kind} ID format")))
}

#[utoipa::path(
    get,
    path = "/api/v1/prompt-inputs",
    tag = "Scan Records",
    operation_id = "listPromptInputs",
    summary = "List input scan records",
    description = "Paginated summaries of stored input scan verdicts, newest first by default.",
    params(ScanRecordListQuery),
    responses(
        (status = 200, description = "Page of input scan summaries", body = ScanRecordListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_prompt_inputs(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ScanRecordListQuery>,
) -> Result<Json<ScanRecordListResponse>, AppError> {
    let (page, limit, sort_by, descending) = resolve_list_query(&query)?;

    let sort_column = match sort_by {
        "timestamp" => prompt_input::Column::Timestamp,
        "max_risk_score" => prompt_input::Column::MaxRiskScore,
        "scanners_run" => prompt_input::Column::ScannersRun,
        _ => prompt_input::Column::CreatedAt,
    };
    let sort_order = if descending { Order::Desc } else { Order::Asc };

    let total_count = prompt_input::Entity::find().count(&state.db).await?;

    let data: Vec<ScanRecordListItem> = prompt_input::Entity::find()
        .select_only()
        .column(prompt_input::Column::Id)
        .column(prompt_input::Column::OriginalPrompt)
        .column(prompt_input::Column::OverallValid)
        .column(prompt_input::Column::MaxRiskScore)
        .column(prompt_input::Column::ScannersRun)
        .column(prompt_input::Column::Summary)
        .column(prompt_input::Column::Timestamp)
        .column(prompt_input::Column::CreatedAt)
        .order_by(sort_column, sort_order)
        .offset(Some((page - 1) * limit))
        .limit(Some(limit))
        .into_model::<PromptInputRow>()
        .all(&state.db)
        .await?
        .into_iter()
        .map(ScanRecordListItem::from)
        .collect();

    Ok(Json(ScanRecordListResponse {
        success: true,
        data,
        pagination: Pagination::new(page, limit, total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/prompt-inputs/{id}",
    tag = "Scan Records",
    operation_id = "getPromptInput",
    summary = "Get one input scan record",
    description = "Returns the full stored record, including every embedded per-scanner verdict.",
    params(("id" = String, Path, description = "Record UUID")),
    responses(
        (status = 200, description = "Full input scan record"),
        (status = 400, description = "Malformed ID (INVALID_ID)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Record not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id = %id))]
pub async fn get_prompt_input(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_record_id(&id, "prompt input")?;

    let record = prompt_input::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Prompt input not found".into()))?;

    Ok(Json(json!({
        "success": true,
        "data": PromptInputResponse::from(record),
    })))
}

#[utoipa::path(
    get,
    path = "/api/v1/prompt-outputs",
    tag = "Scan Records",
    operation_id = "listPromptOutputs",
    summary = "List output scan records",
    description = "Paginated summaries of stored output scan verdicts, newest first by default.",
    params(ScanRecordListQuery),
    responses(
        (status = 200, description = "Page of output scan summaries", body = ScanRecordListResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user, query))]
pub async fn list_prompt_outputs(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ScanRecordListQuery>,
) -> Result<Json<ScanRecordListResponse>, AppError> {
    let (page, limit, sort_by, descending) = resolve_list_query(&query)?;

    let sort_column = match sort_by {
        "timestamp" => prompt_output::Column::Timestamp,
        "max_risk_score" => prompt_output::Column::MaxRiskScore,
        "scanners_run" => prompt_output::Column::ScannersRun,
        _ => prompt_output::Column::CreatedAt,
    };
    let sort_order = if descending { Order::Desc } else { Order::Asc };

    let total_count = prompt_output::Entity::find().count(&state.db).await?;

    let data: Vec<ScanRecordListItem> = prompt_output::Entity::find()
        .select_only()
        .column(prompt_output::Column::Id)
        .column(prompt_output::Column::OriginalPrompt)
        .column(prompt_output::Column::OriginalModelOutput)
        .column(prompt_output::Column::OverallValid)
        .column(prompt_output::Column::MaxRiskScore)
        .column(prompt_output::Column::ScannersRun)
        .column(prompt_output::Column::Summary)
        .column(prompt_output::Column::Timestamp)
        .column(prompt_output::Column::CreatedAt)
        .order_by(sort_column, sort_order)
        .offset(Some((page - 1) * limit))
        .limit(Some(limit))
        .into_model::<PromptOutputRow>()
        .all(&state.db)
        .await?
        .into_iter()
        .map(ScanRecordListItem::from)
        .collect();

    Ok(Json(ScanRecordListResponse {
        success: true,
        data,
        pagination: Pagination::new(page, limit, total_count),
    }))
}

#[utoipa::path(
    get,
    path = "/api/v1/prompt-outputs/{id}",
    tag = "Scan Records",
    operation_id = "getPromptOutput",
    summary = "Get one output scan record",
    description = "Returns the full stored record, including every embedded per-scanner verdict.",
    params(("id" = String, Path, description = "Record UUID")),
    responses(
        (status = 200, description = "Full output scan record"),
        (status = 400, description = "Malformed ID (INVALID_ID)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Record not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, _auth_user), fields(id = %id))]
pub async fn get_prompt_output(
    _auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_record_id(&id, "prompt output")?;

    let record = prompt_output::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Prompt output not found".into()))?;

    Ok(Json(json!({
        "success": true,
        "data": PromptOutputResponse::from(record),
    })))
}
