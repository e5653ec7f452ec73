use axum::Json;
use axum::extract::State;
use sea_orm::*;
use tracing::{instrument, warn};
use uuid::Uuid;

use crate::entity::message::Attachment;
use crate::entity::{chat, message, prompt_input, prompt_output};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::handlers::chat::{DEFAULT_CHAT_TITLE, find_owned_chat, insert_chat};
use crate::models::scan::{OutputScanReport, ScanReport};
use crate::models::turn::{TurnRequest, TurnResponse, validate_turn_request};
use crate::state::AppState;
use crate::upstream::{ModelPart, ModelTurn};
use crate::utils::data_uri;

/// Execute one chat turn end-to-end: resolve the chat, persist the user
/// message, gate the prompt through the input scan, call the model, log the
/// output scan, persist the assistant message.
///
/// Scan-record and message writes are non-fatal: a turn that already cost a
/// model call is never thrown away over a bookkeeping insert.
#[utoipa::path(
    post,
    path = "/api/v1/gemini",
    tag = "Turns",
    operation_id = "submitTurn",
    summary = "Submit a chat turn through the scan gate",
    request_body = TurnRequest,
    responses(
        (status = 200, description = "Assistant reply with output scan verdict", body = TurnResponse),
        (status = 400, description = "Validation error, or prompt blocked by the input scan ({error, scanResult, blocked: true})"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Chat not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Scanner or model unavailable (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn submit_turn(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<TurnRequest>,
) -> Result<Json<TurnResponse>, AppError> {
    validate_turn_request(&payload)?;

    let (history, last) = payload.messages.split_at(payload.messages.len() - 1);
    let user_text = last[0].content.clone();

    let chat = match payload.chat_id {
        Some(id) => find_owned_chat(&state.db, id, auth_user.user_id).await?,
        None => {
            insert_chat(&state.db, auth_user.user_id, derive_title(&user_text)).await?
        }
    };

    // Decode attachments up front so the user message is written once,
    // complete. Malformed data-URIs are passed over, not rejected.
    let uploads = payload.data.unwrap_or_default();
    let mut inline_parts = Vec::with_capacity(uploads.len());
    let mut stored_attachments = Vec::with_capacity(uploads.len());
    for upload in &uploads {
        match data_uri::parse(&upload.data) {
            Some(uri) => {
                inline_parts.push(ModelPart::InlineData {
                    mime_type: uri.mime_type.to_owned(),
                    data: uri.base64_payload.to_owned(),
                });
                stored_attachments.push(Attachment {
                    name: upload.name.clone(),
                    mime_type: upload.mime_type.clone(),
                    data: upload.data.clone(),
                });
            }
            None => {
                warn!(name = ?upload.name, "Skipping attachment without a well-formed data-URI");
            }
        }
    }

    let user_message_id = persist_message(
        &state.db,
        chat.id,
        "user",
        &user_text,
        serde_json::to_value(&stored_attachments).unwrap_or_default(),
    )
    .await;

    // Input gate. Verdicts are recorded even when the prompt passes;
    // availability failures follow the configured fail-open policy.
    match state.scanner.scan_prompt(&user_text).await {
        Ok(report) => {
            persist_input_record(&state.db, &report, user_message_id).await;
            if !report.overall_valid {
                warn!(
                    max_risk_score = report.max_risk_score,
                    "Input scan blocked the prompt"
                );
                return Err(AppError::Blocked(Box::new(report)));
            }
        }
        Err(e) if state.config.scanner.fail_open => {
            warn!(error = %e, "Input scan unavailable; proceeding ungated (fail-open)");
        }
        Err(e) => {
            return Err(AppError::Upstream(format!("Input scan failed: {e}")));
        }
    }

    let mut turns: Vec<ModelTurn> = history
        .iter()
        .map(|m| ModelTurn::text(map_role(&m.role), &m.content))
        .collect();
    let mut parts = vec![ModelPart::Text(user_text.clone())];
    parts.extend(inline_parts);
    turns.push(ModelTurn {
        role: "user".into(),
        parts,
    });

    // Model failure is fatal to the turn; no retry.
    let reply = state
        .model
        .generate(&turns)
        .await
        .map_err(|e| AppError::Upstream(format!("Model call failed: {e}")))?;

    // Output scan never withholds the reply: an invalid verdict is logged
    // and recorded, an unavailable scanner is logged and skipped.
    let output_report = match state.scanner.scan_output(&user_text, &reply).await {
        Ok(report) => {
            persist_output_record(&state.db, &report).await;
            if !report.overall_valid {
                warn!(
                    max_risk_score = report.max_risk_score,
                    "Output scan flagged the model response"
                );
            }
            Some(report)
        }
        Err(e) => {
            warn!(error = %e, "Output scan unavailable; returning unscanned model output");
            None
        }
    };

    persist_message(
        &state.db,
        chat.id,
        "assistant",
        &reply,
        serde_json::Value::Array(vec![]),
    )
    .await;

    Ok(Json(TurnResponse {
        role: "assistant",
        content: reply,
        output_scan_result: output_report,
        chat_id: chat.id,
    }))
}

/// Chat title for a first message: leading 30 characters, or the default
/// for an empty prompt.
fn derive_title(text: &str) -> String {
    let title: String = text.chars().take(30).collect();
    if title.trim().is_empty() {
        DEFAULT_CHAT_TITLE.to_string()
    } else {
        title
    }
}

/// History role in the model collaborator's vocabulary.
fn map_role(role: &str) -> &'static str {
    if role == "user" { "user" } else { "model" }
}

/// Insert a message and bump the chat's `updated_at`. Failures are logged,
/// never propagated.
async fn persist_message(
    db: &DatabaseConnection,
    chat_id: i32,
    role: &str,
    content: &str,
    attachments: serde_json::Value,
) -> Option<i32> {
    let now = chrono::Utc::now();
    let new_message = message::ActiveModel {
        chat_id: Set(chat_id),
        role: Set(role.to_string()),
        content: Set(content.to_string()),
        attachments: Set(attachments),
        metadata: Set(serde_json::Value::Object(Default::default())),
        created_at: Set(now),
        ..Default::default()
    };

    let message_id = match new_message.insert(db).await {
        Ok(model) => Some(model.id),
        Err(e) => {
            warn!(chat_id, role, error = %e, "Failed to persist message");
            None
        }
    };

    let touch = chat::ActiveModel {
        id: Set(chat_id),
        updated_at: Set(now),
        ..Default::default()
    };
    if let Err(e) = chat::Entity::update(touch).exec(db).await {
        warn!(chat_id, error = %e, "Failed to bump chat updated_at");
    }

    message_id
}

/// Record an input scan verdict, linked to the message it gated. Failures
/// are logged, never propagated.
async fn persist_input_record(
    db: &DatabaseConnection,
    report: &ScanReport,
    linked_message_id: Option<i32>,
) {
    let now = chrono::Utc::now();
    let record = prompt_input::ActiveModel {
        id: Set(Uuid::new_v4()),
        original_prompt: Set(report.original_prompt.clone()),
        final_prompt: Set(report.final_prompt.clone()),
        overall_valid: Set(report.overall_valid),
        max_risk_score: Set(report.max_risk_score),
        scanners_run: Set(report.scanners_run),
        scanner_results: Set(serde_json::to_value(&report.scanner_results).unwrap_or_default()),
        all_detected_entities: Set(
            serde_json::to_value(&report.all_detected_entities).unwrap_or_default()
        ),
        summary: Set(serde_json::to_value(&report.summary).unwrap_or_default()),
        timestamp: Set(report.timestamp.unwrap_or(now)),
        linked_message_id: Set(linked_message_id),
        created_at: Set(now),
        ..Default::default()
    };

    if let Err(e) = record.insert(db).await {
        warn!(error = %e, "Failed to persist input scan record");
    }
}

/// Record an output scan verdict. Failures are logged, never propagated.
async fn persist_output_record(db: &DatabaseConnection, report: &OutputScanReport) {
    let now = chrono::Utc::now();
    let record = prompt_output::ActiveModel {
        id: Set(Uuid::new_v4()),
        original_prompt: Set(report.original_prompt.clone()),
        original_model_output: Set(report.original_model_output.clone()),
        final_model_output: Set(report.final_model_output.clone()),
        overall_valid: Set(report.overall_valid),
        max_risk_score: Set(report.max_risk_score),
        scanners_run: Set(report.scanners_run),
        scanner_results: Set(serde_json::to_value(&report.scanner_results).unwrap_or_default()),
        all_detected_entities: Set(
            serde_json::to_value(&report.all_detected_entities).unwrap_or_default()
        ),
        summary: Set(serde_json::to_value(&report.summary).unwrap_or_default()),
        timestamp: Set(report.timestamp.unwrap_or(now)),
        created_at: Set(now),
        ..Default::default()
    };

    if let Err(e) = record.insert(db).await {
        warn!(error = %e, "Failed to persist output scan record");
    }
}
