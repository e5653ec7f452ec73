use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::scan::OutputScanReport;

/// One entry of the client-side conversation history.
#[derive(Clone, Deserialize, utoipa::ToSchema)]
pub struct IncomingMessage {
    /// "user" or "assistant".
    pub role: String,
    pub content: String,
}

/// File attached to the new turn, already base64-encoded by the client.
#[derive(Clone, Deserialize, utoipa::ToSchema)]
pub struct AttachmentUpload {
    pub name: Option<String>,
    /// Declared MIME type of the file.
    #[serde(rename = "type")]
    pub mime_type: String,
    /// `data:<mime>;base64,<payload>` data-URI.
    pub data: String,
}

/// Request body for one chat turn. `messages` carries the full history with
/// the new user message last; key names are part of the client contract.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct TurnRequest {
    pub messages: Vec<IncomingMessage>,
    pub data: Option<Vec<AttachmentUpload>>,
    #[serde(rename = "chatId")]
    pub chat_id: Option<i32>,
}

pub fn validate_turn_request(payload: &TurnRequest) -> Result<(), AppError> {
    if payload.messages.is_empty() {
        return Err(AppError::Validation("messages must not be empty".into()));
    }
    Ok(())
}

/// Successful turn response.
#[derive(Serialize, utoipa::ToSchema)]
pub struct TurnResponse {
    /// Always "assistant".
    pub role: &'static str,
    /// The model's (unsanitized) reply text.
    pub content: String,
    /// Output scan verdict, absent when the output scan was unavailable.
    #[serde(rename = "outputScanResult")]
    #[schema(value_type = Object)]
    pub output_scan_result: Option<OutputScanReport>,
    /// Chat the turn was recorded under; tells clients the id of a chat the
    /// turn just created.
    #[serde(rename = "chatId")]
    pub chat_id: i32,
}
