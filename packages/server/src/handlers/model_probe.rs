use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

/// Forward the model collaborator's model listing. Deliberately
/// unauthenticated: this is a deployment health probe, not user data.
#[utoipa::path(
    get,
    path = "/api/v1/models",
    tag = "Models",
    operation_id = "listModels",
    summary = "Probe the model collaborator's model listing",
    responses(
        (status = 200, description = "Model listing as returned by the collaborator"),
        (status = 502, description = "Model collaborator unavailable (UPSTREAM_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let listing = state
        .model
        .list_models()
        .await
        .map_err(|e| AppError::Upstream(format!("Model listing failed: {e}")))?;

    Ok(Json(listing))
}
