use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use curable_conversation::CleanupOutcome;

use crate::{error::ApiResult, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CleanupResponse {
    /// `success` or `no_thread`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl From<CleanupOutcome> for CleanupResponse {
    fn from(outcome: CleanupOutcome) -> Self {
        match outcome {
            CleanupOutcome::NoThread => Self {
                status: "no_thread".to_string(),
                summary: None,
            },
            CleanupOutcome::Completed { summary, .. } => Self {
                status: "success".to_string(),
                summary: Some(summary),
            },
        }
    }
}

/// Summarize the user's conversation into their record and start a new thread
#[utoipa::path(
    post,
    path = "/cleanup/{user_id}",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Cleanup result", body = CleanupResponse)
    ),
    tag = "chat"
)]
pub async fn cleanup(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<CleanupResponse>> {
    let outcome = state.cleanup.cleanup(&user_id).await?;
    Ok(Json(outcome.into()))
}
