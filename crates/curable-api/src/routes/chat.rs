use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub user_id: String,
    pub message: String,
}

impl ChatRequest {
    pub(crate) fn validate(&self) -> ApiResult<()> {
        if self.user_id.trim().is_empty() {
            return Err(ApiError::BadRequest("user_id must not be empty".to_string()));
        }
        if self.message.trim().is_empty() {
            return Err(ApiError::BadRequest("message must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub reply: String,
    /// Insights surfaced to the assistant on this turn (first turn only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub insights_used: Vec<String>,
}

/// Send a message and wait for the assistant's reply
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Invalid request"),
        (status = 504, description = "Assistant did not finish in time")
    ),
    tag = "chat"
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    req.validate()?;

    let reply = state.driver.chat(&req.user_id, &req.message).await?;

    Ok(Json(ChatResponse {
        reply: reply.reply,
        insights_used: reply.insights_used,
    }))
}
