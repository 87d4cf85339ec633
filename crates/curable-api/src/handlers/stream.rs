use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use std::sync::Arc;

use crate::{error::ApiResult, routes::chat::ChatRequest, state::AppState};

/// Send a message and stream the reply as plain text
///
/// Failures before the first byte map to the usual error responses. A run that
/// fails mid-reply aborts the chunked body.
#[utoipa::path(
    post,
    path = "/chat-stream",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply streamed as it is generated", content_type = "text/plain"),
        (status = 400, description = "Invalid request")
    ),
    tag = "chat"
)]
pub async fn chat_stream(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Response> {
    req.validate()?;

    let user_id = req.user_id.clone();
    let reply = state.driver.chat_stream(&req.user_id, &req.message).await?;

    let body = reply.map(move |chunk| {
        chunk.inspect_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Reply stream aborted");
        })
    });

    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        Body::from_stream(body),
    )
        .into_response())
}
