use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use curable_conversation::ConversationError;
use curable_persist::PersistError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Conversation error: {0}")]
    Conversation(#[from] ConversationError),

    #[error("Processing error: {0}")]
    Processing(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::ProfileNotFound(_) => (StatusCode::NOT_FOUND, "Profile not found".to_string()),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::Conversation(ref e) if e.is_timeout() => {
                tracing::error!("Assistant timeout: {}", e);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    "The assistant did not respond in time".to_string(),
                )
            }
            ApiError::Persist(ref e) | ApiError::Conversation(ConversationError::Persistence(ref e)) => {
                tracing::error!("Persistence error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Storage error".to_string())
            }
            ApiError::Conversation(ref e) => {
                tracing::error!("Conversation error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Processing error".to_string())
            }
            ApiError::Processing(ref e) => {
                tracing::error!("Processing error: {:#}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Processing error".to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::ProfileNotFound("ada".into()), StatusCode::NOT_FOUND),
            (ApiError::BadRequest("empty message".into()), StatusCode::BAD_REQUEST),
            (
                ApiError::Conversation(ConversationError::UpstreamTimeout {
                    run_id: "run_1".into(),
                    attempts: 3,
                    waited: Duration::from_secs(3),
                }),
                StatusCode::GATEWAY_TIMEOUT,
            ),
            (
                ApiError::Conversation(ConversationError::Persistence(PersistError::Internal("boom".into()))),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ApiError::Processing(anyhow::anyhow!("model unavailable")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }
}
