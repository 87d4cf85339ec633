use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use curable_context::build_greeting;

use crate::state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InsightsResponse {
    pub insights: Vec<String>,
    pub greeting: String,
}

/// Insight phrases and the greeting they produce, from the latest records
#[utoipa::path(
    get,
    path = "/user/{user_id}/insights",
    params(
        ("user_id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "Current insights", body = InsightsResponse)
    ),
    tag = "insights"
)]
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<InsightsResponse> {
    let insights = state.summarizer.profile_summary(&user_id).await.insights;
    let greeting = build_greeting(&insights);

    Json(InsightsResponse { insights, greeting })
}
