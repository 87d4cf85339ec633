use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use curable_persist::SymptomAssessment;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseRequest {
    pub user_id: String,
    pub symptoms: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AssessmentResponse {
    pub id: String,
    pub symptoms: String,
    pub summary: String,
    pub suspected_conditions: Vec<String>,
    pub recommendations: Vec<String>,
    pub quick_remedy: Vec<String>,
    pub red_flags: Vec<String>,
    pub confidence_score: Option<f64>,
    pub urgency_level: Option<String>,
    pub follow_up_timeline: Option<String>,
    pub disclaimer: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SymptomAssessment> for AssessmentResponse {
    fn from(a: SymptomAssessment) -> Self {
        Self {
            id: a.id,
            symptoms: a.symptoms,
            summary: a.ai_diagnosis,
            suspected_conditions: a.suspected_conditions,
            recommendations: a.recommendations,
            quick_remedy: a.quick_remedy,
            red_flags: a.red_flags,
            confidence_score: a.confidence_score,
            urgency_level: a.urgency_level,
            follow_up_timeline: a.follow_up_timeline,
            disclaimer: a.disclaimer,
            created_at: a.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DiagnoseResponse {
    pub success: bool,
    pub assessment: AssessmentResponse,
}

/// AI assessment of reported symptoms, stored on the user's record
#[utoipa::path(
    post,
    path = "/diagnose",
    request_body = DiagnoseRequest,
    responses(
        (status = 200, description = "Stored assessment", body = DiagnoseResponse),
        (status = 400, description = "Invalid request")
    ),
    tag = "diagnosis"
)]
pub async fn diagnose(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DiagnoseRequest>,
) -> ApiResult<Json<DiagnoseResponse>> {
    if req.symptoms.trim().is_empty() {
        return Err(ApiError::BadRequest("symptoms must not be empty".to_string()));
    }

    let assessment = state.assessor.assess(&req.user_id, &req.symptoms).await?;

    Ok(Json(DiagnoseResponse {
        success: true,
        assessment: assessment.into(),
    }))
}
