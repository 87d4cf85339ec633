use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use curable_persist::Profile;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileResponse {
    pub user_id: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub bmi: Option<f64>,
    pub blood_group: Option<String>,
    pub genotype: Option<String>,
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self {
            user_id: profile.id,
            full_name: profile.full_name,
            email: profile.email,
            age: profile.age,
            gender: profile.gender,
            bmi: profile.bmi,
            blood_group: profile.blood_group,
            genotype: profile.genotype,
        }
    }
}

/// Look up a profile by (part of) the user's full name
#[utoipa::path(
    get,
    path = "/profile/{username}",
    params(
        ("username" = String, Path, description = "Name fragment, matched case-insensitively")
    ),
    responses(
        (status = 200, description = "Matching profile", body = ProfileResponse),
        (status = 404, description = "No profile matches")
    ),
    tag = "profile"
)]
pub async fn get_profile(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> ApiResult<Json<ProfileResponse>> {
    let profile = state
        .persist
        .find_profile_by_name(&username)
        .await?
        .ok_or(ApiError::ProfileNotFound(username))?;

    Ok(Json(profile.into()))
}
