// src/handlers/profile.rs

use axum::{extract::State, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::profile::{ProfileInput, UserProfile},
};

#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Profile",
    responses(
        (status = 200, description = "Business profile", body = UserProfile),
        (status = 404, description = "Profile not filled in yet")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(app_state.profile_service.get(user.id).await?))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "Profile",
    request_body = ProfileInput,
    responses(
        (status = 200, description = "Profile created or updated", body = UserProfile),
        (status = 400, description = "Invalid payload")
    ),
    security(("api_jwt" = []))
)]
pub async fn save_profile(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(payload): Json<ProfileInput>,
) -> Result<Json<UserProfile>, AppError> {
    payload.validate()?;
    Ok(Json(app_state.profile_service.save(user.id, &payload).await?))
}
