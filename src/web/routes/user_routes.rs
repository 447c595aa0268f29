use axum::{
    Json, Router,
    extract::{Extension, State},
    routing::put,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::services::user_service;
use crate::web::models::{AuthenticatedUser, ProfileResponse, UserSummary};
use crate::web::{AppState, error::AppError};

pub fn create_profile_router() -> Router<Arc<AppState>> {
    Router::new().route("/", put(update_profile_handler))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

async fn update_profile_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty());
    let email = payload
        .email
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    let (Some(name), Some(email)) = (name, email) else {
        return Err(AppError::InvalidInput(
            "Name and email are required".to_string(),
        ));
    };

    if user_service::email_taken_by_other(&app_state.db_pool, email, authenticated_user.id).await? {
        return Err(AppError::Conflict("Email already in use".to_string()));
    }

    let updated = user_service::update_profile(
        &app_state.db_pool,
        authenticated_user.id,
        name.to_string(),
        email.to_string(),
    )
    .await?
    .ok_or(AppError::UserNotFound)?;

    Ok(Json(ProfileResponse {
        user: UserSummary {
            id: updated.id.to_string(),
            name: updated.name,
            email: updated.email,
        },
    }))
}
