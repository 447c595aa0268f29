use axum::{Extension, extract::State};
use bcrypt::{DEFAULT_COST, hash, verify};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::db::entities::user;
use crate::db::services::user_service;
use crate::web::AppState;
use crate::web::error::AppError;
use crate::web::models::{
    AuthResponse, AuthenticatedUser, Claims, LoginRequest, RegisterRequest, UserSummary,
};

const MIN_PASSWORD_LEN: usize = 6;

pub async fn register_user(
    pool: &DatabaseConnection,
    req: RegisterRequest,
    jwt_secret: &str,
) -> Result<AuthResponse, AppError> {
    let (Some(name), Some(email), Some(password)) = (req.name, req.email, req.password) else {
        return Err(AppError::InvalidInput("Missing required fields".to_string()));
    };
    let name = name.trim().to_string();
    let email = email.trim().to_string();
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(AppError::InvalidInput("Missing required fields".to_string()));
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if user_service::get_user_by_email(pool, &email).await?.is_some() {
        return Err(AppError::UserAlreadyExists("User already exists".to_string()));
    }

    let password_hash = hash(&password, DEFAULT_COST)
        .map_err(|e| AppError::PasswordHashingError(e.to_string()))?;

    let user_model = user_service::create_user(pool, &name, &email, &password_hash).await?;
    info!(user_id = user_model.id, "Registered new user");

    create_auth_response(&user_model, jwt_secret)
}

pub async fn login_user(
    pool: &DatabaseConnection,
    req: LoginRequest,
    jwt_secret: &str,
) -> Result<AuthResponse, AppError> {
    let (Some(email), Some(password)) = (req.email, req.password) else {
        return Err(AppError::InvalidCredentials);
    };

    let Some(user_model) = user_service::get_user_by_email(pool, email.trim()).await? else {
        return Err(AppError::UserNotFound);
    };

    let valid_password = verify(&password, &user_model.password_hash)
        .map_err(|e| AppError::InternalServerError(format!("Password verification failed: {e}")))?;
    if !valid_password {
        return Err(AppError::InvalidCredentials);
    }

    create_auth_response(&user_model, jwt_secret)
}

/// Mints a 24-hour HS256 token carrying the user's email as subject.
fn create_auth_response(user: &user::Model, jwt_secret: &str) -> Result<AuthResponse, AppError> {
    let expiration = (Utc::now() + Duration::hours(24)).timestamp() as usize;

    let claims = Claims {
        sub: user.email.clone(),
        user_id: user.id,
        exp: expiration,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_ref()),
    )
    .map_err(|e| AppError::TokenCreationError(e.to_string()))?;

    Ok(AuthResponse {
        token,
        user: UserSummary {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
        },
    })
}

/// `GET /api/auth/me`: the identity behind the presented token. The token
/// only carries id and email, so the profile is re-read for the name.
pub async fn me(
    State(app_state): State<Arc<AppState>>,
    Extension(authenticated_user): Extension<AuthenticatedUser>,
) -> Result<axum::Json<UserSummary>, AppError> {
    let Some(user_model) =
        user_service::get_user_by_id(&app_state.db_pool, authenticated_user.id).await?
    else {
        // Token outlived the account.
        return Err(AppError::UserNotFound);
    };

    Ok(axum::Json(UserSummary {
        id: user_model.id.to_string(),
        name: user_model.name,
        email: user_model.email,
    }))
}
