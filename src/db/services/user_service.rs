use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    QueryFilter, Set,
    sea_query::{Expr, Func},
};

use crate::db::entities::user;

// --- User Service Functions ---

/// Creates a new user with an already-hashed password.
pub async fn create_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<user::Model, DbErr> {
    let now = Utc::now();
    let new_user = user::ActiveModel {
        name: Set(name.to_owned()),
        email: Set(email.to_owned()),
        password_hash: Set(password_hash.to_owned()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_user.insert(db).await
}

pub async fn get_user_by_id(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find_by_id(user_id).one(db).await
}

/// Email lookup is case-insensitive; uniqueness is defined that way.
pub async fn get_user_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(user::Column::Email))).eq(email.to_lowercase()))
        .one(db)
        .await
}

/// True when another user (any id but `user_id`) already holds this email.
pub async fn email_taken_by_other(
    db: &DatabaseConnection,
    email: &str,
    user_id: i32,
) -> Result<bool, DbErr> {
    let existing = user::Entity::find()
        .filter(Expr::expr(Func::lower(Expr::col(user::Column::Email))).eq(email.to_lowercase()))
        .filter(user::Column::Id.ne(user_id))
        .one(db)
        .await?;
    Ok(existing.is_some())
}

/// Overwrites the profile fields, refreshing `updated_at`. Returns `None`
/// when the user no longer exists.
pub async fn update_profile(
    db: &DatabaseConnection,
    user_id: i32,
    name: String,
    email: String,
) -> Result<Option<user::Model>, DbErr> {
    let Some(existing) = user::Entity::find_by_id(user_id).one(db).await? else {
        return Ok(None);
    };

    let mut active = existing.into_active_model();
    active.name = Set(name);
    active.email = Set(email);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map(Some)
}
