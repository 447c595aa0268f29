use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::db::services::category_service::{
    self, CategoryChanges, CategoryCreation, CategoryDeletion, CategoryUpdate, NewCategory,
};
use crate::web::models::{
    AuthenticatedUser, CategoriesResponse, CategoryBody, CategoryResponse, DEFAULT_CATEGORY_COLOR,
    DEFAULT_CATEGORY_ICON,
};
use crate::web::{AppState, error::AppError};

pub fn create_category_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_categories_handler).post(create_category_handler))
        .route(
            "/{id}",
            put(update_category_handler).delete(delete_category_handler),
        )
}

fn parse_category_id(raw: &str) -> Result<i32, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidInput("Invalid category ID".to_string()))
}

// --- Route Handlers ---

#[derive(Debug, Deserialize)]
pub struct ListCategoriesQuery {
    pub refresh: Option<String>,
}

async fn list_categories_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ListCategoriesQuery>,
) -> Result<Json<CategoriesResponse>, AppError> {
    let user_id = authenticated_user.id;
    let force_refresh = query.refresh.as_deref() == Some("true");

    let categories = if force_refresh {
        None
    } else {
        app_state.category_cache.get(user_id).await
    };

    let categories = match categories {
        Some(cached) => cached,
        None => {
            let fresh = category_service::list_categories(&app_state.db_pool, user_id).await?;
            app_state.category_cache.put(user_id, fresh.clone()).await;
            fresh
        }
    };

    Ok(Json(CategoriesResponse {
        categories: categories.into_iter().map(CategoryResponse::from).collect(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

async fn create_category_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<CategoryBody>), AppError> {
    let name = payload
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Name is required".to_string()))?
        .to_string();

    let created = category_service::create_category(
        &app_state.db_pool,
        authenticated_user.id,
        NewCategory {
            name,
            description: payload.description.unwrap_or_default(),
            color: payload
                .color
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            icon: payload
                .icon
                .filter(|i| !i.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
        },
    )
    .await?;

    let category_model = match created {
        CategoryCreation::Created(model) => model,
        CategoryCreation::DuplicateName => {
            return Err(AppError::Conflict("Category already exists".to_string()));
        }
    };

    app_state.category_cache.invalidate(authenticated_user.id).await;

    Ok((
        StatusCode::CREATED,
        Json(CategoryBody {
            category: CategoryResponse::from(category_model),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

async fn update_category_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateCategoryRequest>,
) -> Result<Json<CategoryBody>, AppError> {
    let category_id = parse_category_id(&id)?;

    let name = match payload.name {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                return Err(AppError::InvalidInput("Name is required".to_string()));
            }
            Some(trimmed)
        }
        None => None,
    };

    let updated = category_service::update_category(
        &app_state.db_pool,
        authenticated_user.id,
        category_id,
        CategoryChanges {
            name,
            description: payload.description,
            color: payload.color,
            icon: payload.icon,
        },
    )
    .await?;

    let category_model = match updated {
        CategoryUpdate::Updated(model) => model,
        CategoryUpdate::DuplicateName => {
            return Err(AppError::Conflict("Category already exists".to_string()));
        }
        CategoryUpdate::NotFound => {
            return Err(AppError::NotFound("Category not found".to_string()));
        }
    };

    app_state.category_cache.invalidate(authenticated_user.id).await;

    Ok(Json(CategoryBody {
        category: CategoryResponse::from(category_model),
    }))
}

async fn delete_category_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let category_id = parse_category_id(&id)?;

    let deletion = category_service::delete_category(
        &app_state.db_pool,
        authenticated_user.id,
        category_id,
    )
    .await?;

    match deletion {
        CategoryDeletion::Deleted => {
            app_state.category_cache.invalidate(authenticated_user.id).await;
            Ok(StatusCode::NO_CONTENT)
        }
        CategoryDeletion::InUse(count) => Err(AppError::Conflict(format!(
            "Cannot delete category. {count} task(s) are using this category."
        ))),
        CategoryDeletion::NotFound => Err(AppError::NotFound("Category not found".to_string())),
    }
}
