use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    Order, QueryFilter, QueryOrder, Set,
    sea_query::{Expr, Func},
};

use crate::db::entities::category;
use crate::db::services::task_service;

// --- Category Service Functions ---

pub struct NewCategory {
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
}

/// Present fields overwrite, absent fields are untouched.
#[derive(Debug, Default)]
pub struct CategoryChanges {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
}

pub enum CategoryCreation {
    Created(category::Model),
    DuplicateName,
}

pub enum CategoryUpdate {
    Updated(category::Model),
    DuplicateName,
    NotFound,
}

pub enum CategoryDeletion {
    Deleted,
    InUse(u64),
    NotFound,
}

/// Case-insensitive name lookup within one owner's categories, optionally
/// excluding one id (for rename checks).
async fn find_by_name(
    db: &DatabaseConnection,
    user_id: i32,
    name: &str,
    excluding: Option<i32>,
) -> Result<Option<category::Model>, DbErr> {
    let mut query = category::Entity::find()
        .filter(category::Column::UserId.eq(user_id))
        .filter(Expr::expr(Func::lower(Expr::col(category::Column::Name))).eq(name.to_lowercase()));
    if let Some(id) = excluding {
        query = query.filter(category::Column::Id.ne(id));
    }
    query.one(db).await
}

pub async fn list_categories(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<category::Model>, DbErr> {
    category::Entity::find()
        .filter(category::Column::UserId.eq(user_id))
        .order_by(category::Column::CreatedAt, Order::Desc)
        .order_by(category::Column::Id, Order::Desc)
        .all(db)
        .await
}

pub async fn create_category(
    db: &DatabaseConnection,
    user_id: i32,
    input: NewCategory,
) -> Result<CategoryCreation, DbErr> {
    if find_by_name(db, user_id, &input.name, None).await?.is_some() {
        return Ok(CategoryCreation::DuplicateName);
    }

    let now = Utc::now();
    let new_category = category::ActiveModel {
        user_id: Set(user_id),
        name: Set(input.name),
        description: Set(input.description),
        color: Set(Some(input.color)),
        icon: Set(Some(input.icon)),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(CategoryCreation::Created(new_category.insert(db).await?))
}

pub async fn update_category(
    db: &DatabaseConnection,
    user_id: i32,
    category_id: i32,
    changes: CategoryChanges,
) -> Result<CategoryUpdate, DbErr> {
    let Some(existing) = category::Entity::find_by_id(category_id)
        .filter(category::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(CategoryUpdate::NotFound);
    };

    if let Some(name) = &changes.name {
        if find_by_name(db, user_id, name, Some(category_id)).await?.is_some() {
            return Ok(CategoryUpdate::DuplicateName);
        }
    }

    // Renaming does not cascade to tasks; their denormalized labels keep
    // the old name.
    let mut active = existing.into_active_model();
    if let Some(name) = changes.name {
        active.name = Set(name);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(color) = changes.color {
        active.color = Set(Some(color));
    }
    if let Some(icon) = changes.icon {
        active.icon = Set(Some(icon));
    }
    active.updated_at = Set(Utc::now());

    Ok(CategoryUpdate::Updated(active.update(db).await?))
}

/// Deletes a category unless any of the owner's tasks still carries its
/// name. The lookup, the count, and the delete are three separate reads
/// with no lock; a task inserted with this name between the count and the
/// delete slips past the guard. Accepted as a benign race.
pub async fn delete_category(
    db: &DatabaseConnection,
    user_id: i32,
    category_id: i32,
) -> Result<CategoryDeletion, DbErr> {
    let Some(existing) = category::Entity::find_by_id(category_id)
        .filter(category::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(CategoryDeletion::NotFound);
    };

    let in_use = task_service::count_tasks_with_category(db, user_id, &existing.name).await?;
    if in_use > 0 {
        return Ok(CategoryDeletion::InUse(in_use));
    }

    let result = category::Entity::delete_many()
        .filter(category::Column::Id.eq(category_id))
        .filter(category::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        Ok(CategoryDeletion::Deleted)
    } else {
        Ok(CategoryDeletion::NotFound)
    }
}
