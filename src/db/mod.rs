use sea_orm::sea_query::{Alias, Index};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, Schema,
};
use tracing::info;

use crate::db::entities::{category, task, user};

pub mod entities;
pub mod enums;
pub mod services;

pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let mut opt = ConnectOptions::new(database_url.to_owned());
    opt.max_connections(10);
    Database::connect(opt).await
}

/// Creates the tables and indexes derived from the entities when they are
/// missing. Safe to run on every startup.
pub async fn init_schema(db: &DatabaseConnection) -> Result<(), DbErr> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut users_table = schema.create_table_from_entity(user::Entity);
    users_table.if_not_exists();
    db.execute(builder.build(&users_table)).await?;

    let mut tasks_table = schema.create_table_from_entity(task::Entity);
    tasks_table.if_not_exists();
    db.execute(builder.build(&tasks_table)).await?;

    let mut categories_table = schema.create_table_from_entity(category::Entity);
    categories_table.if_not_exists();
    db.execute(builder.build(&categories_table)).await?;

    // Owner-scoped lookups hit this on every task query.
    let mut tasks_owner_index = Index::create();
    tasks_owner_index
        .name("idx_tasks_user_id")
        .table(Alias::new("tasks"))
        .col(Alias::new("user_id"))
        .if_not_exists();
    db.execute(builder.build(&tasks_owner_index)).await?;

    let mut categories_owner_index = Index::create();
    categories_owner_index
        .name("idx_categories_user_id")
        .table(Alias::new("categories"))
        .col(Alias::new("user_id"))
        .if_not_exists();
    db.execute(builder.build(&categories_owner_index)).await?;

    // Second line of defense behind the case-insensitive duplicate check.
    let mut categories_name_index = Index::create();
    categories_name_index
        .name("idx_categories_user_id_name")
        .table(Alias::new("categories"))
        .col(Alias::new("user_id"))
        .col(Alias::new("name"))
        .unique()
        .if_not_exists();
    db.execute(builder.build(&categories_name_index)).await?;

    info!("Database schema is ready");
    Ok(())
}
