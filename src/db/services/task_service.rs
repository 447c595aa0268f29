use chrono::{DateTime, Utc};
use futures::try_join;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    FromQueryResult, IntoActiveModel, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
    sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr},
};

use crate::db::entities::task;
use crate::db::enums::{TaskPriority, TaskStatus};

const RECENT_ACTIVITY_LIMIT: u64 = 10;

// --- Task Query Types ---

/// Resolved list filters. Every field is optional and the fields combine
/// with AND; the owner constraint is added by the query functions and is
/// never optional.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub category: Option<String>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
    pub due_after: Option<DateTime<Utc>>,
    pub due_before: Option<DateTime<Utc>>,
}

impl TaskFilter {
    /// True when at least one due-date bound survived parsing. Listing
    /// switches to unpaginated mode on this, not on raw parameter presence.
    pub fn has_date_range(&self) -> bool {
        self.due_after.is_some() || self.due_before.is_some()
    }

    fn to_condition(&self, user_id: i32) -> Condition {
        let mut condition = Condition::all().add(task::Column::UserId.eq(user_id));
        if let Some(status) = self.status {
            condition = condition.add(task::Column::Status.eq(status.as_str()));
        }
        if let Some(category) = &self.category {
            condition = condition.add(task::Column::Category.eq(category.clone()));
        }
        if let Some(priority) = self.priority {
            condition = condition.add(task::Column::Priority.eq(priority.as_str()));
        }
        if let Some(search) = &self.search {
            condition = condition.add(substring_match(search));
        }
        if let Some(after) = self.due_after {
            condition = condition.add(task::Column::DueDate.gte(after));
        }
        if let Some(before) = self.due_before {
            condition = condition.add(task::Column::DueDate.lte(before));
        }
        condition
    }
}

/// Case-insensitive substring match over title OR description, combined
/// into one predicate so it ANDs cleanly with the other filters.
fn substring_match(needle: &str) -> Condition {
    let pattern = format!("%{}%", escape_like(&needle.to_lowercase()));
    Condition::any()
        .add(like_lowered(task::Column::Title, &pattern))
        .add(like_lowered(task::Column::Description, &pattern))
}

fn like_lowered(column: task::Column, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(LikeExpr::new(pattern).escape('\\'))
}

fn escape_like(raw: &str) -> String {
    // Backslash first so escapes are not themselves escaped.
    raw.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    DueDate,
    Title,
    Priority,
    Status,
    Category,
}

impl TaskSortField {
    /// Maps a wire sort name to a field; unknown names fall back to the
    /// default rather than erroring.
    pub fn parse(value: &str) -> Self {
        match value {
            "createdAt" => TaskSortField::CreatedAt,
            "updatedAt" => TaskSortField::UpdatedAt,
            "dueDate" => TaskSortField::DueDate,
            "title" => TaskSortField::Title,
            "priority" => TaskSortField::Priority,
            "status" => TaskSortField::Status,
            "category" => TaskSortField::Category,
            _ => TaskSortField::default(),
        }
    }

    fn column(self) -> task::Column {
        match self {
            TaskSortField::CreatedAt => task::Column::CreatedAt,
            TaskSortField::UpdatedAt => task::Column::UpdatedAt,
            TaskSortField::DueDate => task::Column::DueDate,
            TaskSortField::Title => task::Column::Title,
            TaskSortField::Priority => task::Column::Priority,
            TaskSortField::Status => task::Column::Status,
            TaskSortField::Category => task::Column::Category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    /// Exactly "asc" sorts ascending; anything else (including absent)
    /// sorts descending.
    pub fn parse(value: &str) -> Self {
        if value == "asc" {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    fn order(self) -> Order {
        match self {
            SortDirection::Ascending => Order::Asc,
            SortDirection::Descending => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TaskSort {
    pub field: TaskSortField,
    pub direction: SortDirection,
}

/// Slicing request. `limit: None` returns the full filtered set; the
/// caller only selects that mode when a date range is active.
#[derive(Debug, Clone, Copy)]
pub struct TaskPage {
    pub page: u64,
    pub limit: Option<u64>,
}

#[derive(Debug)]
pub struct TaskListing {
    pub tasks: Vec<task::Model>,
    pub total: u64,
}

// --- Task Service Functions ---

/// Lists an owner's tasks under the given filter, sort, and slicing.
/// `total` is always the unsliced count of the filtered set.
pub async fn list_tasks(
    db: &DatabaseConnection,
    user_id: i32,
    filter: &TaskFilter,
    sort: TaskSort,
    page: TaskPage,
) -> Result<TaskListing, DbErr> {
    let condition = filter.to_condition(user_id);

    let total = task::Entity::find()
        .filter(condition.clone())
        .count(db)
        .await?;

    let mut query = task::Entity::find()
        .filter(condition)
        .order_by(sort.field.column(), sort.direction.order())
        // Secondary key keeps page concatenation deterministic when the
        // primary sort values collide.
        .order_by(task::Column::Id, sort.direction.order());

    if let Some(limit) = page.limit {
        // Saturating math: an absurd page number means an empty slice past
        // the end, never an overflow.
        let skip = page.page.saturating_sub(1).saturating_mul(limit);
        query = query.offset(skip).limit(limit);
    }

    let tasks = query.all(db).await?;
    Ok(TaskListing { tasks, total })
}

pub struct NewTask {
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: TaskPriority,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
}

/// Creates a task for the owner, stamping both timestamps.
pub async fn create_task(
    db: &DatabaseConnection,
    user_id: i32,
    input: NewTask,
) -> Result<task::Model, DbErr> {
    let now = Utc::now();
    let new_task = task::ActiveModel {
        user_id: Set(user_id),
        title: Set(input.title),
        description: Set(input.description),
        category: Set(input.category),
        priority: Set(input.priority.as_str().to_owned()),
        status: Set(input.status.as_str().to_owned()),
        due_date: Set(input.due_date),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    new_task.insert(db).await
}

/// Partial update: `None` fields are left untouched. `due_date` is doubly
/// optional so that "absent", "clear to null", and "set" stay distinct.
#[derive(Debug, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<DateTime<Utc>>>,
}

/// Applies a partial update to an owner's task, refreshing `updated_at`.
/// Returns `None` when the id does not exist for this owner.
pub async fn update_task(
    db: &DatabaseConnection,
    user_id: i32,
    task_id: i32,
    changes: TaskChanges,
) -> Result<Option<task::Model>, DbErr> {
    let Some(existing) = task::Entity::find_by_id(task_id)
        .filter(task::Column::UserId.eq(user_id))
        .one(db)
        .await?
    else {
        return Ok(None);
    };

    let mut active = existing.into_active_model();
    if let Some(title) = changes.title {
        active.title = Set(title);
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    if let Some(category) = changes.category {
        active.category = Set(category);
    }
    if let Some(priority) = changes.priority {
        active.priority = Set(priority.as_str().to_owned());
    }
    if let Some(status) = changes.status {
        active.status = Set(status.as_str().to_owned());
    }
    if let Some(due_date) = changes.due_date {
        active.due_date = Set(due_date);
    }
    active.updated_at = Set(Utc::now());

    active.update(db).await.map(Some)
}

/// Deletes an owner's task; false when nothing matched.
pub async fn delete_task(
    db: &DatabaseConnection,
    user_id: i32,
    task_id: i32,
) -> Result<bool, DbErr> {
    let result = task::Entity::delete_many()
        .filter(task::Column::Id.eq(task_id))
        .filter(task::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected > 0)
}

/// Counts tasks of the owner whose denormalized category label equals
/// `category_name` exactly. Backs the category-deletion guard.
pub async fn count_tasks_with_category(
    db: &DatabaseConnection,
    user_id: i32,
    category_name: &str,
) -> Result<u64, DbErr> {
    task::Entity::find()
        .filter(task::Column::UserId.eq(user_id))
        .filter(task::Column::Category.eq(category_name))
        .count(db)
        .await
}

// --- Statistics ---

/// One group-by-category row. The raw stored label is kept; the empty
/// label is relabeled at the serialization boundary.
#[derive(FromQueryResult, Debug, Clone, PartialEq, Eq)]
pub struct CategoryTally {
    pub category: String,
    pub count: i64,
}

/// One group-by-priority row, also carrying the raw stored value so that
/// drifted rows surface (they are coerced to a valid label only when
/// rendered, and never merged into another group).
#[derive(FromQueryResult, Debug, Clone, PartialEq, Eq)]
pub struct PriorityTally {
    pub priority: String,
    pub count: i64,
}

#[derive(Debug)]
pub struct TaskStats {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub overdue: u64,
    pub by_category: Vec<CategoryTally>,
    pub by_priority: Vec<PriorityTally>,
    pub recent_activity: Vec<task::Model>,
}

async fn count_by_status(
    db: &DatabaseConnection,
    user_id: i32,
    status: Option<TaskStatus>,
) -> Result<u64, DbErr> {
    let mut query = task::Entity::find().filter(task::Column::UserId.eq(user_id));
    if let Some(status) = status {
        query = query.filter(task::Column::Status.eq(status.as_str()));
    }
    query.count(db).await
}

async fn tally_by_category(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<CategoryTally>, DbErr> {
    task::Entity::find()
        .select_only()
        .column(task::Column::Category)
        .column_as(Expr::expr(Func::count(Expr::col(task::Column::Id))), "count")
        .filter(task::Column::UserId.eq(user_id))
        .group_by(task::Column::Category)
        .order_by(Expr::col(Alias::new("count")), Order::Desc)
        .order_by(task::Column::Category, Order::Asc)
        .into_model::<CategoryTally>()
        .all(db)
        .await
}

async fn tally_by_priority(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<PriorityTally>, DbErr> {
    task::Entity::find()
        .select_only()
        .column(task::Column::Priority)
        .column_as(Expr::expr(Func::count(Expr::col(task::Column::Id))), "count")
        .filter(task::Column::UserId.eq(user_id))
        .group_by(task::Column::Priority)
        .order_by(Expr::col(Alias::new("count")), Order::Desc)
        .order_by(task::Column::Priority, Order::Asc)
        .into_model::<PriorityTally>()
        .all(db)
        .await
}

async fn recently_updated(
    db: &DatabaseConnection,
    user_id: i32,
) -> Result<Vec<task::Model>, DbErr> {
    task::Entity::find()
        .filter(task::Column::UserId.eq(user_id))
        .order_by_desc(task::Column::UpdatedAt)
        .order_by_desc(task::Column::Id)
        .limit(RECENT_ACTIVITY_LIMIT)
        .all(db)
        .await
}

/// Computes the owner's dashboard statistics. The status counts are
/// independent queries rather than derivations of `total`, so a drifted
/// status value cannot corrupt the other counters. All sub-queries run
/// concurrently and the first failure fails the whole call.
pub async fn get_task_stats(db: &DatabaseConnection, user_id: i32) -> Result<TaskStats, DbErr> {
    let (total, completed, pending, overdue, by_category, by_priority, recent_activity) = try_join!(
        count_by_status(db, user_id, None),
        count_by_status(db, user_id, Some(TaskStatus::Completed)),
        count_by_status(db, user_id, Some(TaskStatus::Pending)),
        count_by_status(db, user_id, Some(TaskStatus::Overdue)),
        tally_by_category(db, user_id),
        tally_by_priority(db, user_id),
        recently_updated(db, user_id),
    )?;

    Ok(TaskStats {
        total,
        completed,
        pending,
        overdue,
        by_category,
        by_priority,
        recent_activity,
    })
}
