use axum::{
    Json, Router,
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::{Deserialize, Deserializer};
use std::sync::Arc;

use crate::dates;
use crate::db::enums::{TaskPriority, TaskStatus};
use crate::db::services::task_service::{
    self, NewTask, SortDirection, TaskChanges, TaskFilter, TaskPage, TaskSort, TaskSortField,
};
use crate::web::models::{
    AuthenticatedUser, PaginationMeta, TaskBody, TaskListResponse, TaskResponse, TaskStatsResponse,
};
use crate::web::{AppState, error::AppError};

const DEFAULT_PAGE_LIMIT: u64 = 10;

pub fn create_task_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_tasks_handler).post(create_task_handler))
        .route("/stats", get(task_stats_handler))
        .route("/{id}", put(update_task_handler).delete(delete_task_handler))
}

// --- Query resolution ---

/// Raw list parameters. Everything deserializes as an optional string so
/// that malformed values resolve to defaults instead of a 400; the typed
/// view comes out of [`TaskListQuery::resolve`].
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(rename = "sortOrder")]
    pub sort_order: Option<String>,
}

impl TaskListQuery {
    /// Maps the loose parameters to a filter, sort, and slicing request.
    /// Unknown enum values and unparsable dates mean "filter absent";
    /// unparsable page/limit fall back to the defaults. When no limit was
    /// given and a date bound parsed, slicing is disabled so range views
    /// (calendar, reports) see the whole window.
    pub fn resolve(self) -> (TaskFilter, TaskSort, TaskPage) {
        let filter = TaskFilter {
            status: self.status.as_deref().and_then(TaskStatus::parse),
            category: self.category.filter(|c| !c.is_empty()),
            priority: self.priority.as_deref().and_then(TaskPriority::parse),
            search: self.search.filter(|s| !s.is_empty()),
            due_after: self.start_date.as_deref().and_then(dates::parse_local_date),
            due_before: self
                .end_date
                .as_deref()
                .and_then(dates::parse_local_date)
                .and_then(dates::end_of_local_day),
        };

        let sort = TaskSort {
            field: self
                .sort_by
                .as_deref()
                .map(TaskSortField::parse)
                .unwrap_or_default(),
            direction: self
                .sort_order
                .as_deref()
                .map(SortDirection::parse)
                .unwrap_or_default(),
        };

        let page = self
            .page
            .as_deref()
            .and_then(|p| p.parse::<u64>().ok())
            .filter(|&p| p >= 1)
            .unwrap_or(1);

        let limit = match self
            .limit
            .as_deref()
            .and_then(|l| l.parse::<u64>().ok())
            .filter(|&l| l >= 1)
        {
            Some(limit) => Some(limit),
            None if filter.has_date_range() => None,
            None => Some(DEFAULT_PAGE_LIMIT),
        };

        (filter, sort, TaskPage { page, limit })
    }
}

fn parse_task_id(raw: &str) -> Result<i32, AppError> {
    raw.parse()
        .map_err(|_| AppError::InvalidInput("Invalid task ID".to_string()))
}

// --- Route Handlers ---

async fn list_tasks_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<TaskListResponse>, AppError> {
    let (filter, sort, page) = query.resolve();

    let listing =
        task_service::list_tasks(&app_state.db_pool, authenticated_user.id, &filter, sort, page)
            .await?;

    let pagination = match page.limit {
        Some(limit) => PaginationMeta::Paged {
            page: page.page,
            limit,
            total: listing.total,
            total_pages: listing.total.div_ceil(limit),
        },
        None => PaginationMeta::Unpaged {
            total: listing.total,
        },
    };

    Ok(Json(TaskListResponse {
        tasks: listing.tasks.into_iter().map(TaskResponse::from).collect(),
        pagination,
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    pub due_date: Option<String>,
}

/// Empty strings count as absent here; clients send "" for untouched
/// select inputs and those fall through to the defaults.
fn parse_priority_field(raw: Option<&str>) -> Result<Option<TaskPriority>, AppError> {
    match raw.filter(|s| !s.is_empty()) {
        Some(value) => TaskPriority::parse(value)
            .map(Some)
            .ok_or_else(|| AppError::InvalidInput("Invalid priority".to_string())),
        None => Ok(None),
    }
}

fn parse_status_field(raw: Option<&str>) -> Result<Option<TaskStatus>, AppError> {
    match raw.filter(|s| !s.is_empty()) {
        Some(value) => TaskStatus::parse(value)
            .map(Some)
            .ok_or_else(|| AppError::InvalidInput("Invalid status".to_string())),
        None => Ok(None),
    }
}

async fn create_task_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskBody>), AppError> {
    let title = payload
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Title is required".to_string()))?
        .to_string();

    let priority = parse_priority_field(payload.priority.as_deref())?.unwrap_or_default();
    let status = parse_status_field(payload.status.as_deref())?.unwrap_or_default();
    // An unparsable due date stores null rather than failing the create.
    let due_date = payload.due_date.as_deref().and_then(dates::parse_local_date);

    let task_model = task_service::create_task(
        &app_state.db_pool,
        authenticated_user.id,
        NewTask {
            title,
            description: payload.description.unwrap_or_default(),
            category: payload.category.unwrap_or_default(),
            priority,
            status,
            due_date,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(TaskBody {
            task: TaskResponse::from(task_model),
        }),
    ))
}

/// Keeps "field present but null" distinct from "field absent" for
/// `dueDate`: absent leaves the stored date alone, null clears it.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
}

async fn update_task_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<TaskBody>, AppError> {
    let task_id = parse_task_id(&id)?;

    let title = match payload.title {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                return Err(AppError::InvalidInput("Title is required".to_string()));
            }
            Some(trimmed)
        }
        None => None,
    };

    let changes = TaskChanges {
        title,
        description: payload.description,
        category: payload.category,
        priority: parse_priority_field(payload.priority.as_deref())?,
        status: parse_status_field(payload.status.as_deref())?,
        due_date: payload
            .due_date
            .map(|value| value.as_deref().and_then(dates::parse_local_date)),
    };

    let updated = task_service::update_task(
        &app_state.db_pool,
        authenticated_user.id,
        task_id,
        changes,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".to_string()))?;

    Ok(Json(TaskBody {
        task: TaskResponse::from(updated),
    }))
}

async fn delete_task_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let task_id = parse_task_id(&id)?;

    let deleted =
        task_service::delete_task(&app_state.db_pool, authenticated_user.id, task_id).await?;
    if !deleted {
        return Err(AppError::NotFound("Task not found".to_string()));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn task_stats_handler(
    Extension(authenticated_user): Extension<AuthenticatedUser>,
    State(app_state): State<Arc<AppState>>,
) -> Result<Json<TaskStatsResponse>, AppError> {
    let stats = task_service::get_task_stats(&app_state.db_pool, authenticated_user.id).await?;
    Ok(Json(TaskStatsResponse::from(stats)))
}
