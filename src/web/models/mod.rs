use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::dates;
use crate::db::entities::{category, task};
use crate::db::enums::TaskPriority;
use crate::db::services::task_service::TaskStats;

/// Color and icon a category renders with when none was stored.
pub const DEFAULT_CATEGORY_COLOR: &str = "#6366f1";
pub const DEFAULT_CATEGORY_ICON: &str = "folder";

/// Display label for tasks whose category is the empty string.
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";

// --- Auth ---

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserSummary,
}

// JWT Claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (email)
    pub user_id: i32,
    pub exp: usize, // Expiration time (timestamp)
}

/// Struct to hold authenticated user details, to be passed as a request extension.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub id: i32,
    pub email: String,
}

// --- Tasks ---

/// Wire form of a task. Identifiers are strings, timestamps are ISO-8601
/// instants, and the due date is the calendar day of the stored (UTC)
/// value so it cannot drift with the server timezone.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: String,
    pub status: String,
    pub due_date: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<task::Model> for TaskResponse {
    fn from(model: task::Model) -> Self {
        TaskResponse {
            id: model.id.to_string(),
            user_id: model.user_id.to_string(),
            title: model.title,
            description: model.description,
            category: model.category,
            priority: model.priority,
            status: model.status,
            due_date: model.due_date.map(dates::format_storage_date),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TaskBody {
    pub task: TaskResponse,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PaginationMeta {
    Paged {
        page: u64,
        limit: u64,
        total: u64,
        #[serde(rename = "totalPages")]
        total_pages: u64,
    },
    Unpaged {
        total: u64,
    },
}

#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskResponse>,
    pub pagination: PaginationMeta,
}

// --- Statistics ---

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorityCount {
    pub priority: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatsBody {
    pub total: u64,
    pub completed: u64,
    pub pending: u64,
    pub overdue: u64,
    pub by_category: Vec<CategoryCount>,
    pub by_priority: Vec<PriorityCount>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivityItem {
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: String,
    pub category: String,
    pub updated_at: DateTime<Utc>,
}

impl From<task::Model> for RecentActivityItem {
    fn from(model: task::Model) -> Self {
        RecentActivityItem {
            id: model.id.to_string(),
            title: model.title,
            description: model.description,
            status: model.status,
            category: model.category,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatsResponse {
    pub stats: TaskStatsBody,
    pub recent_activity: Vec<RecentActivityItem>,
}

impl From<TaskStats> for TaskStatsResponse {
    fn from(stats: TaskStats) -> Self {
        TaskStatsResponse {
            stats: TaskStatsBody {
                total: stats.total,
                completed: stats.completed,
                pending: stats.pending,
                overdue: stats.overdue,
                by_category: stats
                    .by_category
                    .into_iter()
                    .map(|tally| CategoryCount {
                        category: if tally.category.is_empty() {
                            UNCATEGORIZED_LABEL.to_string()
                        } else {
                            tally.category
                        },
                        count: tally.count,
                    })
                    .collect(),
                // Drifted priority values render as the default label but
                // keep their own group; nothing is merged or rewritten.
                by_priority: stats
                    .by_priority
                    .into_iter()
                    .map(|tally| PriorityCount {
                        priority: TaskPriority::parse(&tally.priority)
                            .unwrap_or_default()
                            .as_str()
                            .to_string(),
                        count: tally.count,
                    })
                    .collect(),
            },
            recent_activity: stats
                .recent_activity
                .into_iter()
                .map(RecentActivityItem::from)
                .collect(),
        }
    }
}

// --- Categories ---

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub icon: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<category::Model> for CategoryResponse {
    fn from(model: category::Model) -> Self {
        CategoryResponse {
            id: model.id.to_string(),
            user_id: model.user_id.to_string(),
            name: model.name,
            description: model.description,
            color: model.color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string()),
            icon: model.icon.unwrap_or_else(|| DEFAULT_CATEGORY_ICON.to_string()),
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryBody {
    pub category: CategoryResponse,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<CategoryResponse>,
}
