use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::db::{Filter, Pagination, Record, Value};

/// Represents the status of a task.
///
/// Stored as text in the `tasks` collection. Any status may follow any other;
/// no transition graph is enforced beyond membership in the enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    Pending,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed.
    Done,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }
}

impl Default for TaskStatus {
    fn default() -> TaskStatus {
        TaskStatus::Pending
    }
}

impl From<TaskStatus> for Value {
    fn from(status: TaskStatus) -> Value {
        Value::Text(status.as_str().to_string())
    }
}

/// Represents the priority of a task.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl Default for TaskPriority {
    fn default() -> TaskPriority {
        TaskPriority::Low
    }
}

impl From<TaskPriority> for Value {
    fn from(priority: TaskPriority) -> Value {
        Value::Text(priority.as_str().to_string())
    }
}

/// A task record as stored in the collection and returned by the API.
///
/// `created_by` is set once at creation and never mutated; `assigned_to` is
/// the only identity field that changes over a task's life.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub created_by: Uuid,
    pub assigned_to: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record for Task {
    const COLLECTION: &'static str = "tasks";
}

/// Input structure for creating a task.
///
/// `status` is not part of creation; every task starts out pending. Priority
/// and assignment are optional; the store defaults apply when absent.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
}

/// Input structure for updating a task's non-status fields. Absent fields are
/// left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskInput {
    #[validate(length(min = 1, max = 200, message = "Title is required"))]
    pub title: Option<String>,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub assigned_to: Option<Uuid>,
}

/// Input structure for the dedicated status transition operation.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskStatusInput {
    pub status: TaskStatus,
}

/// Input structure for assigning a task to a user.
#[derive(Debug, Deserialize)]
pub struct AssignTaskInput {
    pub user_id: Uuid,
}

/// Query parameters accepted when listing tasks: field filters plus
/// pagination.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[validate(range(min = 1, message = "Page must be a positive number"))]
    pub page: Option<i64>,
    #[validate(range(min = 1, message = "Limit must be a positive number"))]
    pub limit: Option<i64>,
}

impl TaskQuery {
    pub fn filter(&self) -> Filter {
        let mut filter = Filter::new();
        if let Some(status) = self.status {
            filter = filter.eq("status", status);
        }
        if let Some(priority) = self.priority {
            filter = filter.eq("priority", priority);
        }
        filter
    }

    pub fn pagination(&self) -> Pagination {
        Pagination {
            page: self.page,
            limit: self.limit,
        }
    }
}
