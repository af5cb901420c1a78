//! Task resource service.
//!
//! Thin orchestration: every operation loads the task (absence becomes
//! `NotFound` here, never below), consults the authorization policy, then
//! calls the generic repository for persistence. Creating a task and looking
//! up its assignee are sequential, independent calls; there is no
//! cross-record transaction.

use sqlx::PgPool;
use uuid::Uuid;

use crate::db::{Document, Filter, PaginatedResult, Pagination, Repository, Value};
use crate::error::{AppError, PersistenceError};
use crate::models::{CreateTaskInput, Task, TaskStatus, UpdateTaskInput};
use crate::policy;
use crate::services::UserService;

#[derive(Clone)]
pub struct TaskService {
    repo: Repository<Task>,
    users: UserService,
}

/// Store-schema validator for task writes.
fn validate_task_fields(doc: &Document) -> Result<(), PersistenceError> {
    if let Some(Value::Text(title)) = doc.get("title") {
        if title.trim().is_empty() {
            return Err(PersistenceError::ConstraintViolation(
                "title must not be empty".into(),
            ));
        }
    }
    Ok(())
}

impl TaskService {
    pub fn new(pool: PgPool, users: UserService) -> Self {
        let repo = Repository::new(pool).with_validator(validate_task_fields);
        TaskService { repo, users }
    }

    /// Creates a task on behalf of `creator`, who becomes its immutable
    /// `created_by`. Status always starts out pending; priority defaults low.
    pub async fn create(&self, creator: Uuid, input: &CreateTaskInput) -> Result<Task, AppError> {
        let mut doc = Document::new()
            .set("title", input.title.as_str())
            .set("created_by", creator);
        if let Some(description) = &input.description {
            doc = doc.set("description", description.as_str());
        }
        if let Some(priority) = input.priority {
            doc = doc.set("priority", priority);
        }
        if let Some(assigned_to) = input.assigned_to {
            doc = doc.set("assigned_to", assigned_to);
        }
        Ok(self.repo.create(doc).await?)
    }

    /// Paginated, filterable listing. Read access is not restricted per task.
    pub async fn find_all(
        &self,
        filter: &Filter,
        pagination: &Pagination,
    ) -> Result<PaginatedResult<Task>, AppError> {
        Ok(self.repo.find(filter, pagination).await?)
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Task, AppError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    /// Updates non-status fields. Creator only.
    pub async fn update(
        &self,
        actor: Uuid,
        id: &str,
        input: &UpdateTaskInput,
    ) -> Result<Task, AppError> {
        let task = self.find_by_id(id).await?;
        policy::authorize_update(actor, &task)?;

        let mut patch = Document::new();
        if let Some(title) = &input.title {
            patch = patch.set("title", title.as_str());
        }
        if let Some(description) = &input.description {
            patch = patch.set("description", description.as_str());
        }
        if let Some(priority) = input.priority {
            patch = patch.set("priority", priority);
        }
        if let Some(assigned_to) = input.assigned_to {
            patch = patch.set("assigned_to", assigned_to);
        }
        if patch.is_empty() {
            return Ok(task);
        }

        self.repo
            .update(&Filter::new().eq("id", task.id), patch)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    /// Transitions the task's status. Creator or current assignee; any status
    /// may follow any other.
    pub async fn update_status(
        &self,
        actor: Uuid,
        id: &str,
        status: TaskStatus,
    ) -> Result<Task, AppError> {
        let task = self.find_by_id(id).await?;
        policy::authorize_status_update(actor, &task)?;

        self.repo
            .update(
                &Filter::new().eq("id", task.id),
                Document::new().set("status", status),
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    /// Assigns the task to a user. Creator only; the target user must exist,
    /// except that the creator may assign to themself without a lookup.
    pub async fn assign(&self, actor: Uuid, id: &str, user_id: Uuid) -> Result<Task, AppError> {
        let task = self.find_by_id(id).await?;
        policy::authorize_assign(actor, &task)?;

        if user_id != actor {
            self.users
                .find_by_id(&user_id.to_string())
                .await?
                .ok_or_else(|| AppError::NotFound("User not found".into()))?;
        }

        self.repo
            .update(
                &Filter::new().eq("id", task.id),
                Document::new().set("assigned_to", user_id),
            )
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    /// Deletes the task. Creator only. Returns whether a record was removed;
    /// a concurrent deletion after the policy check is reported as `false`,
    /// not an error.
    pub async fn remove(&self, actor: Uuid, id: &str) -> Result<bool, AppError> {
        let task = self.find_by_id(id).await?;
        policy::authorize_delete(actor, &task)?;
        Ok(self
            .repo
            .delete_one(&Filter::new().eq("id", task.id))
            .await?)
    }
}
