use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{AssignTaskInput, CreateTaskInput, TaskQuery, UpdateTaskInput, UpdateTaskStatusInput},
    services::TaskService,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use validator::Validate;

/// Retrieves a paginated list of tasks.
///
/// Any authenticated user may list tasks; there is no task-level read
/// restriction. Supports filtering by `status` and `priority`, plus `page`
/// and `limit` pagination parameters (defaulting to page 1, 15 per page).
///
/// ## Responses:
/// - `200 OK`: Returns a paginated result with `data`, `current_page`,
///   `total_pages` and `total_items`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If `page` or `limit` is not positive.
#[get("")]
pub async fn get_tasks(
    service: web::Data<TaskService>,
    query: web::Query<TaskQuery>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    query.validate()?;

    let result = service
        .find_all(&query.filter(), &query.pagination())
        .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: The title of the task (required, non-empty).
/// - `description` (optional): A description of the task.
/// - `priority` (optional): "low", "medium" or "high"; defaults to "low".
/// - `assigned_to` (optional): Id of the user the task starts out assigned to.
///
/// New tasks always start in the "pending" status.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created task as JSON.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If input validation fails.
#[post("")]
pub async fn create_task(
    service: web::Data<TaskService>,
    task_data: web::Json<CreateTaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = service.create(user.0, &task_data).await?;

    Ok(HttpResponse::Created().json(task))
}

/// Retrieves a specific task by its id.
///
/// Any authenticated user may read any task. A malformed id is
/// indistinguishable from a missing record and yields `404`.
#[get("/{id}")]
pub async fn get_task(
    service: web::Data<TaskService>,
    task_id: web::Path<String>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = service.find_by_id(&task_id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Updates a task's non-status fields. Only the creator may do this.
///
/// Absent fields are left unchanged.
///
/// ## Responses:
/// - `200 OK`: Returns the updated task.
/// - `403 Forbidden`: If the caller is not the task's creator.
/// - `404 Not Found`: If no task with the given id exists.
#[put("/{id}")]
pub async fn update_task(
    service: web::Data<TaskService>,
    task_id: web::Path<String>,
    task_data: web::Json<UpdateTaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = service.update(user.0, &task_id, &task_data).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Transitions a task's status.
///
/// Permitted for the task's creator or its current assignee. Any status value
/// is accepted in any order.
#[patch("/{id}/status")]
pub async fn update_task_status(
    service: web::Data<TaskService>,
    task_id: web::Path<String>,
    status_data: web::Json<UpdateTaskStatusInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = service
        .update_status(user.0, &task_id, status_data.status)
        .await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Assigns a task to a user. Only the creator may assign.
///
/// The target user must exist; assigning the task to the creator themself is
/// permitted.
#[put("/{id}/assign")]
pub async fn assign_task(
    service: web::Data<TaskService>,
    task_id: web::Path<String>,
    assign_data: web::Json<AssignTaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = service
        .assign(user.0, &task_id, assign_data.user_id)
        .await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task. Only the creator may delete.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `403 Forbidden`: If the caller is not the task's creator.
/// - `404 Not Found`: If no task with the given id exists.
#[delete("/{id}")]
pub async fn delete_task(
    service: web::Data<TaskService>,
    task_id: web::Path<String>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    service.remove(user.0, &task_id).await?;
    Ok(HttpResponse::NoContent().finish())
}
