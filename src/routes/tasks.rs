use crate::{
    auth::{Authorized, ClientIp, Identity, UserOrAdmin},
    error::AppError,
    models::{AuditAction, AuditLogEntry, CreateTaskInput, Task, UpdateTaskInput},
    ownership::guard_task,
    response::{DataResponse, ListResponse, MessageResponse},
    state::AppState,
    validation::{TaskId, Validated},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};

const TASKS_COLLECTION: &str = "tasks";

/// Retrieves the tasks visible to the caller.
///
/// A regular user gets exactly the tasks they own; an admin gets every task.
/// Tasks are returned oldest first. There is no pagination or filtering.
///
/// ## Responses:
/// - `200 OK`: `{ success, count, data: Task[] }`.
/// - `401 Unauthorized`: If the request lacks a valid access token.
/// - `403 Forbidden`: If the caller's role is not `user` or `admin`.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    auth: Authorized<UserOrAdmin>,
) -> Result<impl Responder, AppError> {
    let identity = auth.into_inner();
    let owner = if identity.is_admin() {
        None
    } else {
        Some(identity.user_id)
    };

    let tasks = state.tasks.list_tasks(owner).await?;
    Ok(HttpResponse::Ok().json(ListResponse::new(tasks)))
}

/// Creates a new task owned by the caller.
///
/// The owner is always the authenticated user; any `owner` in the body is ignored.
///
/// ## Request Body:
/// - `title`: 3 to 100 characters (required).
/// - `description` (optional): a string.
///
/// ## Responses:
/// - `201 Created`: `{ success, data: Task }`.
/// - `400 Bad Request`: With every violated field rule in `errors`.
/// - `401 Unauthorized` / `403 Forbidden`: Checked before the body is looked at.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    auth: Authorized<UserOrAdmin>,
    ip: ClientIp,
    body: Validated<CreateTaskInput>,
) -> Result<impl Responder, AppError> {
    let identity = auth.into_inner();
    let task = state
        .tasks
        .insert_task(Task::new(body.into_inner(), identity.user_id))
        .await?;

    state.audit.record(
        AuditLogEntry::new(AuditAction::CreateTask, TASKS_COLLECTION)
            .actor(identity.user_id)
            .document(task.id)
            .ip_address(ip.into_inner()),
    );

    Ok(HttpResponse::Created().json(DataResponse::new(task)))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: `{ success, data: Task }`.
/// - `400 Bad Request`: If `id` is not a valid task ID.
/// - `403 Forbidden`: If the caller neither owns the task nor is an admin.
/// - `404 Not Found`: If no task has this ID.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    identity: Identity,
    task_id: TaskId,
) -> Result<impl Responder, AppError> {
    let task = guard_task(&*state.tasks, &identity, task_id.0).await?;
    Ok(HttpResponse::Ok().json(DataResponse::new(task)))
}

/// Updates the title and/or description of a task.
///
/// Absent fields keep their value. The owner cannot be changed. Path and body rules
/// are reported together, and the ownership guard runs only once they pass.
///
/// ## Responses:
/// - `200 OK`: `{ success, data: Task }` with the updated task.
/// - `400 Bad Request`: Invalid task ID or body.
/// - `403 Forbidden`: If the caller neither owns the task nor is an admin.
/// - `404 Not Found`: If the task does not exist, including when it is deleted
///   between the ownership check and the write.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    identity: Identity,
    ip: ClientIp,
    body: Validated<UpdateTaskInput>,
    path: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let TaskId(id) = TaskId::parse(&path.into_inner())?;
    guard_task(&*state.tasks, &identity, id).await?;

    let task = state
        .tasks
        .update_task(id, body.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    state.audit.record(
        AuditLogEntry::new(AuditAction::UpdateTask, TASKS_COLLECTION)
            .actor(identity.user_id)
            .document(task.id)
            .ip_address(ip.into_inner()),
    );

    Ok(HttpResponse::Ok().json(DataResponse::new(task)))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `200 OK`: `{ success, message }`.
/// - `400 Bad Request`: If `id` is not a valid task ID.
/// - `403 Forbidden`: If the caller neither owns the task nor is an admin.
/// - `404 Not Found`: If the task does not exist.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    identity: Identity,
    ip: ClientIp,
    task_id: TaskId,
) -> Result<impl Responder, AppError> {
    let task = guard_task(&*state.tasks, &identity, task_id.0).await?;

    if !state.tasks.delete_task(task.id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    state.audit.record(
        AuditLogEntry::new(AuditAction::DeleteTask, TASKS_COLLECTION)
            .actor(identity.user_id)
            .document(task.id)
            .ip_address(ip.into_inner()),
    );

    Ok(HttpResponse::Ok().json(MessageResponse::new("Task deleted successfully")))
}
