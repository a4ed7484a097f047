use crate::{
    auth::{AuthMiddleware, AuthenticatedUser},
    error::AppError,
    models::{NewTaskRequest, Task, TaskQuery, UpdateTaskRequest},
    response::ApiResponse,
    store::Store,
};
use super::{into_body, JsonOrForm};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Loads a task and checks that `user` owns it.
///
/// Missing tasks are `NotFound`; tasks owned by someone else are `Forbidden`.
async fn owned_task(store: &dyn Store, id: Uuid, user: &AuthenticatedUser) -> Result<Task, AppError> {
    let task = store
        .find_task(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    if !task.is_owned_by(user.id()) {
        log::warn!("User {} attempted to access task {} owned by another user", user.id(), id);
        return Err(AppError::Forbidden(
            "You do not have permission to access this task".into(),
        ));
    }

    Ok(task)
}

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `status` (optional): `todo`, `in_progress`, `review` or `done`.
/// - `priority` (optional): `low`, `medium`, `high` or `urgent`.
/// - `search` (optional): case-insensitive match on title and description.
#[get("", wrap = "AuthMiddleware")]
pub async fn get_tasks(
    store: web::Data<dyn Store>,
    user: AuthenticatedUser,
    query: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let tasks = store.list_tasks(user.id(), &query).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(tasks)))
}

/// Creates a new task owned by the authenticated user.
///
/// `status` defaults to `todo` when omitted.
#[post("", wrap = "AuthMiddleware")]
pub async fn create_task(
    store: web::Data<dyn Store>,
    user: AuthenticatedUser,
    task_data: JsonOrForm<NewTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task_data = into_body(task_data);
    task_data.validate()?;

    let task = store
        .create_task(Task::new(task_data, user.id()))
        .await?;
    log::info!("User {} created task {}", user.id(), task.id);

    Ok(HttpResponse::Created()
        .json(ApiResponse::success(task).with_message("Task created successfully")))
}

#[get("/{id}", wrap = "AuthMiddleware")]
pub async fn get_task(
    store: web::Data<dyn Store>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(&**store, task_id.into_inner(), &user).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::success(task)))
}

/// Partially updates a task. Only the owner may update it.
#[put("/{id}", wrap = "AuthMiddleware")]
pub async fn update_task(
    store: web::Data<dyn Store>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
    task_data: JsonOrForm<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    let task_data = into_body(task_data);
    task_data.validate()?;
    if task_data.is_empty() {
        return Err(AppError::ValidationError(
            "At least one field must be provided".into(),
        ));
    }

    let task = owned_task(&**store, task_id.into_inner(), &user).await?;
    let updated = store.update_task(task.id, &task_data).await?;

    Ok(HttpResponse::Ok()
        .json(ApiResponse::success(updated).with_message("Task updated successfully")))
}

/// Deletes a task. Only the owner may delete it.
#[delete("/{id}", wrap = "AuthMiddleware")]
pub async fn delete_task(
    store: web::Data<dyn Store>,
    user: AuthenticatedUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = owned_task(&**store, task_id.into_inner(), &user).await?;

    if !store.delete_task(task.id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    log::info!("User {} deleted task {}", user.id(), task.id);

    Ok(HttpResponse::Ok().json(ApiResponse::message("Task deleted successfully")))
}

#[cfg(test)]
mod tests {
    use crate::models::{NewTaskRequest, TaskPriority, TaskStatus, UpdateTaskRequest};
    use validator::Validate;

    #[test]
    fn test_task_input_validation() {
        let invalid_input_empty_title = NewTaskRequest {
            title: "".to_string(),
            description: Some("Test Description".to_string()),
            status: Some(TaskStatus::Todo),
            priority: Some(TaskPriority::High),
            due_date: None,
        };
        assert!(
            invalid_input_empty_title.validate().is_err(),
            "Validation should fail for empty title."
        );

        let valid_input = NewTaskRequest {
            title: "Valid Title".to_string(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
        };
        assert!(
            valid_input.validate().is_ok(),
            "Validation should pass for valid input."
        );

        let invalid_update = UpdateTaskRequest {
            description: Some("b".repeat(1001)),
            ..Default::default()
        };
        assert!(
            invalid_update.validate().is_err(),
            "Validation should fail for overly long description."
        );
    }
}
