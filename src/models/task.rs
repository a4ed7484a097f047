use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed and under review.
    Review,
    /// Task is completed.
    Done,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut error = ValidationError::new("blank");
        error.message = Some("must not be blank".into());
        return Err(error);
    }
    Ok(())
}

/// Payload for `POST /api/tasks`.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct NewTaskRequest {
    /// Must be between 1 and 200 characters and not only whitespace.
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    pub title: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// Defaults to `todo` when omitted.
    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,
}

/// Payload for `PUT /api/tasks/{id}`. Omitted fields keep their value.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(min = 1, max = 200), custom = "not_blank")]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    pub due_date: Option<DateTime<Utc>>,
}

impl UpdateTaskRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Query parameters accepted by `GET /api/tasks`.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct TaskQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
}

impl Task {
    /// Creates a new `Task` owned by `user_id`, with a fresh UUID and both
    /// timestamps set to now.
    pub fn new(input: NewTaskRequest, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: input.title.trim().to_string(),
            description: input.description,
            status: input.status.unwrap_or_default(),
            priority: input.priority,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update in place and bumps `updated_at`.
    pub fn apply(&mut self, changes: &UpdateTaskRequest) {
        if let Some(title) = &changes.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &changes.description {
            self.description = Some(description.clone());
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(priority) = changes.priority {
            self.priority = Some(priority);
        }
        if let Some(due_date) = changes.due_date {
            self.due_date = Some(due_date);
        }
        self.updated_at = Utc::now();
    }

    pub fn is_owned_by(&self, user_id: i32) -> bool {
        self.user_id == user_id
    }

    /// Matches the filters of `GET /api/tasks`; ownership is checked separately.
    pub fn matches(&self, query: &TaskQuery) -> bool {
        if query.status.is_some_and(|status| status != self.status) {
            return false;
        }
        if query.priority.is_some() && query.priority != self.priority {
            return false;
        }
        match query.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let term = term.to_lowercase();
                self.title.to_lowercase().contains(&term)
                    || self
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(title: &str) -> NewTaskRequest {
        NewTaskRequest {
            title: title.to_string(),
            description: Some("Test Description".to_string()),
            status: None,
            priority: Some(TaskPriority::High),
            due_date: None,
        }
    }

    #[test]
    fn test_task_creation_defaults_to_todo() {
        let task = Task::new(input("Test Task"), 1);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.user_id, 1);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_task_validation() {
        assert!(input("Valid Task").validate().is_ok());
        assert!(input("").validate().is_err());
        assert!(input("   ").validate().is_err());
        assert!(input(&"a".repeat(201)).validate().is_err());

        let mut long_description = input("Valid title");
        long_description.description = Some("b".repeat(1001));
        assert!(long_description.validate().is_err());
    }

    #[test]
    fn test_update_validation() {
        assert!(UpdateTaskRequest::default().validate().is_ok());
        assert!(UpdateTaskRequest::default().is_empty());

        let blank_title = UpdateTaskRequest {
            title: Some(" ".into()),
            ..Default::default()
        };
        assert!(blank_title.validate().is_err());
    }

    #[test]
    fn test_apply_partial_update() {
        let mut task = Task::new(input("Original"), 1);
        let created_at = task.created_at;

        task.apply(&UpdateTaskRequest {
            status: Some(TaskStatus::Done),
            ..Default::default()
        });

        assert_eq!(task.title, "Original");
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.priority, Some(TaskPriority::High));
        assert_eq!(task.created_at, created_at);
        assert!(task.updated_at >= created_at);
    }

    #[test]
    fn test_query_matching() {
        let task = Task::new(input("Write Report"), 1);

        assert!(task.matches(&TaskQuery::default()));
        assert!(task.matches(&TaskQuery {
            search: Some("report".into()),
            ..Default::default()
        }));
        assert!(task.matches(&TaskQuery {
            search: Some("DESCRIPTION".into()),
            ..Default::default()
        }));
        assert!(!task.matches(&TaskQuery {
            status: Some(TaskStatus::Done),
            ..Default::default()
        }));
        assert!(!task.matches(&TaskQuery {
            priority: Some(TaskPriority::Low),
            ..Default::default()
        }));
        for wildcard in ["_", "%"] {
            assert!(!task.matches(&TaskQuery {
                search: Some(wildcard.into()),
                ..Default::default()
            }));
        }
    }

    #[test]
    fn test_status_wire_format() {
        assert_eq!(
            serde_json::to_value(TaskStatus::InProgress).unwrap(),
            serde_json::json!("in_progress")
        );
        assert_eq!(
            serde_json::from_value::<TaskPriority>(serde_json::json!("urgent")).unwrap(),
            TaskPriority::Urgent
        );
    }
}
