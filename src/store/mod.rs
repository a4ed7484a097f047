//! Persistence port.
//!
//! Handlers never talk to the database directly; they receive a
//! `web::Data<dyn Store>` built once at startup. [`PgStore`] is the production
//! implementation over a shared `sqlx::PgPool`, [`MemoryStore`] keeps
//! everything in process memory for development without a database and for
//! tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::fmt;
use uuid::Uuid;

use crate::models::{NewUser, StoredUser, Task, TaskQuery, UpdateTaskRequest, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The named entity does not exist.
    NotFound(&'static str),
    /// A uniqueness constraint rejected the write.
    Conflict(String),
    /// Any other backend failure.
    Database(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::NotFound(what) => write!(f, "{} not found", what),
            StoreError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            StoreError::Database(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Converts `sqlx::Error` into `StoreError`.
///
/// `RowNotFound` becomes `NotFound`, unique-constraint violations become
/// `Conflict`, and everything else is a `Database` error.
impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match error {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record"),
            sqlx::Error::Database(db_error) if db_error.is_unique_violation() => {
                StoreError::Conflict(db_error.message().to_string())
            }
            other => StoreError::Database(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Everything the route handlers need from persistence.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap liveness probe used by `GET /health`.
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a user. Fails with `Conflict` if the email or username is taken.
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>>;

    /// Tasks owned by `user_id` matching `query`, newest first.
    async fn list_tasks(&self, user_id: i32, query: &TaskQuery) -> StoreResult<Vec<Task>>;

    async fn create_task(&self, task: Task) -> StoreResult<Task>;

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Applies a partial update. Fails with `NotFound` if the task vanished.
    async fn update_task(&self, id: Uuid, changes: &UpdateTaskRequest) -> StoreResult<Task>;

    /// Returns whether a row was deleted.
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;

    /// Releases the underlying connections. Called once on shutdown.
    async fn close(&self);
}
