use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::db;
use crate::models::{NewUser, StoredUser, Task, TaskQuery, UpdateTaskRequest, User};

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, priority, due_date, created_at, updated_at";

/// Escapes `LIKE` wildcards so `search` matches as a literal substring.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `Store` backed by the process-wide Postgres pool.
pub struct PgStore {
    pool: PgPool,
    migrations_pending: AtomicBool,
}

impl PgStore {
    /// Wraps a pool whose schema is already migrated.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            migrations_pending: AtomicBool::new(false),
        }
    }

    /// Wraps a pool that could not be migrated at startup. Migrations run
    /// before the first query that reaches the database.
    pub fn with_pending_migrations(pool: PgPool) -> Self {
        Self {
            pool,
            migrations_pending: AtomicBool::new(true),
        }
    }

    pub fn migrations_pending(&self) -> bool {
        self.migrations_pending.load(Ordering::Acquire)
    }

    async fn ready(&self) -> StoreResult<&PgPool> {
        if self.migrations_pending() {
            db::run_migrations(&self.pool).await?;
            self.migrations_pending.store(false, Ordering::Release);
        }
        Ok(&self.pool)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        self.ready().await?;
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let pool = self.ready().await?;
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3)
             RETURNING id, username, email, created_at",
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(pool)
        .await
        .map_err(|e| match StoreError::from(e) {
            StoreError::Conflict(_) => {
                StoreError::Conflict("User with this email or username already exists".into())
            }
            other => other,
        })?;

        Ok(created)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let pool = self.ready().await?;
        let user = sqlx::query_as::<_, StoredUser>(
            "SELECT id, username, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    async fn list_tasks(&self, user_id: i32, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let pool = self.ready().await?;
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("SELECT ");
        builder.push(TASK_COLUMNS);
        builder.push(" FROM tasks WHERE user_id = ");
        builder.push_bind(user_id);

        if let Some(status) = query.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(priority) = query.priority {
            builder.push(" AND priority = ").push_bind(priority);
        }
        if let Some(search) = query.search.as_deref().map(str::trim) {
            if !search.is_empty() {
                let pattern = like_pattern(search);
                builder
                    .push(" AND (title ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" ESCAPE '\\' OR description ILIKE ")
                    .push_bind(pattern)
                    .push(" ESCAPE '\\')");
            }
        }

        builder.push(" ORDER BY created_at DESC");

        let tasks = builder
            .build_query_as::<Task>()
            .fetch_all(pool)
            .await?;

        Ok(tasks)
    }

    async fn create_task(&self, task: Task) -> StoreResult<Task> {
        let pool = self.ready().await?;
        let sql = format!(
            "INSERT INTO tasks (id, user_id, title, description, status, priority, due_date, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {}",
            TASK_COLUMNS
        );

        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(task.user_id)
            .bind(task.title)
            .bind(task.description)
            .bind(task.status)
            .bind(task.priority)
            .bind(task.due_date)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(pool)
            .await?;

        Ok(created)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let pool = self.ready().await?;
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);

        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(task)
    }

    async fn update_task(&self, id: Uuid, changes: &UpdateTaskRequest) -> StoreResult<Task> {
        let pool = self.ready().await?;
        let sql = format!(
            "UPDATE tasks
             SET title = COALESCE($2, title),
                 description = COALESCE($3, description),
                 status = COALESCE($4, status),
                 priority = COALESCE($5, priority),
                 due_date = COALESCE($6, due_date),
                 updated_at = NOW()
             WHERE id = $1
             RETURNING {}",
            TASK_COLUMNS
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(changes.title.as_deref().map(str::trim))
            .bind(&changes.description)
            .bind(changes.status)
            .bind(changes.priority)
            .bind(changes.due_date)
            .fetch_optional(pool)
            .await?
            .ok_or(StoreError::NotFound("Task"))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let pool = self.ready().await?;
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
