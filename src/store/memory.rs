//! In-memory `Store`.
//!
//! Enforces the same constraints as the SQL schema (unique email and
//! username, newest-first listing) so handlers behave identically on both
//! backends. Contents are lost when the process exits.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, StoreResult};
use crate::models::{NewUser, StoredUser, Task, TaskQuery, UpdateTaskRequest, User};

#[derive(Default)]
struct Tables {
    next_user_id: i32,
    users: Vec<StoredUser>,
    tasks: HashMap<Uuid, Task>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        let taken = tables.users.iter().any(|existing| {
            existing.email.eq_ignore_ascii_case(&user.email) || existing.username == user.username
        });
        if taken {
            return Err(StoreError::Conflict(
                "User with this email or username already exists".into(),
            ));
        }

        tables.next_user_id += 1;
        let stored = StoredUser {
            id: tables.next_user_id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.push(stored.clone());

        Ok(stored.into_user())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<StoredUser>> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn list_tasks(&self, user_id: i32, query: &TaskQuery) -> StoreResult<Vec<Task>> {
        let tables = self.tables.read().await;
        let mut tasks: Vec<Task> = tables
            .tasks
            .values()
            .filter(|task| task.is_owned_by(user_id) && task.matches(query))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    async fn create_task(&self, task: Task) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|user| user.id == task.user_id) {
            return Err(StoreError::Database(format!(
                "task owner {} does not exist",
                task.user_id
            )));
        }
        tables.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn update_task(&self, id: Uuid, changes: &UpdateTaskRequest) -> StoreResult<Task> {
        let mut tables = self.tables.write().await;
        let task = tables
            .tasks
            .get_mut(&id)
            .ok_or(StoreError::NotFound("Task"))?;
        task.apply(changes);
        Ok(task.clone())
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }

    async fn close(&self) {}
}
