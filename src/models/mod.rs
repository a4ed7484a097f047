pub mod task;
pub mod user;

pub use task::{NewTaskRequest, Task, TaskPriority, TaskQuery, TaskStatus, UpdateTaskRequest};
pub use user::{NewUser, StoredUser, User};
