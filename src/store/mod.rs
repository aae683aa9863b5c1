//! Storage seams.
//!
//! Handlers only ever talk to the three traits below. [`memory::MemoryStore`] backs
//! single-instance runs and tests; [`postgres::PgStore`] is the production backend.
//! Each method is a single atomic operation; nothing here spans a transaction.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AuditLogEntry, NewUser, Task, UpdateTaskInput, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint was violated.
    #[error("{0}")]
    Conflict(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        StoreError::Backend(error.to_string())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(error: sqlx::migrate::MigrateError) -> Self {
        StoreError::Backend(format!("migration failed: {}", error))
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Inserts a user. Fails with [`StoreError::Conflict`] if the email is taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn count_users(&self) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, task: Task) -> Result<Task, StoreError>;
    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError>;
    /// Lists tasks oldest first; `owner = None` lists every task.
    async fn list_tasks(&self, owner: Option<Uuid>) -> Result<Vec<Task>, StoreError>;
    /// Returns `None` if the task no longer exists.
    async fn update_task(
        &self,
        id: Uuid,
        changes: UpdateTaskInput,
    ) -> Result<Option<Task>, StoreError>;
    /// Returns `false` if the task no longer exists.
    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append_audit(&self, entry: AuditLogEntry) -> Result<(), StoreError>;
    async fn list_audit(&self) -> Result<Vec<AuditLogEntry>, StoreError>;
}
