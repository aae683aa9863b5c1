use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::{AuditStore, StoreError, TaskStore, UserStore};
use crate::models::{AuditLogEntry, NewUser, Task, UpdateTaskInput, User};

/// Process-local store. Vectors keep insertion order so listings are stable.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    tasks: RwLock<Vec<Task>>,
    audit: RwLock<Vec<AuditLogEntry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>, StoreError> {
    lock.read()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>, StoreError> {
    lock.write()
        .map_err(|_| StoreError::Backend("memory store lock poisoned".into()))
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = write(&self.users)?;
        if users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("User already exists".into()));
        }
        let user = User::new(user);
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(read(&self.users)?.iter().find(|u| u.email == email).cloned())
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(read(&self.users)?.len() as u64)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, task: Task) -> Result<Task, StoreError> {
        write(&self.tasks)?.push(task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        Ok(read(&self.tasks)?.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, owner: Option<Uuid>) -> Result<Vec<Task>, StoreError> {
        Ok(read(&self.tasks)?
            .iter()
            .filter(|t| owner.map_or(true, |owner| t.owner == owner))
            .cloned()
            .collect())
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: UpdateTaskInput,
    ) -> Result<Option<Task>, StoreError> {
        let mut tasks = write(&self.tasks)?;
        Ok(tasks.iter_mut().find(|t| t.id == id).map(|task| {
            task.apply(changes);
            task.clone()
        }))
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tasks = write(&self.tasks)?;
        let before = tasks.len();
        tasks.retain(|t| t.id != id);
        Ok(tasks.len() != before)
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_audit(&self, entry: AuditLogEntry) -> Result<(), StoreError> {
        write(&self.audit)?.push(entry);
        Ok(())
    }

    async fn list_audit(&self) -> Result<Vec<AuditLogEntry>, StoreError> {
        Ok(read(&self.audit)?.clone())
    }
}
