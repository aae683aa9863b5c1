//! Data-dependent access control for tasks.
//!
//! [`guard_task`] loads the task and decides access; the loaded task is returned so
//! the handler does not look it up again. The read and the handler's later write are
//! not transactional: a task deleted in between surfaces as a 404 from the write.

use uuid::Uuid;

use crate::auth::Identity;
use crate::error::AppError;
use crate::models::Task;
use crate::store::TaskStore;

/// Owner or admin may proceed.
pub fn check_ownership(task: &Task, identity: &Identity) -> Result<(), AppError> {
    if task.is_owned_by(identity.user_id) || identity.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Forbidden: not allowed to access this task".into(),
        ))
    }
}

pub async fn guard_task(
    store: &dyn TaskStore,
    identity: &Identity,
    id: Uuid,
) -> Result<Task, AppError> {
    let task = store
        .find_task(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    check_ownership(&task, identity)?;
    Ok(task)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreateTaskInput, Role};
    use crate::store::MemoryStore;

    fn identity(user_id: Uuid, role: Role) -> Identity {
        Identity { user_id, role }
    }

    async fn seeded() -> (MemoryStore, Task) {
        let store = MemoryStore::new();
        let task = store
            .insert_task(Task::new(
                CreateTaskInput {
                    title: "Guarded".to_string(),
                    description: None,
                },
                Uuid::new_v4(),
            ))
            .await
            .unwrap();
        (store, task)
    }

    #[actix_rt::test]
    async fn test_owner_gets_the_loaded_task() {
        let (store, task) = seeded().await;
        let loaded = guard_task(&store, &identity(task.owner, Role::User), task.id)
            .await
            .unwrap();
        assert_eq!(loaded, task);
    }

    #[actix_rt::test]
    async fn test_admin_overrides_ownership() {
        let (store, task) = seeded().await;
        let admin = identity(Uuid::new_v4(), Role::Admin);
        assert!(guard_task(&store, &admin, task.id).await.is_ok());
    }

    #[actix_rt::test]
    async fn test_stranger_is_forbidden() {
        let (store, task) = seeded().await;
        let stranger = identity(Uuid::new_v4(), Role::User);
        assert!(matches!(
            guard_task(&store, &stranger, task.id).await,
            Err(AppError::Forbidden(_))
        ));
    }

    #[actix_rt::test]
    async fn test_missing_task_is_not_found_even_for_admin() {
        let (store, _) = seeded().await;
        let admin = identity(Uuid::new_v4(), Role::Admin);
        assert!(matches!(
            guard_task(&store, &admin, Uuid::new_v4()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
