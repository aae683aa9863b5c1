use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use super::{AuditStore, StoreError, TaskStore, UserStore};
use crate::models::{AuditLogEntry, NewUser, Task, UpdateTaskInput, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";
const TASK_COLUMNS: &str = "id, title, description, owner, created_at, updated_at";
const AUDIT_COLUMNS: &str =
    "id, actor, action, collection, document_id, ip_address, timestamp";

/// PostgreSQL-backed store. The schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connects and applies pending migrations.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let user = User::new(user);
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::Conflict("User already exists".into())
                }
                other => other.into(),
            })
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn count_users(&self) -> Result<u64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, task: Task) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {TASK_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.owner)
            .bind(task.created_at)
            .bind(task.updated_at)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn find_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_tasks(&self, owner: Option<Uuid>) -> Result<Vec<Task>, StoreError> {
        let tasks = match owner {
            Some(owner) => {
                let sql = format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE owner = $1 ORDER BY created_at"
                );
                sqlx::query_as::<_, Task>(&sql)
                    .bind(owner)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at");
                sqlx::query_as::<_, Task>(&sql).fetch_all(&self.pool).await?
            }
        };
        Ok(tasks)
    }

    async fn update_task(
        &self,
        id: Uuid,
        changes: UpdateTaskInput,
    ) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "UPDATE tasks \
             SET title = COALESCE($2, title), description = COALESCE($3, description), \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {TASK_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AuditStore for PgStore {
    async fn append_audit(&self, entry: AuditLogEntry) -> Result<(), StoreError> {
        let sql = format!("INSERT INTO audit_logs ({AUDIT_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7)");
        sqlx::query(&sql)
            .bind(entry.id)
            .bind(entry.actor)
            .bind(entry.action)
            .bind(&entry.collection)
            .bind(entry.document_id)
            .bind(&entry.ip_address)
            .bind(entry.timestamp)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_audit(&self) -> Result<Vec<AuditLogEntry>, StoreError> {
        let sql = format!("SELECT {AUDIT_COLUMNS} FROM audit_logs ORDER BY timestamp");
        Ok(sqlx::query_as::<_, AuditLogEntry>(&sql)
            .fetch_all(&self.pool)
            .await?)
    }
}
