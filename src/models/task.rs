use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Input structure for creating a task.
/// Validation rules live in `validation::CREATE_TASK_RULES`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateTaskInput {
    /// The title of the task, 3 to 100 characters.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
}

/// Input structure for updating a task. Absent fields are left unchanged.
///
/// Has no `owner` field; unknown keys are dropped by serde so a task can never
/// be reassigned.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// Identifier of the user who created the task. Fixed at creation.
    pub owner: Uuid,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Creates a new `Task` owned by `owner`, with fresh id and timestamps.
    pub fn new(input: CreateTaskInput, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            owner,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies the present fields of `changes` and bumps `updated_at`.
    pub fn apply(&mut self, changes: UpdateTaskInput) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        self.updated_at = Utc::now();
    }

    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owner == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_creation() {
        let owner = Uuid::new_v4();
        let input = CreateTaskInput {
            title: "Test Task".to_string(),
            description: Some("Test Description".to_string()),
        };

        let task = Task::new(input, owner);
        assert_eq!(task.title, "Test Task");
        assert_eq!(task.owner, owner);
        assert!(task.is_owned_by(owner));
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn test_apply_keeps_owner_and_absent_fields() {
        let owner = Uuid::new_v4();
        let mut task = Task::new(
            CreateTaskInput {
                title: "Original".to_string(),
                description: Some("keep me".to_string()),
            },
            owner,
        );

        let changes: UpdateTaskInput =
            serde_json::from_value(serde_json::json!({ "title": "Renamed", "owner": Uuid::new_v4() }))
                .unwrap();
        task.apply(changes);

        assert_eq!(task.title, "Renamed");
        assert_eq!(task.description.as_deref(), Some("keep me"));
        assert_eq!(task.owner, owner);
        assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn test_task_serializes_camel_case() {
        let task = Task::new(
            CreateTaskInput {
                title: "Buy milk".to_string(),
                description: None,
            },
            Uuid::new_v4(),
        );
        let json = serde_json::to_value(&task).unwrap();
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert_eq!(json["owner"], task.owner.to_string());
    }
}
