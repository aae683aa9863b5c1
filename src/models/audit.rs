use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Security-relevant action recorded in the audit log.
/// Corresponds to the `audit_action` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "audit_action", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    UserRegister,
    UserLogin,
    LoginFailed,
    CreateTask,
    UpdateTask,
    DeleteTask,
}

/// Append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    pub id: Uuid,
    /// Acting user. `None` for a failed login against an unknown email.
    pub actor: Option<Uuid>,
    pub action: AuditAction,
    /// Name of the collection the action targeted, e.g. `tasks` or `auth`.
    pub collection: String,
    pub document_id: Option<Uuid>,
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    pub fn new(action: AuditAction, collection: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            actor: None,
            action,
            collection: collection.to_string(),
            document_id: None,
            ip_address: None,
            timestamp: Utc::now(),
        }
    }

    pub fn actor(mut self, user_id: Uuid) -> Self {
        self.actor = Some(user_id);
        self
    }

    pub fn document(mut self, document_id: Uuid) -> Self {
        self.document_id = Some(document_id);
        self
    }

    pub fn ip_address(mut self, ip: Option<String>) -> Self {
        self.ip_address = ip;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags() {
        assert_eq!(
            serde_json::to_string(&AuditAction::LoginFailed).unwrap(),
            "\"LOGIN_FAILED\""
        );
        assert_eq!(
            serde_json::to_string(&AuditAction::CreateTask).unwrap(),
            "\"CREATE_TASK\""
        );
    }

    #[test]
    fn test_builder() {
        let user = Uuid::new_v4();
        let task = Uuid::new_v4();
        let entry = AuditLogEntry::new(AuditAction::DeleteTask, "tasks")
            .actor(user)
            .document(task)
            .ip_address(Some("10.0.0.1".to_string()));

        assert_eq!(entry.actor, Some(user));
        assert_eq!(entry.document_id, Some(task));
        assert_eq!(entry.collection, "tasks");
        assert_eq!(entry.ip_address.as_deref(), Some("10.0.0.1"));
    }
}
