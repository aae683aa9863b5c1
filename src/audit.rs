//! Best-effort audit trail.
//!
//! Handlers finish their primary write first and then call [`AuditLogger::record`],
//! which hands the entry to a detached task and returns immediately. A failed audit
//! write is logged and dropped; it never changes the response.

use std::sync::Arc;

use crate::models::AuditLogEntry;
use crate::store::AuditStore;

#[derive(Clone)]
pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Spawns the write on the current runtime. Must be called from within one.
    pub fn record(&self, entry: AuditLogEntry) {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            let action = entry.action;
            if let Err(e) = store.append_audit(entry).await {
                log::error!("Audit log error ({:?}): {}", action, e);
            }
        });
    }

    /// Reads back the whole trail, oldest first.
    pub async fn entries(&self) -> Result<Vec<AuditLogEntry>, crate::store::StoreError> {
        self.store.list_audit().await
    }
}
