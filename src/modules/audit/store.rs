use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::modules::auth::accounts::Role;
use crate::modules::auth::session::Session;
use crate::modules::inventory::model::generate_item_id;
use crate::modules::storage::{KeyValueBackend, StoreError};
use crate::modules::utils::time;
use crate::ACTION_LOGS_KEY;

/// One audit entry: who did what, with which role, when
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ActionLogEntry {
    pub id: String,
    pub user: String,
    pub role: Role,
    pub action: String,
    pub details: String,
    pub timestamp: DateTime<Utc>,
}

/// Append-only audit log persisted under the `action_logs` key. Written as
/// a side effect of every mutating operation; `record` takes a session, so
/// nothing is logged without one.
pub struct AuditStore {
    backend: Arc<dyn KeyValueBackend>,
    entries: Vec<ActionLogEntry>,
}

impl AuditStore {
    pub fn load(backend: Arc<dyn KeyValueBackend>) -> Result<Self, StoreError> {
        let entries = match backend.read(ACTION_LOGS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::InvalidData(format!("action_logs: {}", e)))?,
            None => Vec::new(),
        };
        Ok(Self { backend, entries })
    }

    pub fn refresh(&mut self) -> Result<(), StoreError> {
        match self.backend.read(ACTION_LOGS_KEY)? {
            Some(raw) => {
                self.entries = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::InvalidData(format!("action_logs: {}", e)))?;
            }
            None => self.entries.clear(),
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(&self.entries)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        self.backend.write(ACTION_LOGS_KEY, &data)?;
        Ok(())
    }

    pub fn entries(&self) -> &[ActionLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry attributed to the active session
    pub fn record(
        &mut self,
        session: &Session,
        action: &str,
        details: &str,
    ) -> Result<(), StoreError> {
        self.entries.push(ActionLogEntry {
            id: generate_item_id(),
            user: session.username.clone(),
            role: session.role,
            action: action.to_string(),
            details: details.to_string(),
            timestamp: time::now(),
        });
        self.persist()
    }
}
