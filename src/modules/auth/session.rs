use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Arc;

use super::accounts::Role;
use crate::modules::storage::KeyValueBackend;
use crate::SESSION_KEY;

/// The one active session: who is logged in and with which role
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

/// Holds at most one session, persisted to session-scoped storage. Lifetime
/// is the storage's lifetime: logout or process exit clears it. No expiry.
pub struct SessionManager {
    backend: Arc<dyn KeyValueBackend>,
}

impl SessionManager {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// Store the session, overwriting any prior one
    pub fn start(&self, session: &Session) -> io::Result<()> {
        let data = serde_json::to_string(session)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        self.backend.write(SESSION_KEY, &data)
    }

    /// Read-only accessor; `None` routes the caller back to the login flow
    pub fn current(&self) -> Option<Session> {
        let raw = self.backend.read(SESSION_KEY).ok()??;
        serde_json::from_str(&raw).ok()
    }

    /// Clear the session; subsequent `current()` calls return `None`
    pub fn end(&self) -> io::Result<()> {
        self.backend.remove(SESSION_KEY)
    }
}
