use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use super::backend::{ChangeListener, KeyValueBackend};

/// In-process backend used for session-scoped state and tests.
/// Contents vanish when the process exits, which is exactly the session
/// lifetime contract.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn notify(&self, key: &str) {
        if let Ok(listeners) = self.listeners.lock() {
            for listener in listeners.iter() {
                listener(key);
            }
        }
    }
}

impl KeyValueBackend for MemoryBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "backend poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "backend poisoned"))?;
            entries.insert(key.to_string(), value.to_string());
        }
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        let removed = {
            let mut entries = self
                .entries
                .lock()
                .map_err(|_| io::Error::new(io::ErrorKind::Other, "backend poisoned"))?;
            entries.remove(key).is_some()
        };
        if removed {
            self.notify(key);
        }
        Ok(())
    }

    fn subscribe(&self, listener: ChangeListener) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(listener);
        }
    }
}
