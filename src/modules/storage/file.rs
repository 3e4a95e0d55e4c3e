use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::backend::{ChangeListener, KeyValueBackend};

/// Durable backend keeping one `<key>.json` file per storage key
pub struct FileBackend {
    dir: PathBuf,
    listeners: Mutex<Vec<ChangeListener>>,
}

impl FileBackend {
    pub fn new(dir: impl AsRef<Path>) -> io::Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            listeners: Mutex::new(Vec::new()),
        })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }

    fn notify(&self, key: &str) {
        if let Ok(listeners) = self.listeners.lock() {
            for listener in listeners.iter() {
                listener(key);
            }
        }
    }
}

impl KeyValueBackend for FileBackend {
    fn read(&self, key: &str) -> io::Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, key: &str, value: &str) -> io::Result<()> {
        fs::write(self.path_for(key), value)?;
        self.notify(key);
        Ok(())
    }

    fn remove(&self, key: &str) -> io::Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => {
                self.notify(key);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn subscribe(&self, listener: ChangeListener) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push(listener);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_read_missing_key() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).unwrap();
        assert!(backend.read("inventory").unwrap().is_none());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).unwrap();

        backend.write("inventory", "[1,2,3]").unwrap();
        assert_eq!(backend.read("inventory").unwrap().unwrap(), "[1,2,3]");

        // Overwrite replaces the previous value
        backend.write("inventory", "[]").unwrap();
        assert_eq!(backend.read("inventory").unwrap().unwrap(), "[]");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).unwrap();

        backend.write("session", "{}").unwrap();
        backend.remove("session").unwrap();
        assert!(backend.read("session").unwrap().is_none());

        // Removing again is not an error
        backend.remove("session").unwrap();
    }

    #[test]
    fn test_change_notifications() {
        let dir = tempdir().unwrap();
        let backend = FileBackend::new(dir.path()).unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&hits);
        backend.subscribe(Box::new(move |key| {
            if key == "inventory" {
                seen.fetch_add(1, Ordering::SeqCst);
            }
        }));

        backend.write("inventory", "[]").unwrap();
        backend.write("accounts", "{}").unwrap();
        backend.write("inventory", "[1]").unwrap();

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}
