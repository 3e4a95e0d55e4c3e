use std::io;

/// Custom error type for store operations
#[derive(Debug)]
pub enum StoreError {
    InvalidData(String),
    NotFound(String),
    IoError(io::Error),
}

// Implement conversion from io::Error to StoreError
impl From<io::Error> for StoreError {
    fn from(error: io::Error) -> Self {
        StoreError::IoError(error)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            StoreError::NotFound(msg) => write!(f, "Not found: {}", msg),
            StoreError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

/// Callback invoked with the key that changed
pub type ChangeListener = Box<dyn Fn(&str) + Send + Sync>;

/// Key-value persistence seam injected into every store.
///
/// `subscribe` models an external change feed: listeners fire after every
/// successful `write`, and a store reacts by calling its own `refresh()`.
/// Last refresh wins; no further ordering is guaranteed.
pub trait KeyValueBackend {
    /// Read the value stored under `key`, if any
    fn read(&self, key: &str) -> io::Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn write(&self, key: &str, value: &str) -> io::Result<()>;

    /// Remove the value stored under `key`, if any
    fn remove(&self, key: &str) -> io::Result<()>;

    /// Register a listener for change notifications
    fn subscribe(&self, listener: ChangeListener);
}
