pub mod backend;
pub mod file;
pub mod memory;

pub use backend::{ChangeListener, KeyValueBackend, StoreError};
pub use file::FileBackend;
pub use memory::MemoryBackend;
