pub mod store;

pub use store::{ActionLogEntry, AuditStore};
