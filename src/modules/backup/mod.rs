pub mod auto;
pub mod csv;
pub mod json;

pub use auto::{run_auto_backup, BackupSnapshot};
pub use csv::{csv_string, export_csv, CSV_HEADER};
pub use json::{export_json, import_json};

use std::io;

/// Errors for export, import and auto-backup
#[derive(Debug)]
pub enum BackupError {
    /// The imported file did not contain a JSON array; nothing was written
    NotAnArray,
    InvalidJson(String),
    IoError(io::Error),
}

impl From<io::Error> for BackupError {
    fn from(error: io::Error) -> Self {
        BackupError::IoError(error)
    }
}

impl std::fmt::Display for BackupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackupError::NotAnArray => {
                write!(f, "Invalid file format: expected a JSON array of items")
            }
            BackupError::InvalidJson(msg) => write!(f, "Could not read JSON file: {}", msg),
            BackupError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}
