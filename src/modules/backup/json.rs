use std::fs;
use std::path::Path;

use super::BackupError;
use crate::modules::inventory::model::InventoryItem;

/// Export the inventory as a pretty-printed JSON array. The output parses
/// back with `import_json` unchanged.
pub fn export_json(items: &[InventoryItem], path: impl AsRef<Path>) -> Result<(), BackupError> {
    let data = serde_json::to_string_pretty(items)
        .map_err(|e| BackupError::InvalidJson(e.to_string()))?;
    fs::write(path, data)?;
    Ok(())
}

/// Read an inventory export back in. The file must be a JSON array; any
/// parse failure aborts before a single item is produced, so a failed
/// import never leaves a partial result.
pub fn import_json(path: impl AsRef<Path>) -> Result<Vec<InventoryItem>, BackupError> {
    let raw = fs::read_to_string(path)?;
    let value: serde_json::Value =
        serde_json::from_str(&raw).map_err(|e| BackupError::InvalidJson(e.to_string()))?;

    if !value.is_array() {
        return Err(BackupError::NotAnArray);
    }

    serde_json::from_value(value).map_err(|e| BackupError::InvalidJson(e.to_string()))
}
