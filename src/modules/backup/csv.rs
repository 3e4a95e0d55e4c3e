use chrono::SecondsFormat;
use std::fs;
use std::path::Path;

use super::BackupError;
use crate::modules::inventory::model::InventoryItem;

/// Column header the original spreadsheet export used, kept verbatim so
/// downstream sheets keep opening these files
pub const CSV_HEADER: &str = "ID,Material,Quantidade,Unidade,Categoria,Ultima Atualizacao";

/// Render the inventory as CSV. Values are comma-joined without quoting or
/// escaping, matching the legacy sheet format byte for byte; an item name
/// containing a comma will shift its row's columns.
pub fn csv_string(items: &[InventoryItem]) -> String {
    let mut out = String::from(CSV_HEADER);
    for item in items {
        out.push('\n');
        out.push_str(&format!(
            "{},{},{},{},{},{}",
            item.id,
            item.name,
            item.quantity,
            item.unit,
            item.category,
            item.last_updated.to_rfc3339_opts(SecondsFormat::Millis, true),
        ));
    }
    out
}

/// Write the CSV rendering to a file
pub fn export_csv(items: &[InventoryItem], path: impl AsRef<Path>) -> Result<(), BackupError> {
    fs::write(path, csv_string(items))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::inventory::model::{Category, InventoryItem};
    use chrono::{TimeZone, Utc};
    use tempfile::tempdir;

    fn item(name: &str) -> InventoryItem {
        InventoryItem {
            id: "aaa111bbb".to_string(),
            name: name.to_string(),
            quantity: 7,
            min_stock: 2,
            category: Category::Writing,
            unit: "un".to_string(),
            last_updated: Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_header_and_row_layout() {
        let rendered = csv_string(&[item("Stamps")]);
        let mut lines = rendered.lines();

        assert_eq!(lines.next().unwrap(), CSV_HEADER);
        assert_eq!(
            lines.next().unwrap(),
            "aaa111bbb,Stamps,7,un,Escrita,2024-07-15T12:00:00.000Z"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_empty_inventory_is_header_only() {
        assert_eq!(csv_string(&[]), CSV_HEADER);
    }

    #[test]
    fn test_commas_are_not_escaped() {
        // Known limitation carried over from the legacy format
        let rendered = csv_string(&[item("Pens, blue")]);
        let row = rendered.lines().nth(1).unwrap();
        assert_eq!(row.matches(',').count(), 6);
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("inventory.csv");

        export_csv(&[item("Stamps")], &path).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with(CSV_HEADER));
        assert!(contents.contains("Stamps"));
    }
}
