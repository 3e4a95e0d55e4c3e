use chrono::{DateTime, Utc};
use rand::distributions::Uniform;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::modules::utils::time;

/// Item categories. Serialized with the labels the original spreadsheet
/// exports use, so exported files stay readable by existing tooling.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    #[serde(rename = "Escrita")]
    Writing,
    #[serde(rename = "Grampeamento")]
    Stapling,
    #[serde(rename = "Organização")]
    Organization,
    #[serde(rename = "Papelaria")]
    Stationery,
    #[serde(rename = "Outros")]
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Writing,
        Category::Stapling,
        Category::Organization,
        Category::Stationery,
        Category::Other,
    ];

    /// The wire/display label
    pub fn label(&self) -> &'static str {
        match self {
            Category::Writing => "Escrita",
            Category::Stapling => "Grampeamento",
            Category::Organization => "Organização",
            Category::Stationery => "Papelaria",
            Category::Other => "Outros",
        }
    }

    /// Parse either the wire label or the English name, case-insensitively
    pub fn parse(input: &str) -> Option<Category> {
        match input.trim().to_lowercase().as_str() {
            "escrita" | "writing" => Some(Category::Writing),
            "grampeamento" | "stapling" => Some(Category::Stapling),
            "organização" | "organizacao" | "organization" => Some(Category::Organization),
            "papelaria" | "stationery" => Some(Category::Stationery),
            "outros" | "other" => Some(Category::Other),
            _ => None,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.label())
    }
}

/// A single catalogued material
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub min_stock: u32,
    pub category: Category,
    pub unit: String,
    pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
    /// The default-valued item inserted by "add"
    pub fn new_default(id: String) -> Self {
        Self {
            id,
            name: "New material".to_string(),
            quantity: 1,
            min_stock: 0,
            category: Category::Other,
            unit: "un".to_string(),
            last_updated: time::now(),
        }
    }

    /// An item at or below its minimum-stock threshold needs restocking
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.min_stock
    }
}

/// Partial field edits for `update_item`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub quantity: Option<u32>,
    pub min_stock: Option<u32>,
    pub category: Option<Category>,
    pub unit: Option<String>,
}

impl ItemUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.min_stock.is_none()
            && self.category.is_none()
            && self.unit.is_none()
    }
}

/// Generate an opaque 9-character base-36 item id
pub fn generate_item_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    let dist = Uniform::new(0, ALPHABET.len());
    (0..9).map(|_| ALPHABET[rng.sample(dist)] as char).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_labels_round_trip() {
        for category in Category::ALL {
            assert_eq!(Category::parse(category.label()), Some(category));
        }
        assert_eq!(Category::parse("ESCRITA"), Some(Category::Writing));
        assert_eq!(Category::parse("organizacao"), Some(Category::Organization));
        assert_eq!(Category::parse("snacks"), None);
    }

    #[test]
    fn test_category_serde_uses_wire_labels() {
        let json = serde_json::to_string(&Category::Writing).unwrap();
        assert_eq!(json, "\"Escrita\"");
        let parsed: Category = serde_json::from_str("\"Outros\"").unwrap();
        assert_eq!(parsed, Category::Other);
    }

    #[test]
    fn test_default_item() {
        let item = InventoryItem::new_default("abc123def".to_string());
        assert_eq!(item.quantity, 1);
        assert_eq!(item.min_stock, 0);
        assert_eq!(item.category, Category::Other);
        assert_eq!(item.unit, "un");
    }

    #[test]
    fn test_low_stock_threshold() {
        let mut item = InventoryItem::new_default("id0000001".to_string());
        item.quantity = 5;
        item.min_stock = 5;
        assert!(item.is_low_stock());

        item.quantity = 6;
        assert!(!item.is_low_stock());
    }

    #[test]
    fn test_item_id_shape() {
        let id = generate_item_id();
        assert_eq!(id.len(), 9);
        assert!(id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        assert_ne!(generate_item_id(), generate_item_id());
    }

    #[test]
    fn test_empty_update() {
        assert!(ItemUpdate::default().is_empty());
        let update = ItemUpdate {
            quantity: Some(3),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
