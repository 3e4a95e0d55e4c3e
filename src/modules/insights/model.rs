use serde::{Deserialize, Serialize};

use crate::modules::inventory::model::{Category, InventoryItem};

/// Priority attached to an insight
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InsightPriority {
    Low,
    Medium,
    High,
}

/// A single textual recommendation about the inventory
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Insight {
    pub title: String,
    pub description: String,
    pub priority: InsightPriority,
}

/// The reduced item view sent to a provider: name, quantity and category
/// only, never ids or timestamps
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ItemSummary {
    pub name: String,
    pub quantity: u32,
    pub category: Category,
}

/// Reduce the full item list to provider summaries
pub fn summarize(items: &[InventoryItem]) -> Vec<ItemSummary> {
    items
        .iter()
        .map(|item| ItemSummary {
            name: item.name.clone(),
            quantity: item.quantity,
            category: item.category,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_wire_format() {
        assert_eq!(
            serde_json::to_string(&InsightPriority::High).unwrap(),
            "\"high\""
        );
        let parsed: InsightPriority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(parsed, InsightPriority::Medium);
    }

    #[test]
    fn test_summaries_strip_identifying_fields() {
        let item = InventoryItem::new_default("abc123def".to_string());
        let summaries = summarize(&[item]);

        assert_eq!(summaries.len(), 1);
        let json = serde_json::to_string(&summaries[0]).unwrap();
        assert!(!json.contains("abc123def"));
        assert!(json.contains("\"quantity\":1"));
    }
}
