use std::sync::Arc;

use super::model::{generate_item_id, InventoryItem, ItemUpdate};
use crate::modules::storage::{KeyValueBackend, StoreError};
use crate::modules::utils::time;
use crate::INVENTORY_KEY;

/// Inventory repository persisted under the `inventory` storage key.
/// Newest items sit at the head of the list, as the original sheet did.
pub struct InventoryStore {
    backend: Arc<dyn KeyValueBackend>,
    items: Vec<InventoryItem>,
}

impl InventoryStore {
    pub fn load(backend: Arc<dyn KeyValueBackend>) -> Result<Self, StoreError> {
        let items = match backend.read(INVENTORY_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::InvalidData(format!("inventory: {}", e)))?,
            None => Vec::new(),
        };
        Ok(Self { backend, items })
    }

    /// Re-read the backing key, discarding in-memory state. Idempotent;
    /// last refresh wins.
    pub fn refresh(&mut self) -> Result<(), StoreError> {
        match self.backend.read(INVENTORY_KEY)? {
            Some(raw) => {
                self.items = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::InvalidData(format!("inventory: {}", e)))?;
            }
            None => self.items.clear(),
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(&self.items)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        self.backend.write(INVENTORY_KEY, &data)?;
        Ok(())
    }

    pub fn items(&self) -> &[InventoryItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&InventoryItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Items at or below their minimum-stock threshold
    pub fn low_stock(&self) -> Vec<&InventoryItem> {
        self.items.iter().filter(|item| item.is_low_stock()).collect()
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = generate_item_id();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    /// Insert a default-valued item at the head of the list
    pub fn add_default(&mut self) -> Result<InventoryItem, StoreError> {
        let item = InventoryItem::new_default(self.fresh_id());
        self.items.insert(0, item.clone());
        self.persist()?;
        Ok(item)
    }

    /// Merge partial field edits into the matching item, re-stamping
    /// `last_updated`. Returns a human-readable description of each change
    /// for the audit log.
    pub fn update(&mut self, id: &str, updates: &ItemUpdate) -> Result<Vec<String>, StoreError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("item {}", id)))?;

        let mut changes = Vec::new();
        if let Some(name) = &updates.name {
            if *name != item.name {
                changes.push(format!("name: '{}' -> '{}'", item.name, name));
                item.name = name.clone();
            }
        }
        if let Some(quantity) = updates.quantity {
            if quantity != item.quantity {
                changes.push(format!("quantity: {} -> {}", item.quantity, quantity));
                item.quantity = quantity;
            }
        }
        if let Some(min_stock) = updates.min_stock {
            if min_stock != item.min_stock {
                changes.push(format!("min_stock: {} -> {}", item.min_stock, min_stock));
                item.min_stock = min_stock;
            }
        }
        if let Some(category) = updates.category {
            if category != item.category {
                changes.push(format!("category: {} -> {}", item.category, category));
                item.category = category;
            }
        }
        if let Some(unit) = &updates.unit {
            if *unit != item.unit {
                changes.push(format!("unit: '{}' -> '{}'", item.unit, unit));
                item.unit = unit.clone();
            }
        }

        if !changes.is_empty() {
            item.last_updated = time::now();
            self.persist()?;
        }
        Ok(changes)
    }

    /// Remove the matching item. The interactive confirmation happens at the
    /// UI layer, before this is called.
    pub fn delete(&mut self, id: &str) -> Result<InventoryItem, StoreError> {
        let index = self
            .items
            .iter()
            .position(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("item {}", id)))?;
        let removed = self.items.remove(index);
        self.persist()?;
        Ok(removed)
    }

    /// Decrement an item's quantity, clamped at zero, re-stamping
    /// `last_updated`. Used by the withdrawal transaction.
    pub(crate) fn decrement_quantity(&mut self, id: &str, by: u32) -> Result<u32, StoreError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("item {}", id)))?;
        item.quantity = item.quantity.saturating_sub(by);
        item.last_updated = time::now();
        let remaining = item.quantity;
        self.persist()?;
        Ok(remaining)
    }

    /// Replace the whole store with imported items, assigning fresh ids
    pub fn import(&mut self, items: Vec<InventoryItem>) -> Result<usize, StoreError> {
        let mut imported = Vec::with_capacity(items.len());
        for mut item in items {
            item.id = loop {
                let id = generate_item_id();
                if !imported.iter().any(|i: &InventoryItem| i.id == id) {
                    break id;
                }
            };
            imported.push(item);
        }
        let count = imported.len();
        self.items = imported;
        self.persist()?;
        Ok(count)
    }
}
