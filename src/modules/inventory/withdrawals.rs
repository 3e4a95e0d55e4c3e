use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::model::generate_item_id;
use super::store::InventoryStore;
use crate::modules::storage::{KeyValueBackend, StoreError};
use crate::modules::utils::time;
use crate::WITHDRAWALS_KEY;

/// A recorded decrement of an item's quantity, attributed to a named person.
/// The item name is a denormalized snapshot: it survives item deletion.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WithdrawalRecord {
    pub id: String,
    pub item_id: String,
    pub item_name: String,
    pub withdrawn_by: String,
    pub quantity: u32,
    pub timestamp: DateTime<Utc>,
}

/// Errors for withdrawal registration
#[derive(Debug)]
pub enum WithdrawalError {
    ItemNotFound(String),
    ZeroQuantity,
    InsufficientStock { available: u32, requested: u32 },
    EmptyWithdrawer,
    Storage(StoreError),
}

impl From<StoreError> for WithdrawalError {
    fn from(error: StoreError) -> Self {
        WithdrawalError::Storage(error)
    }
}

impl std::fmt::Display for WithdrawalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WithdrawalError::ItemNotFound(id) => write!(f, "No item with id {}", id),
            WithdrawalError::ZeroQuantity => write!(f, "Withdrawal quantity must be positive"),
            WithdrawalError::InsufficientStock {
                available,
                requested,
            } => write!(
                f,
                "Insufficient stock: {} requested but only {} available",
                requested, available
            ),
            WithdrawalError::EmptyWithdrawer => write!(f, "Please say who is withdrawing"),
            WithdrawalError::Storage(e) => write!(f, "Storage error: {}", e),
        }
    }
}

/// Append-only withdrawal history persisted under the `withdrawals` key
pub struct WithdrawalStore {
    backend: Arc<dyn KeyValueBackend>,
    records: Vec<WithdrawalRecord>,
}

impl WithdrawalStore {
    pub fn load(backend: Arc<dyn KeyValueBackend>) -> Result<Self, StoreError> {
        let records = match backend.read(WITHDRAWALS_KEY)? {
            Some(raw) => serde_json::from_str(&raw)
                .map_err(|e| StoreError::InvalidData(format!("withdrawals: {}", e)))?,
            None => Vec::new(),
        };
        Ok(Self { backend, records })
    }

    pub fn refresh(&mut self) -> Result<(), StoreError> {
        match self.backend.read(WITHDRAWALS_KEY)? {
            Some(raw) => {
                self.records = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::InvalidData(format!("withdrawals: {}", e)))?;
            }
            None => self.records.clear(),
        }
        Ok(())
    }

    fn persist(&self) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(&self.records)
            .map_err(|e| StoreError::InvalidData(e.to_string()))?;
        self.backend.write(WITHDRAWALS_KEY, &data)?;
        Ok(())
    }

    pub fn records(&self) -> &[WithdrawalRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn append(&mut self, record: WithdrawalRecord) -> Result<(), StoreError> {
        self.records.push(record);
        self.persist()
    }
}

/// Register a withdrawal: validate, decrement the item's quantity (clamped
/// at zero), then append the record. Both stores are held exclusively for
/// the duration of the call, so decrement-and-record is one logical
/// transaction; two concurrent withdrawals of the same item cannot race.
/// The decrement persists first, so a storage failure never leaves a
/// durable record without its matching stock change.
pub fn register_withdrawal(
    items: &mut InventoryStore,
    withdrawals: &mut WithdrawalStore,
    item_id: &str,
    withdrawn_by: &str,
    quantity: u32,
) -> Result<WithdrawalRecord, WithdrawalError> {
    let item = items
        .get(item_id)
        .ok_or_else(|| WithdrawalError::ItemNotFound(item_id.to_string()))?;

    if quantity == 0 {
        return Err(WithdrawalError::ZeroQuantity);
    }
    if quantity > item.quantity {
        return Err(WithdrawalError::InsufficientStock {
            available: item.quantity,
            requested: quantity,
        });
    }
    let withdrawn_by = withdrawn_by.trim();
    if withdrawn_by.is_empty() {
        return Err(WithdrawalError::EmptyWithdrawer);
    }

    let record = WithdrawalRecord {
        id: generate_item_id(),
        item_id: item.id.clone(),
        item_name: item.name.clone(),
        withdrawn_by: withdrawn_by.to_string(),
        quantity,
        timestamp: time::now(),
    };

    items.decrement_quantity(item_id, quantity)?;
    withdrawals.append(record.clone())?;
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::inventory::model::ItemUpdate;
    use crate::modules::storage::MemoryBackend;

    fn stores_with_item(quantity: u32) -> (InventoryStore, WithdrawalStore, String) {
        let backend: Arc<MemoryBackend> = Arc::new(MemoryBackend::new());
        let mut items = InventoryStore::load(backend.clone()).unwrap();
        let withdrawals = WithdrawalStore::load(backend).unwrap();

        let item = items.add_default().unwrap();
        items
            .update(
                &item.id,
                &ItemUpdate {
                    quantity: Some(quantity),
                    ..Default::default()
                },
            )
            .unwrap();
        (items, withdrawals, item.id)
    }

    #[test]
    fn test_successful_withdrawal_decrements_and_records() {
        let (mut items, mut withdrawals, id) = stores_with_item(5);

        let record = register_withdrawal(&mut items, &mut withdrawals, &id, "ana", 3).unwrap();
        assert_eq!(record.quantity, 3);
        assert_eq!(record.withdrawn_by, "ana");
        assert_eq!(record.item_id, id);

        assert_eq!(items.get(&id).unwrap().quantity, 2);
        assert_eq!(withdrawals.len(), 1);
    }

    #[test]
    fn test_overdraw_is_rejected_with_no_side_effects() {
        let (mut items, mut withdrawals, id) = stores_with_item(5);

        let result = register_withdrawal(&mut items, &mut withdrawals, &id, "ana", 7);
        assert!(matches!(
            result,
            Err(WithdrawalError::InsufficientStock {
                available: 5,
                requested: 7
            })
        ));

        assert_eq!(items.get(&id).unwrap().quantity, 5);
        assert!(withdrawals.is_empty());
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let (mut items, mut withdrawals, id) = stores_with_item(5);
        assert!(matches!(
            register_withdrawal(&mut items, &mut withdrawals, &id, "ana", 0),
            Err(WithdrawalError::ZeroQuantity)
        ));
    }

    #[test]
    fn test_empty_withdrawer_rejected() {
        let (mut items, mut withdrawals, id) = stores_with_item(5);
        assert!(matches!(
            register_withdrawal(&mut items, &mut withdrawals, &id, "   ", 1),
            Err(WithdrawalError::EmptyWithdrawer)
        ));
        assert_eq!(items.get(&id).unwrap().quantity, 5);
    }

    #[test]
    fn test_unknown_item_rejected() {
        let (mut items, mut withdrawals, _) = stores_with_item(5);
        assert!(matches!(
            register_withdrawal(&mut items, &mut withdrawals, "missing01", "ana", 1),
            Err(WithdrawalError::ItemNotFound(_))
        ));
    }

    #[test]
    fn test_quantity_never_goes_below_zero() {
        let (mut items, mut withdrawals, id) = stores_with_item(3);

        register_withdrawal(&mut items, &mut withdrawals, &id, "ana", 3).unwrap();
        assert_eq!(items.get(&id).unwrap().quantity, 0);

        // Stock exhausted: any further request is an overdraw
        assert!(matches!(
            register_withdrawal(&mut items, &mut withdrawals, &id, "ana", 1),
            Err(WithdrawalError::InsufficientStock { .. })
        ));
        assert_eq!(items.get(&id).unwrap().quantity, 0);
    }

    #[test]
    fn test_failed_inventory_persist_leaves_no_orphan_record() {
        use crate::modules::storage::{ChangeListener, KeyValueBackend};
        use crate::{INVENTORY_KEY, WITHDRAWALS_KEY};
        use std::io;
        use std::sync::Mutex;

        // Backend whose writes to one key can be made to fail
        #[derive(Default)]
        struct FlakyBackend {
            inner: MemoryBackend,
            failing_key: Mutex<Option<String>>,
        }

        impl FlakyBackend {
            fn fail_writes_to(&self, key: &str) {
                if let Ok(mut failing) = self.failing_key.lock() {
                    *failing = Some(key.to_string());
                }
            }
        }

        impl KeyValueBackend for FlakyBackend {
            fn read(&self, key: &str) -> io::Result<Option<String>> {
                self.inner.read(key)
            }

            fn write(&self, key: &str, value: &str) -> io::Result<()> {
                if let Ok(failing) = self.failing_key.lock() {
                    if failing.as_deref() == Some(key) {
                        return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
                    }
                }
                self.inner.write(key, value)
            }

            fn remove(&self, key: &str) -> io::Result<()> {
                self.inner.remove(key)
            }

            fn subscribe(&self, listener: ChangeListener) {
                self.inner.subscribe(listener)
            }
        }

        let backend = Arc::new(FlakyBackend::default());
        let mut items = InventoryStore::load(backend.clone()).unwrap();
        let mut withdrawals = WithdrawalStore::load(backend.clone()).unwrap();

        let item = items.add_default().unwrap();
        items
            .update(
                &item.id,
                &ItemUpdate {
                    quantity: Some(5),
                    ..Default::default()
                },
            )
            .unwrap();

        backend.fail_writes_to(INVENTORY_KEY);
        let result = register_withdrawal(&mut items, &mut withdrawals, &item.id, "ana", 2);
        assert!(matches!(result, Err(WithdrawalError::Storage(_))));

        // The durable pair stays consistent: no withdrawal record was
        // written, and the stored quantity is untouched
        assert!(backend.read(WITHDRAWALS_KEY).unwrap().is_none());
        let stored: Vec<crate::modules::inventory::model::InventoryItem> =
            serde_json::from_str(&backend.read(INVENTORY_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(stored[0].quantity, 5);
    }

    #[test]
    fn test_record_snapshot_survives_item_deletion() {
        let (mut items, mut withdrawals, id) = stores_with_item(5);
        items
            .update(
                &id,
                &ItemUpdate {
                    name: Some("Staplers".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        register_withdrawal(&mut items, &mut withdrawals, &id, "ana", 1).unwrap();
        items.delete(&id).unwrap();

        assert_eq!(withdrawals.records()[0].item_name, "Staplers");
    }

    #[test]
    fn test_history_is_append_only_and_persists() {
        let backend: Arc<MemoryBackend> = Arc::new(MemoryBackend::new());
        let mut items = InventoryStore::load(backend.clone()).unwrap();
        let mut withdrawals = WithdrawalStore::load(backend.clone()).unwrap();

        let item = items.add_default().unwrap();
        items
            .update(
                &item.id,
                &ItemUpdate {
                    quantity: Some(10),
                    ..Default::default()
                },
            )
            .unwrap();

        register_withdrawal(&mut items, &mut withdrawals, &item.id, "ana", 2).unwrap();
        register_withdrawal(&mut items, &mut withdrawals, &item.id, "bruno", 3).unwrap();

        let reloaded = WithdrawalStore::load(backend).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.records()[0].withdrawn_by, "ana");
        assert_eq!(reloaded.records()[1].withdrawn_by, "bruno");
    }
}
