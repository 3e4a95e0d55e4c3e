use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::BackupError;
use crate::modules::audit::store::ActionLogEntry;
use crate::modules::inventory::model::InventoryItem;
use crate::modules::inventory::withdrawals::WithdrawalRecord;
use crate::modules::storage::KeyValueBackend;
use crate::modules::utils::time;
use crate::{AUTO_BACKUP_INTERVAL_SECS, LAST_BACKUP_KEY};

/// A dated snapshot of every store, written without user action
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BackupSnapshot {
    pub created_at: DateTime<Utc>,
    pub items: Vec<InventoryItem>,
    pub withdrawals: Vec<WithdrawalRecord>,
    pub action_logs: Vec<ActionLogEntry>,
}

fn snapshot_key(timestamp: DateTime<Utc>) -> String {
    format!("auto_backup_{}", time::date_stamp(timestamp))
}

fn last_backup(backend: &dyn KeyValueBackend) -> Option<DateTime<Utc>> {
    let raw = backend.read(LAST_BACKUP_KEY).ok()??;
    serde_json::from_str(&raw).ok()
}

/// Write a dated snapshot if the last one is older than the backup
/// interval. Returns the snapshot key when one was written.
pub fn run_auto_backup(
    backend: &dyn KeyValueBackend,
    items: &[InventoryItem],
    withdrawals: &[WithdrawalRecord],
    action_logs: &[ActionLogEntry],
    now: DateTime<Utc>,
) -> Result<Option<String>, BackupError> {
    if let Some(last) = last_backup(backend) {
        if (now - last).num_seconds() < AUTO_BACKUP_INTERVAL_SECS {
            return Ok(None);
        }
    }

    let snapshot = BackupSnapshot {
        created_at: now,
        items: items.to_vec(),
        withdrawals: withdrawals.to_vec(),
        action_logs: action_logs.to_vec(),
    };
    let key = snapshot_key(now);
    let data = serde_json::to_string_pretty(&snapshot)
        .map_err(|e| BackupError::InvalidJson(e.to_string()))?;
    backend.write(&key, &data)?;

    let stamp =
        serde_json::to_string(&now).map_err(|e| BackupError::InvalidJson(e.to_string()))?;
    backend.write(LAST_BACKUP_KEY, &stamp)?;

    Ok(Some(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::storage::MemoryBackend;
    use chrono::Duration;

    #[test]
    fn test_first_run_writes_snapshot() {
        let backend = MemoryBackend::new();
        let now = time::now();

        let key = run_auto_backup(&backend, &[], &[], &[], now)
            .unwrap()
            .expect("first run should back up");
        assert_eq!(key, format!("auto_backup_{}", time::date_stamp(now)));
        assert!(backend.read(&key).unwrap().is_some());
        assert!(backend.read(LAST_BACKUP_KEY).unwrap().is_some());
    }

    #[test]
    fn test_second_run_within_interval_is_skipped() {
        let backend = MemoryBackend::new();
        let now = time::now();

        run_auto_backup(&backend, &[], &[], &[], now).unwrap();
        let again = run_auto_backup(&backend, &[], &[], &[], now + Duration::hours(1)).unwrap();
        assert!(again.is_none());
    }

    #[test]
    fn test_run_after_interval_writes_new_snapshot() {
        let backend = MemoryBackend::new();
        let now = time::now();

        run_auto_backup(&backend, &[], &[], &[], now).unwrap();
        let later = now + Duration::days(2);
        let key = run_auto_backup(&backend, &[], &[], &[], later)
            .unwrap()
            .expect("stale timestamp should trigger a backup");
        assert_eq!(key, format!("auto_backup_{}", time::date_stamp(later)));
    }

    #[test]
    fn test_snapshot_contains_all_stores() {
        let backend = MemoryBackend::new();
        let item = InventoryItem::new_default("abc123def".to_string());
        let key = run_auto_backup(&backend, &[item.clone()], &[], &[], time::now())
            .unwrap()
            .unwrap();

        let raw = backend.read(&key).unwrap().unwrap();
        let snapshot: BackupSnapshot = serde_json::from_str(&raw).unwrap();
        assert_eq!(snapshot.items, vec![item]);
        assert!(snapshot.withdrawals.is_empty());
        assert!(snapshot.action_logs.is_empty());
    }
}
