//! Periodic local backups
//!
//! The `BackupService` copies the full state into the `backups` storage key,
//! keeping the newest `max_backups` copies. Runs never overlap: a run that
//! starts while another is still copying is skipped and reported as such.
//!
//! # Scheduling
//!
//! [`spawn_scheduler`] fires `run_once` on a tokio interval. Each run is
//! handed to the blocking pool and not awaited by the ticker, so a slow copy
//! makes the following tick hit the running guard instead of queueing up.

use crate::io::snapshot::StateSnapshot;
use crate::storage::{keys, read_json, write_json, StorageAdapter};
use crate::types::{LedgerError, RecordId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};
use uuid::Uuid;

/// A stored full-state copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupRecord {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub snapshot: StateSnapshot,
}

/// Listing entry for a backup, without its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupSummary {
    pub id: RecordId,
    pub created_at: DateTime<Utc>,
    pub records: usize,
}

impl From<&BackupRecord> for BackupSummary {
    fn from(record: &BackupRecord) -> Self {
        BackupSummary {
            id: record.id.clone(),
            created_at: record.created_at,
            records: record.snapshot.record_count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    Completed(BackupSummary),
    /// Another run was still in progress
    Skipped,
}

/// Clears the running flag when dropped, including on error paths
struct RunGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> RunGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunGuard { flag })
    }
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Snapshots the whole state into storage on demand
pub struct BackupService {
    storage: Arc<dyn StorageAdapter>,
    max_backups: usize,
    running: AtomicBool,
}

impl BackupService {
    /// Create a service keeping at most `max_backups` copies (minimum 1)
    pub fn new(storage: Arc<dyn StorageAdapter>, max_backups: usize) -> Self {
        BackupService {
            storage,
            max_backups: max_backups.max(1),
            running: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Take one backup unless one is already in progress
    ///
    /// # Returns
    ///
    /// * `Ok(BackupOutcome::Completed(_))` - A new backup was stored
    /// * `Ok(BackupOutcome::Skipped)` - Another run holds the guard
    /// * `Err(LedgerError)` - Reading state or writing the backup failed
    pub fn run_once(&self) -> Result<BackupOutcome, LedgerError> {
        let Some(_guard) = RunGuard::acquire(&self.running) else {
            warn!("backup already in progress, skipping");
            return Ok(BackupOutcome::Skipped);
        };

        let snapshot = StateSnapshot::capture(self.storage.as_ref())?;
        let record = BackupRecord {
            id: Uuid::new_v4().to_string(),
            created_at: snapshot.exported_at,
            snapshot,
        };
        let summary = BackupSummary::from(&record);

        let mut backups = self.load()?;
        backups.insert(0, record);
        backups.truncate(self.max_backups);
        write_json(self.storage.as_ref(), keys::BACKUPS, &backups)?;

        info!(backup_id = %summary.id, records = summary.records, "backup stored");
        Ok(BackupOutcome::Completed(summary))
    }

    /// Stored backups, newest first
    pub fn list_backups(&self) -> Result<Vec<BackupSummary>, LedgerError> {
        Ok(self.load()?.iter().map(BackupSummary::from).collect())
    }

    /// Fetch a backup by id
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no backup has that id.
    pub fn find(&self, backup_id: &str) -> Result<BackupRecord, LedgerError> {
        self.load()?
            .into_iter()
            .find(|record| record.id == backup_id)
            .ok_or_else(|| LedgerError::not_found("backup", backup_id))
    }

    fn load(&self) -> Result<Vec<BackupRecord>, LedgerError> {
        Ok(read_json(self.storage.as_ref(), keys::BACKUPS)?.unwrap_or_default())
    }
}

/// Run `service.run_once()` every `period` until the handle is aborted
///
/// The first backup is taken one full period after the call.
pub fn spawn_scheduler(service: Arc<BackupService>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // interval() completes its first tick immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let service = Arc::clone(&service);
            tokio::task::spawn_blocking(move || {
                if let Err(e) = service.run_once() {
                    error!(error = %e, "scheduled backup failed");
                }
            });
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::Customer;

    fn service(max_backups: usize) -> (Arc<MemoryStorage>, BackupService) {
        let storage = Arc::new(MemoryStorage::new());
        let shared: Arc<dyn StorageAdapter> = storage.clone();
        (storage, BackupService::new(shared, max_backups))
    }

    fn add_customer(storage: &MemoryStorage, id: &str) {
        let mut customers: Vec<Customer> =
            read_json(storage, keys::CUSTOMERS).unwrap().unwrap_or_default();
        customers.insert(
            0,
            Customer {
                id: id.to_string(),
                name: id.to_uppercase(),
                phone: None,
                email: None,
                address: None,
                created_at: Utc::now(),
            },
        );
        write_json(storage, keys::CUSTOMERS, &customers).unwrap();
    }

    #[test]
    fn test_run_once_stores_snapshot() {
        let (storage, service) = service(3);
        add_customer(&storage, "c1");

        let outcome = service.run_once().unwrap();

        let BackupOutcome::Completed(summary) = outcome else {
            panic!("expected a completed backup");
        };
        assert_eq!(summary.records, 1);
        let record = service.find(&summary.id).unwrap();
        assert_eq!(record.snapshot.customers[0].id, "c1");
        assert!(!service.is_running());
    }

    #[test]
    fn test_retains_newest_backups_only() {
        let (storage, service) = service(2);
        let mut ids = Vec::new();
        for i in 0..3 {
            add_customer(&storage, &format!("c{}", i));
            if let BackupOutcome::Completed(summary) = service.run_once().unwrap() {
                ids.push(summary.id);
            }
        }

        let listed: Vec<String> = service
            .list_backups()
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(listed, vec![ids[2].clone(), ids[1].clone()]);
        assert!(matches!(
            service.find(&ids[0]),
            Err(LedgerError::NotFound { .. })
        ));
    }

    #[test]
    fn test_overlapping_run_is_skipped() {
        let (_storage, service) = service(3);

        let held = RunGuard::acquire(&service.running).unwrap();
        assert!(service.is_running());
        assert_eq!(service.run_once().unwrap(), BackupOutcome::Skipped);
        assert!(service.list_backups().unwrap().is_empty());

        drop(held);
        assert!(matches!(
            service.run_once().unwrap(),
            BackupOutcome::Completed(_)
        ));
    }

    #[test]
    fn test_guard_released_after_failure() {
        let (storage, service) = service(3);
        storage.set(keys::CUSTOMERS, "not json").unwrap();

        assert!(service.run_once().is_err());
        assert!(!service.is_running());
    }

    #[test]
    fn test_zero_max_backups_keeps_one() {
        let (_storage, service) = service(0);
        service.run_once().unwrap();
        service.run_once().unwrap();
        assert_eq!(service.list_backups().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_scheduler_takes_periodic_backups() {
        let (_storage, service) = service(10);
        let service = Arc::new(service);

        let handle = spawn_scheduler(Arc::clone(&service), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;
        handle.abort();
        // Let any in-flight blocking run finish
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(service.list_backups().unwrap().len() >= 2);
    }
}
