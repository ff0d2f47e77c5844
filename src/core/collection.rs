//! Generic record collection
//!
//! A `Collection` owns the in-memory list of one record type and keeps the
//! storage adapter in sync with it. The list is loaded wholesale when the
//! collection is opened and rewritten wholesale after every mutation.
//!
//! # Ordering
//!
//! New records are prepended, so iteration order is most-recent-first.
//!
//! # Unknown Ids
//!
//! `update` and `remove` on an id that is not present leave the collection
//! untouched and report `false`. They never fail for that reason.

use crate::core::traits::Record;
use crate::storage::{read_json, write_json, StorageAdapter};
use crate::types::LedgerError;
use std::sync::Arc;
use tracing::debug;

/// Persisted, ordered list of records of one type
pub struct Collection<T: Record> {
    storage: Arc<dyn StorageAdapter>,
    records: Vec<T>,
}

impl<T: Record> Collection<T> {
    /// Open the collection, loading whatever is currently persisted
    ///
    /// A missing key yields an empty collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage read fails or the stored document is
    /// not a valid list of `T`.
    pub fn open(storage: Arc<dyn StorageAdapter>) -> Result<Self, LedgerError> {
        let records = read_json::<Vec<T>>(storage.as_ref(), T::STORAGE_KEY)?.unwrap_or_default();
        debug!(key = T::STORAGE_KEY, count = records.len(), "collection loaded");
        Ok(Collection { storage, records })
    }

    /// All records, most recent first
    pub fn list(&self) -> &[T] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Prepend a record and persist
    pub fn insert(&mut self, record: T) -> Result<(), LedgerError> {
        let mut next = Vec::with_capacity(self.records.len() + 1);
        next.push(record);
        next.extend(self.records.iter().cloned());
        self.commit(next)
    }

    /// Apply `f` to the record with `id` and persist
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The record existed and was updated
    /// * `Ok(false)` - No record has that id; nothing was written
    pub fn update<F>(&mut self, id: &str, f: F) -> Result<bool, LedgerError>
    where
        F: FnOnce(&mut T),
    {
        match self.position(id) {
            Some(index) => {
                let mut next = self.records.clone();
                f(&mut next[index]);
                self.commit(next)?;
                Ok(true)
            }
            None => {
                debug!(key = T::STORAGE_KEY, id, "update ignored: unknown id");
                Ok(false)
            }
        }
    }

    /// Remove the record with `id` and persist
    ///
    /// Returns the removed record, or `None` if the id was unknown.
    pub fn remove(&mut self, id: &str) -> Result<Option<T>, LedgerError> {
        match self.position(id) {
            Some(index) => {
                let mut next = self.records.clone();
                let removed = next.remove(index);
                self.commit(next)?;
                Ok(Some(removed))
            }
            None => {
                debug!(key = T::STORAGE_KEY, id, "delete ignored: unknown id");
                Ok(None)
            }
        }
    }

    /// Replace every record, keeping the given order
    pub fn replace_all(&mut self, records: Vec<T>) -> Result<(), LedgerError> {
        self.commit(records)
    }

    /// Re-read the collection from storage
    pub fn reload(&mut self) -> Result<(), LedgerError> {
        self.records =
            read_json::<Vec<T>>(self.storage.as_ref(), T::STORAGE_KEY)?.unwrap_or_default();
        Ok(())
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|record| record.id() == id)
    }

    /// Write `records` and adopt them only once storage has accepted them
    fn commit(&mut self, records: Vec<T>) -> Result<(), LedgerError> {
        write_json(self.storage.as_ref(), T::STORAGE_KEY, &records)?;
        debug!(key = T::STORAGE_KEY, count = records.len(), "collection persisted");
        self.records = records;
        Ok(())
    }
}
