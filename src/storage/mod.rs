//! Storage adapters
//!
//! Every collection is persisted as one textual JSON document under its own
//! key. Stores never talk to a concrete backend; they receive an
//! `Arc<dyn StorageAdapter>` at construction.
//!
//! # Components
//!
//! - `memory` - Concurrent in-memory key-value map
//! - `file` - One `<key>.json` file per key in a data directory

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::types::LedgerError;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Well-known storage keys
pub mod keys {
    pub const CUSTOMERS: &str = "customers";
    pub const PRODUCTS: &str = "products";
    pub const BILLS: &str = "bills";
    pub const INVOICE_COUNTER: &str = "invoice_counter";
    pub const ORDERS: &str = "orders";
    pub const PURCHASES: &str = "purchases";
    pub const TRANSACTIONS: &str = "transactions";
    pub const PAYMENTS: &str = "payments";
    pub const COMPANY_INFO: &str = "company_info";
    pub const AUDIT_LOG: &str = "audit_log";
    pub const SETTINGS: &str = "settings";
    pub const BACKUPS: &str = "backups";
}

/// Key-value persistence used by all stores
///
/// Values are whole documents: a collection is read wholesale and rewritten
/// wholesale on each mutation. Implementations must be shareable across
/// threads so the backup scheduler can read while the CLI writes.
pub trait StorageAdapter: Send + Sync {
    /// Read the document stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>, LedgerError>;

    /// Replace the document stored under `key`
    fn set(&self, key: &str, value: &str) -> Result<(), LedgerError>;

    /// Delete `key`; missing keys are not an error
    fn remove(&self, key: &str) -> Result<(), LedgerError>;
}

/// Read and deserialize the JSON document under `key`
pub fn read_json<T: DeserializeOwned>(
    storage: &dyn StorageAdapter,
    key: &str,
) -> Result<Option<T>, LedgerError> {
    match storage.get(key)? {
        Some(text) => serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| LedgerError::storage(key, format!("corrupt document: {}", e))),
        None => Ok(None),
    }
}

/// Serialize `value` and store it under `key`
pub fn write_json<T: Serialize + ?Sized>(
    storage: &dyn StorageAdapter,
    key: &str,
    value: &T,
) -> Result<(), LedgerError> {
    let text = serde_json::to_string_pretty(value)?;
    storage.set(key, &text)
}
