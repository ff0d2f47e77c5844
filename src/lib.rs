//! Small-business ledger library
//! # Overview
//!
//! This library keeps the payment records of a small business and derives
//! balances and settlement statuses from them, alongside the customer,
//! product, bill, order and purchase records they refer to. Everything is
//! persisted as JSON documents through a pluggable storage adapter.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (Payment, Bill, LedgerSummary, etc.)
//! - [`storage`] - Storage adapters (in-memory, file-backed)
//! - [`core`] - Business logic components:
//!   - [`core::payment_store`] - Payment record store
//!   - [`core::ledger`] - Balance and status calculator
//!   - [`core::engine`] - Store coordination, invoices and audit trail
//!   - [`core::backup`] - Periodic snapshots with a re-entrancy guard
//! - [`io`] - Full-state export/import and CSV export
//! - [`config`] - Presentation defaults and backup schedule
//! - [`cli`] - CLI arguments and command dispatch
//!
//! # Balances
//!
//! For any related entity:
//! - `balance = total_incoming - total_outgoing`
//!
//! For a bill or order:
//! - `remaining = total - net_paid - discount`
//! - `remaining <= 0` is **paid**, `0 < remaining < total` is **partial**,
//!   anything else is **unpaid**

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod logging;
pub mod storage;
pub mod types;

pub use config::Settings;
pub use self::core::{BackupService, LedgerEngine, PaymentStore};
pub use storage::{FileStorage, MemoryStorage, StorageAdapter};
pub use types::{
    LedgerError, LedgerSummary, NewPayment, Payment, PaymentDirection, PaymentMethod,
    PaymentStatus, PaymentUpdate, RecordId, RelatedType,
};
