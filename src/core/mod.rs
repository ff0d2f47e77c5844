//! Core business logic module
//!
//! This module contains the ledger components:
//! - `traits` - The `Record` abstraction shared by every stored type
//! - `collection` - Generic persisted, ordered record list
//! - `payment_store` - Payment records and their queries
//! - `ledger` - Pure balance, status and statement derivations
//! - `engine` - Coordination of stores, invoices and the audit trail
//! - `backup` - Guarded periodic snapshots

pub mod backup;
pub mod collection;
pub mod engine;
pub mod ledger;
pub mod payment_store;
pub mod traits;

pub use backup::{spawn_scheduler, BackupOutcome, BackupService};
pub use collection::Collection;
pub use engine::LedgerEngine;
pub use payment_store::PaymentStore;
pub use traits::Record;
