//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `payment`: Payment records and their classification enums
//! - `summary`: Derived balances, statuses and statement rows
//! - `entities`: Customers, products, bills and the other CRUD records
//! - `error`: Error types for the ledger

pub mod entities;
pub mod error;
pub mod payment;
pub mod summary;

pub use entities::{
    items_subtotal, AuditAction, AuditEntry, Bill, CashFlow, CashTransaction, CompanyInfo,
    Customer, LineItem, NewBill, Order, OrderStatus, Product, Purchase,
};
pub use error::LedgerError;
pub use payment::{
    NewPayment, Payment, PaymentDirection, PaymentMethod, PaymentUpdate, RecordId, RelatedType,
};
pub use summary::{DashboardStats, EntityBalance, LedgerLine, LedgerSummary, PaymentStatus};
