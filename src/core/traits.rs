//! Core traits for persisted records
//!
//! This module defines the abstraction that lets one generic
//! [`Collection`](crate::core::Collection) back every kind of record.

use crate::storage::keys;
use crate::types::{
    AuditEntry, Bill, CashTransaction, Customer, Order, Payment, Product, Purchase,
};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A record kept in a keyed, ordered collection
///
/// Each implementor is stored as a JSON array under [`Record::STORAGE_KEY`].
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Storage key of the collection holding this record type
    const STORAGE_KEY: &'static str;

    /// Unique identifier of this record
    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($($ty:ty => $key:expr),+ $(,)?) => {
        $(
            impl Record for $ty {
                const STORAGE_KEY: &'static str = $key;

                fn id(&self) -> &str {
                    &self.id
                }
            }
        )+
    };
}

impl_record!(
    Payment => keys::PAYMENTS,
    Customer => keys::CUSTOMERS,
    Product => keys::PRODUCTS,
    Bill => keys::BILLS,
    Order => keys::ORDERS,
    Purchase => keys::PURCHASES,
    CashTransaction => keys::TRANSACTIONS,
    AuditEntry => keys::AUDIT_LOG,
);
