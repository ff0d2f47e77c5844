//! Payment record store
//!
//! This module provides the PaymentStore component that keeps every recorded
//! payment, keyed by id, in most-recent-first order. It is the only place
//! payment amounts are validated: amounts must be strictly positive and
//! recorded discount/tax adjustments must not be negative.
//!
//! # Unknown Ids
//!
//! Updating or deleting an id that does not exist is silently ignored. The
//! calls return `Ok(false)` and the collection is left exactly as it was.

use crate::core::collection::Collection;
use crate::storage::StorageAdapter;
use crate::types::{
    LedgerError, NewPayment, Payment, PaymentDirection, PaymentUpdate, RecordId, RelatedType,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

/// Durable collection of payments
pub struct PaymentStore {
    payments: Collection<Payment>,
}

impl PaymentStore {
    /// Open the store on top of `storage`
    pub fn open(storage: Arc<dyn StorageAdapter>) -> Result<Self, LedgerError> {
        Ok(PaymentStore {
            payments: Collection::open(storage)?,
        })
    }

    /// Record a new payment
    ///
    /// Assigns a fresh id, prepends the payment and persists the collection.
    ///
    /// # Returns
    ///
    /// The id of the new payment
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `amount` is zero or negative
    /// - `discount` or `tax` is negative
    /// - The storage write fails
    pub fn add_payment(&mut self, data: NewPayment) -> Result<RecordId, LedgerError> {
        validate_amount(data.amount)?;
        validate_adjustments(data.discount, data.tax)?;

        let id = Uuid::new_v4().to_string();
        let payment = data.into_payment(id.clone(), Utc::now());
        debug!(
            payment_id = %id,
            amount = %payment.amount,
            direction = %payment.direction,
            related_id = %payment.related_id,
            "payment added"
        );
        self.payments.insert(payment)?;
        Ok(id)
    }

    /// Merge `update` into the payment with `id`
    ///
    /// # Returns
    ///
    /// * `Ok(true)` - The payment was found and updated
    /// * `Ok(false)` - No payment has that id; nothing changed
    ///
    /// # Errors
    ///
    /// Returns an error if the update carries a non-positive amount or a
    /// negative adjustment (checked before the lookup), or if persisting fails.
    pub fn update_payment(&mut self, id: &str, update: PaymentUpdate) -> Result<bool, LedgerError> {
        if let Some(amount) = update.amount {
            validate_amount(amount)?;
        }
        validate_adjustments(update.discount, update.tax)?;

        self.payments.update(id, |payment| update.apply(payment))
    }

    /// Delete the payment with `id`
    ///
    /// Returns whether a payment was removed.
    pub fn delete_payment(&mut self, id: &str) -> Result<bool, LedgerError> {
        Ok(self.payments.remove(id)?.is_some())
    }

    pub fn get(&self, id: &str) -> Option<&Payment> {
        self.payments.get(id)
    }

    /// All payments, most recent first
    pub fn list(&self) -> &[Payment] {
        self.payments.list()
    }

    /// Payments attributed to one account, in store order
    pub fn get_payments_by_related(&self, related_id: &str, related_type: RelatedType) -> Vec<Payment> {
        self.payments
            .list()
            .iter()
            .filter(|p| p.related_id == related_id && p.related_type == related_type)
            .cloned()
            .collect()
    }

    /// Payments moving money in one direction, in store order
    pub fn get_payments_by_direction(&self, direction: PaymentDirection) -> Vec<Payment> {
        self.payments
            .list()
            .iter()
            .filter(|p| p.direction == direction)
            .cloned()
            .collect()
    }

    /// Replace the whole collection (import/restore)
    pub fn replace_all(&mut self, payments: Vec<Payment>) -> Result<(), LedgerError> {
        self.payments.replace_all(payments)
    }

    pub fn reload(&mut self) -> Result<(), LedgerError> {
        self.payments.reload()
    }
}

fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid_amount(amount));
    }
    Ok(())
}

fn validate_adjustments(discount: Option<Decimal>, tax: Option<Decimal>) -> Result<(), LedgerError> {
    for (field, value) in [("discount", discount), ("tax", tax)] {
        if let Some(value) = value.filter(|v| *v < Decimal::ZERO) {
            return Err(LedgerError::invalid_adjustment(field, value));
        }
    }
    Ok(())
}
