//! Payment-related types for the business ledger
//!
//! This module defines the payment record, the direction/method/related-type
//! enums that classify it, and the input types used to create and amend
//! payments through the payment store.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Record identifier
///
/// Every persisted record (payments, customers, bills, ...) is keyed by an
/// opaque string id assigned at creation.
pub type RecordId = String;

/// Whether money was received or paid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentDirection {
    /// Money received
    Incoming,
    /// Money paid out
    Outgoing,
}

/// How a payment was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Cash,
    Bank,
    Check,
    Online,
    Credit,
    Other,
}

/// Kind of account a payment is attributed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelatedType {
    Customer,
    Supplier,
    Manufacturing,
    Order,
}

macro_rules! impl_str_enum {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Lowercase name as used in persisted documents
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($name => Ok($ty::$variant),)+
                    other => Err(format!("invalid {}: '{}'", stringify!($ty), other)),
                }
            }
        }
    };
}

impl_str_enum!(PaymentDirection { Incoming => "incoming", Outgoing => "outgoing" });
impl_str_enum!(PaymentMethod {
    Cash => "cash",
    Bank => "bank",
    Check => "check",
    Online => "online",
    Credit => "credit",
    Other => "other",
});
impl_str_enum!(RelatedType {
    Customer => "customer",
    Supplier => "supplier",
    Manufacturing => "manufacturing",
    Order => "order",
});

/// A recorded payment
///
/// Payments are created by user action, read repeatedly for display, and only
/// change through an explicit update or delete. There is no automatic
/// reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    /// Unique identifier, assigned at creation and never changed
    pub id: RecordId,

    /// When the payment took place
    pub date: DateTime<Utc>,

    /// Positive amount of money moved
    pub amount: Decimal,

    pub direction: PaymentDirection,

    pub method: PaymentMethod,

    /// Id of the customer, supplier, manufacturing job or order
    pub related_id: RecordId,

    pub related_type: RelatedType,

    /// Discount recorded alongside the payment (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<Decimal>,

    /// Tax recorded alongside the payment (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// When the record was created in the store
    pub created_at: DateTime<Utc>,
}

/// Input for creating a payment
///
/// Identical to [`Payment`] minus the store-assigned fields. When `date` is
/// `None` the store uses the current time.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayment {
    pub date: Option<DateTime<Utc>>,
    pub amount: Decimal,
    pub direction: PaymentDirection,
    pub method: PaymentMethod,
    pub related_id: RecordId,
    pub related_type: RelatedType,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl NewPayment {
    /// Create a payment input with the required fields and no adjustments
    pub fn new(
        amount: Decimal,
        direction: PaymentDirection,
        method: PaymentMethod,
        related_id: impl Into<RecordId>,
        related_type: RelatedType,
    ) -> Self {
        NewPayment {
            date: None,
            amount,
            direction,
            method,
            related_id: related_id.into(),
            related_type,
            discount: None,
            tax: None,
            reference: None,
            notes: None,
        }
    }

    /// Set the payment date
    pub fn on(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Attach a free-text reference (cheque number, bank ref, ...)
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_adjustments(mut self, discount: Option<Decimal>, tax: Option<Decimal>) -> Self {
        self.discount = discount;
        self.tax = tax;
        self
    }

    /// Materialize the payment with a freshly assigned id
    pub(crate) fn into_payment(self, id: RecordId, now: DateTime<Utc>) -> Payment {
        Payment {
            id,
            date: self.date.unwrap_or(now),
            amount: self.amount,
            direction: self.direction,
            method: self.method,
            related_id: self.related_id,
            related_type: self.related_type,
            discount: self.discount,
            tax: self.tax,
            reference: self.reference,
            notes: self.notes,
            created_at: now,
        }
    }
}

/// Partial update merged into an existing payment
///
/// Only the fields that are `Some` are written. The id and creation time are
/// never touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentUpdate {
    pub date: Option<DateTime<Utc>>,
    pub amount: Option<Decimal>,
    pub direction: Option<PaymentDirection>,
    pub method: Option<PaymentMethod>,
    pub related_id: Option<RecordId>,
    pub related_type: Option<RelatedType>,
    pub discount: Option<Decimal>,
    pub tax: Option<Decimal>,
    pub reference: Option<String>,
    pub notes: Option<String>,
}

impl PaymentUpdate {
    /// Merge the populated fields into `payment`
    pub fn apply(self, payment: &mut Payment) {
        if let Some(date) = self.date {
            payment.date = date;
        }
        if let Some(amount) = self.amount {
            payment.amount = amount;
        }
        if let Some(direction) = self.direction {
            payment.direction = direction;
        }
        if let Some(method) = self.method {
            payment.method = method;
        }
        if let Some(related_id) = self.related_id {
            payment.related_id = related_id;
        }
        if let Some(related_type) = self.related_type {
            payment.related_type = related_type;
        }
        if self.discount.is_some() {
            payment.discount = self.discount;
        }
        if self.tax.is_some() {
            payment.tax = self.tax;
        }
        if self.reference.is_some() {
            payment.reference = self.reference;
        }
        if self.notes.is_some() {
            payment.notes = self.notes;
        }
    }

    /// True when no field would be written
    pub fn is_empty(&self) -> bool {
        *self == PaymentUpdate::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    fn sample() -> Payment {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        NewPayment::new(
            Decimal::new(2500, 2),
            PaymentDirection::Incoming,
            PaymentMethod::Cash,
            "cust-1",
            RelatedType::Customer,
        )
        .into_payment("pay-1".to_string(), now)
    }

    #[rstest]
    #[case::incoming("incoming", PaymentDirection::Incoming)]
    #[case::outgoing_mixed_case(" Outgoing ", PaymentDirection::Outgoing)]
    fn test_direction_from_str(#[case] input: &str, #[case] expected: PaymentDirection) {
        assert_eq!(input.parse::<PaymentDirection>().unwrap(), expected);
    }

    #[rstest]
    #[case::customer("customer", RelatedType::Customer)]
    #[case::supplier("supplier", RelatedType::Supplier)]
    #[case::manufacturing("manufacturing", RelatedType::Manufacturing)]
    #[case::order("order", RelatedType::Order)]
    fn test_related_type_from_str(#[case] input: &str, #[case] expected: RelatedType) {
        assert_eq!(input.parse::<RelatedType>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test]
    fn test_invalid_method_is_rejected() {
        assert!("barter".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_new_payment_defaults_date_to_creation_time() {
        let payment = sample();
        assert_eq!(payment.date, payment.created_at);
        assert_eq!(payment.id, "pay-1");
        assert!(payment.discount.is_none());
    }

    #[test]
    fn test_update_merges_only_populated_fields() {
        let mut payment = sample();
        let update = PaymentUpdate {
            amount: Some(Decimal::new(4000, 2)),
            notes: Some("second instalment".to_string()),
            ..Default::default()
        };

        update.apply(&mut payment);

        assert_eq!(payment.amount, Decimal::new(4000, 2));
        assert_eq!(payment.notes.as_deref(), Some("second instalment"));
        assert_eq!(payment.direction, PaymentDirection::Incoming);
        assert_eq!(payment.related_id, "cust-1");
    }

    #[test]
    fn test_serializes_as_camel_case_with_string_amount() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["relatedId"], "cust-1");
        assert_eq!(json["relatedType"], "customer");
        assert_eq!(json["amount"], "25.00");
        assert!(json.get("discount").is_none());
    }
}
