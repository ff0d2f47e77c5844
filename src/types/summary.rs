//! Derived ledger figures
//!
//! None of these types are persisted; they are recomputed from payments on
//! every read.

use super::payment::{PaymentDirection, RecordId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Totals for one related entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSummary {
    /// Sum of incoming payment amounts
    pub total_incoming: Decimal,
    /// Sum of outgoing payment amounts
    pub total_outgoing: Decimal,
    /// `total_incoming - total_outgoing`
    pub balance: Decimal,
}

/// Settlement status of a bill, order or account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Paid,
    Partial,
    Unpaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Partial => "partial",
            PaymentStatus::Unpaid => "unpaid",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outstanding position of a bill or order against its payments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityBalance {
    pub total: Decimal,
    pub discount: Decimal,
    /// Incoming minus outgoing payments tied to the entity
    pub net_paid: Decimal,
    /// `total - net_paid - discount`
    pub remaining: Decimal,
    pub status: PaymentStatus,
}

/// One row of a chronological account statement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerLine {
    pub payment_id: RecordId,
    pub date: DateTime<Utc>,
    pub direction: PaymentDirection,
    pub amount: Decimal,
    /// Balance after applying this row
    pub running_balance: Decimal,
    pub reference: Option<String>,
}

/// Headline figures for the dashboard
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub customers: usize,
    pub products: usize,
    pub low_stock_products: usize,
    pub bills: usize,
    /// Bills whose status is not `paid`
    pub open_bills: usize,
    /// Sum of bill totals
    pub total_sales: Decimal,
    /// Sum of positive bill balances
    pub outstanding_receivables: Decimal,
    pub pending_orders: usize,
    /// Sum of unpaid purchase balances
    pub outstanding_payables: Decimal,
    /// All payments, regardless of related entity
    pub cash_flow: LedgerSummary,
    /// Cash journal income against expenses
    pub cash_book: LedgerSummary,
}
