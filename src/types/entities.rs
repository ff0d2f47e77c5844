//! Business records surrounding the ledger
//!
//! Customers, products, bills, orders, purchases, cash transactions, company
//! details and the audit trail. These are plain CRUD records; the only
//! behaviour they carry is a few derived figures.

use super::payment::RecordId;
use super::summary::PaymentStatus;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub cost_price: Decimal,
    pub stock: i64,
    /// Stock level at or below which the product counts as low
    #[serde(default)]
    pub low_stock_threshold: i64,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }
}

/// A priced line on a bill, order or purchase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(default)]
    pub product_id: Option<RecordId>,
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

impl LineItem {
    pub fn line_total(&self) -> Decimal {
        self.quantity * self.unit_price
    }
}

/// Sum of line totals
pub fn items_subtotal(items: &[LineItem]) -> Decimal {
    items.iter().map(LineItem::line_total).sum()
}

/// Sale record (invoice)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub id: RecordId,
    pub invoice_number: String,
    #[serde(default)]
    pub customer_id: Option<RecordId>,
    pub customer_name: String,
    pub date: DateTime<Utc>,
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    /// `subtotal - discount + tax`
    pub total: Decimal,
    #[serde(default)]
    pub paid_amount: Decimal,
}

impl Bill {
    /// Amount still owed on the bill
    pub fn balance(&self) -> Decimal {
        self.total - self.paid_amount
    }

    pub fn status(&self) -> PaymentStatus {
        crate::core::ledger::derive_status(self.total, self.balance())
    }
}

/// Input for creating a bill; the invoice number and totals are assigned
#[derive(Debug, Clone, PartialEq)]
pub struct NewBill {
    pub customer_id: Option<RecordId>,
    pub customer_name: String,
    pub date: Option<DateTime<Utc>>,
    pub items: Vec<LineItem>,
    pub discount: Decimal,
    pub tax: Decimal,
    pub paid_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: RecordId,
    pub order_number: String,
    #[serde(default)]
    pub customer_id: Option<RecordId>,
    pub date: DateTime<Utc>,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub status: OrderStatus,
}

/// Stock bought from a supplier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: RecordId,
    pub supplier_id: RecordId,
    pub supplier_name: String,
    pub date: DateTime<Utc>,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    #[serde(default)]
    pub paid_amount: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CashFlow {
    Income,
    Expense,
}

/// General income/expense journal entry, independent of payments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CashTransaction {
    pub id: RecordId,
    pub date: DateTime<Utc>,
    pub flow: CashFlow,
    pub category: String,
    pub amount: Decimal,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInfo {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub tax_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Import,
    Restore,
}

/// Audit trail row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: RecordId,
    pub timestamp: DateTime<Utc>,
    pub action: AuditAction,
    pub entity: String,
    #[serde(default)]
    pub entity_id: Option<RecordId>,
    #[serde(default)]
    pub details: Option<String>,
}
