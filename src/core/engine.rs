//! Ledger engine
//!
//! This module provides the LedgerEngine that coordinates the payment store,
//! the surrounding record collections and the audit log, the way a single UI
//! action would touch them.
//!
//! The engine enforces the cross-store rules:
//! - Every payment mutation leaves an audit entry
//! - Bills get sequential invoice numbers (`INV-0001`, `INV-0002`, ...)
//! - Balances and statuses are always derived on read, never stored
//! - Imports require explicit confirmation and reload every collection

use crate::core::backup::BackupService;
use crate::core::collection::Collection;
use crate::core::ledger;
use crate::core::payment_store::PaymentStore;
use crate::io::snapshot::{self, ImportReport, StateSnapshot};
use crate::storage::{keys, read_json, write_json, StorageAdapter};
use crate::types::{
    items_subtotal, AuditAction, AuditEntry, Bill, CashFlow, CashTransaction, CompanyInfo,
    Customer, DashboardStats, EntityBalance, LedgerError, LedgerLine, LedgerSummary, NewBill,
    NewPayment, Order, OrderStatus, Payment, PaymentStatus, PaymentUpdate, Product, Purchase,
    RecordId, RelatedType,
};
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

const INVOICE_PREFIX: &str = "INV-";

/// Coordinates every store backing one business
pub struct LedgerEngine {
    storage: Arc<dyn StorageAdapter>,
    payments: PaymentStore,
    customers: Collection<Customer>,
    products: Collection<Product>,
    bills: Collection<Bill>,
    orders: Collection<Order>,
    purchases: Collection<Purchase>,
    transactions: Collection<CashTransaction>,
    audit_log: Collection<AuditEntry>,
}

impl LedgerEngine {
    /// Open every collection on `storage`
    ///
    /// # Errors
    ///
    /// Returns an error if any persisted collection cannot be read.
    pub fn open(storage: Arc<dyn StorageAdapter>) -> Result<Self, LedgerError> {
        Ok(LedgerEngine {
            payments: PaymentStore::open(Arc::clone(&storage))?,
            customers: Collection::open(Arc::clone(&storage))?,
            products: Collection::open(Arc::clone(&storage))?,
            bills: Collection::open(Arc::clone(&storage))?,
            orders: Collection::open(Arc::clone(&storage))?,
            purchases: Collection::open(Arc::clone(&storage))?,
            transactions: Collection::open(Arc::clone(&storage))?,
            audit_log: Collection::open(Arc::clone(&storage))?,
            storage,
        })
    }

    pub fn storage(&self) -> Arc<dyn StorageAdapter> {
        Arc::clone(&self.storage)
    }

    pub fn payments(&self) -> &PaymentStore {
        &self.payments
    }

    pub fn customers(&self) -> &Collection<Customer> {
        &self.customers
    }

    pub fn products(&self) -> &Collection<Product> {
        &self.products
    }

    pub fn bills(&self) -> &Collection<Bill> {
        &self.bills
    }

    pub fn orders_mut(&mut self) -> &mut Collection<Order> {
        &mut self.orders
    }

    /// Audit trail, most recent first
    pub fn audit_log(&self) -> &[AuditEntry] {
        self.audit_log.list()
    }

    /// Record a payment and audit it
    pub fn record_payment(&mut self, data: NewPayment) -> Result<RecordId, LedgerError> {
        let details = format!(
            "{} {} {} for {} {}",
            data.direction, data.amount, data.method, data.related_type, data.related_id
        );
        let id = self.payments.add_payment(data)?;
        self.audit(AuditAction::Create, "payment", Some(&id), Some(details))?;
        Ok(id)
    }

    /// Amend a payment; unknown ids are ignored and not audited
    pub fn amend_payment(&mut self, id: &str, update: PaymentUpdate) -> Result<bool, LedgerError> {
        let found = self.payments.update_payment(id, update)?;
        if found {
            self.audit(AuditAction::Update, "payment", Some(id), None)?;
        }
        Ok(found)
    }

    /// Delete a payment; unknown ids are ignored and not audited
    pub fn remove_payment(&mut self, id: &str) -> Result<bool, LedgerError> {
        let found = self.payments.delete_payment(id)?;
        if found {
            self.audit(AuditAction::Delete, "payment", Some(id), None)?;
        }
        Ok(found)
    }

    /// Incoming/outgoing totals for one customer, supplier, job or order
    pub fn account_summary(&self, related_id: &str, related_type: RelatedType) -> LedgerSummary {
        ledger::compute_summary(&self.payments.get_payments_by_related(related_id, related_type))
    }

    /// Chronological statement for one related entity
    pub fn account_statement(&self, related_id: &str, related_type: RelatedType) -> Vec<LedgerLine> {
        ledger::statement(&self.payments.get_payments_by_related(related_id, related_type))
    }

    /// Remaining balance and status of an order
    ///
    /// Uses the order's total and discount against payments related to the
    /// order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    pub fn order_balance(&self, order_id: &str) -> Result<EntityBalance, LedgerError> {
        let order = self
            .orders
            .get(order_id)
            .ok_or_else(|| LedgerError::not_found("order", order_id))?;
        let payments: Vec<Payment> = self
            .payments
            .get_payments_by_related(order_id, RelatedType::Order);
        Ok(ledger::entity_balance(order.total, order.discount, &payments))
    }

    /// Create a bill with the next invoice number and computed totals
    pub fn create_bill(&mut self, draft: NewBill) -> Result<Bill, LedgerError> {
        let invoice_number = self.next_invoice_number()?;
        let subtotal = items_subtotal(&draft.items);
        let bill = Bill {
            id: Uuid::new_v4().to_string(),
            invoice_number,
            customer_id: draft.customer_id,
            customer_name: draft.customer_name,
            date: draft.date.unwrap_or_else(Utc::now),
            items: draft.items,
            subtotal,
            discount: draft.discount,
            tax: draft.tax,
            total: subtotal - draft.discount + draft.tax,
            paid_amount: draft.paid_amount,
        };
        self.bills.insert(bill.clone())?;
        self.audit(
            AuditAction::Create,
            "bill",
            Some(&bill.id),
            Some(bill.invoice_number.clone()),
        )?;
        Ok(bill)
    }

    /// Reserve the next invoice number
    ///
    /// The persisted counter is reconciled with the highest number already
    /// on a bill, so imported bills never collide with new ones.
    pub fn next_invoice_number(&mut self) -> Result<String, LedgerError> {
        let stored: u64 = read_json(self.storage.as_ref(), keys::INVOICE_COUNTER)?.unwrap_or(0);
        let highest = self
            .bills
            .list()
            .iter()
            .filter_map(|bill| bill.invoice_number.strip_prefix(INVOICE_PREFIX))
            .filter_map(|digits| digits.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        let next = stored.max(highest) + 1;
        write_json(self.storage.as_ref(), keys::INVOICE_COUNTER, &next)?;
        Ok(format!("{}{:04}", INVOICE_PREFIX, next))
    }

    pub fn company_info(&self) -> Result<Option<CompanyInfo>, LedgerError> {
        read_json(self.storage.as_ref(), keys::COMPANY_INFO)
    }

    pub fn set_company_info(&mut self, info: &CompanyInfo) -> Result<(), LedgerError> {
        write_json(self.storage.as_ref(), keys::COMPANY_INFO, info)?;
        self.audit(AuditAction::Update, "company_info", None, None)
    }

    /// Headline counts and totals
    pub fn dashboard(&self) -> DashboardStats {
        let bills = self.bills.list();
        DashboardStats {
            customers: self.customers.len(),
            products: self.products.len(),
            low_stock_products: self.products.list().iter().filter(|p| p.is_low_stock()).count(),
            bills: bills.len(),
            open_bills: bills
                .iter()
                .filter(|b| b.status() != PaymentStatus::Paid)
                .count(),
            total_sales: bills.iter().map(|b| b.total).sum(),
            outstanding_receivables: bills
                .iter()
                .map(Bill::balance)
                .filter(|balance| *balance > Decimal::ZERO)
                .sum(),
            pending_orders: self
                .orders
                .list()
                .iter()
                .filter(|o| matches!(o.status, OrderStatus::Pending | OrderStatus::Processing))
                .count(),
            outstanding_payables: self
                .purchases
                .list()
                .iter()
                .map(|p| p.total - p.paid_amount)
                .filter(|balance| *balance > Decimal::ZERO)
                .sum(),
            cash_flow: ledger::compute_summary(self.payments.list()),
            cash_book: cash_book(self.transactions.list()),
        }
    }

    /// Capture every collection for export
    pub fn export_snapshot(&self) -> Result<StateSnapshot, LedgerError> {
        StateSnapshot::capture(self.storage.as_ref())
    }

    /// Replace collections from a full-state document
    ///
    /// The import itself is audited: once the document's collections are in
    /// place an `Import` entry is prepended to the imported audit log, so the
    /// stored log is the document's log plus that one entry.
    ///
    /// # Errors
    ///
    /// Returns `ImportNotConfirmed` when `confirmed` is false, otherwise any
    /// error from [`snapshot::import_document`]. Nothing is written on error.
    pub fn import_document(&mut self, text: &str, confirmed: bool) -> Result<ImportReport, LedgerError> {
        if !confirmed {
            return Err(LedgerError::ImportNotConfirmed);
        }
        let report = snapshot::import_document(self.storage.as_ref(), text)?;
        self.reload()?;
        self.audit(
            AuditAction::Import,
            "state",
            None,
            Some(format!("{} records", report.records)),
        )?;
        Ok(report)
    }

    /// Wholesale-restore a stored backup
    pub fn restore_backup(&mut self, backups: &BackupService, backup_id: &str) -> Result<(), LedgerError> {
        let record = backups.find(backup_id)?;
        record.snapshot.write_to(self.storage.as_ref())?;
        self.reload()?;
        info!(backup_id, "backup restored");
        self.audit(AuditAction::Restore, "state", Some(backup_id), None)
    }

    /// Re-read every collection from storage
    pub fn reload(&mut self) -> Result<(), LedgerError> {
        self.payments.reload()?;
        self.customers.reload()?;
        self.products.reload()?;
        self.bills.reload()?;
        self.orders.reload()?;
        self.purchases.reload()?;
        self.transactions.reload()?;
        self.audit_log.reload()
    }

    fn audit(
        &mut self,
        action: AuditAction,
        entity: &str,
        entity_id: Option<&str>,
        details: Option<String>,
    ) -> Result<(), LedgerError> {
        self.audit_log.insert(AuditEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            action,
            entity: entity.to_string(),
            entity_id: entity_id.map(str::to_string),
            details,
        })
    }
}

/// Income and expense totals of the cash journal
fn cash_book(transactions: &[CashTransaction]) -> LedgerSummary {
    let (income, expense) = transactions.iter().fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(income, expense), entry| match entry.flow {
            CashFlow::Income => (income + entry.amount, expense),
            CashFlow::Expense => (income, expense + entry.amount),
        },
    );
    LedgerSummary {
        total_incoming: income,
        total_outgoing: expense,
        balance: income - expense,
    }
}
