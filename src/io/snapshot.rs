//! Full-state export and import
//!
//! A snapshot bundles every collection into one human-readable JSON document.
//! Importing validates the whole document before anything is written: if a
//! required collection is missing or any record fails to deserialize, storage
//! is left untouched.

use crate::storage::{keys, read_json, StorageAdapter};
use crate::types::{
    AuditEntry, Bill, CashTransaction, CompanyInfo, Customer, LedgerError, Order, Payment,
    Product, Purchase,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

/// Format version written into every export
pub const SNAPSHOT_VERSION: u32 = 1;

/// Collections an import document must contain
pub const REQUIRED_COLLECTIONS: [&str; 3] = [keys::CUSTOMERS, keys::PRODUCTS, keys::BILLS];

/// Every persisted collection at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSnapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub customers: Vec<Customer>,
    pub products: Vec<Product>,
    pub bills: Vec<Bill>,
    pub invoice_counter: u64,
    pub orders: Vec<Order>,
    pub purchases: Vec<Purchase>,
    pub transactions: Vec<CashTransaction>,
    pub payments: Vec<Payment>,
    pub company_info: Option<CompanyInfo>,
    pub audit_log: Vec<AuditEntry>,
}

impl StateSnapshot {
    /// Read every collection from storage
    pub fn capture(storage: &dyn StorageAdapter) -> Result<Self, LedgerError> {
        Ok(StateSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            customers: read_list(storage, keys::CUSTOMERS)?,
            products: read_list(storage, keys::PRODUCTS)?,
            bills: read_list(storage, keys::BILLS)?,
            invoice_counter: read_json(storage, keys::INVOICE_COUNTER)?.unwrap_or(0),
            orders: read_list(storage, keys::ORDERS)?,
            purchases: read_list(storage, keys::PURCHASES)?,
            transactions: read_list(storage, keys::TRANSACTIONS)?,
            payments: read_list(storage, keys::PAYMENTS)?,
            company_info: read_json(storage, keys::COMPANY_INFO)?,
            audit_log: read_list(storage, keys::AUDIT_LOG)?,
        })
    }

    /// Total number of records across all list collections
    pub fn record_count(&self) -> usize {
        self.customers.len()
            + self.products.len()
            + self.bills.len()
            + self.orders.len()
            + self.purchases.len()
            + self.transactions.len()
            + self.payments.len()
            + self.audit_log.len()
    }

    pub fn to_json(&self) -> Result<String, LedgerError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Wholesale-replace every collection with the snapshot's contents
    pub fn write_to(&self, storage: &dyn StorageAdapter) -> Result<(), LedgerError> {
        let writes = vec![
            (keys::CUSTOMERS, Some(serde_json::to_string_pretty(&self.customers)?)),
            (keys::PRODUCTS, Some(serde_json::to_string_pretty(&self.products)?)),
            (keys::BILLS, Some(serde_json::to_string_pretty(&self.bills)?)),
            (keys::INVOICE_COUNTER, Some(serde_json::to_string(&self.invoice_counter)?)),
            (keys::ORDERS, Some(serde_json::to_string_pretty(&self.orders)?)),
            (keys::PURCHASES, Some(serde_json::to_string_pretty(&self.purchases)?)),
            (keys::TRANSACTIONS, Some(serde_json::to_string_pretty(&self.transactions)?)),
            (keys::PAYMENTS, Some(serde_json::to_string_pretty(&self.payments)?)),
            (keys::AUDIT_LOG, Some(serde_json::to_string_pretty(&self.audit_log)?)),
            (
                keys::COMPANY_INFO,
                self.company_info
                    .as_ref()
                    .map(|info| serde_json::to_string_pretty(info))
                    .transpose()?,
            ),
        ];
        apply_writes(storage, writes)
    }
}

/// Which collections an import replaced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub replaced: Vec<&'static str>,
    pub records: usize,
}

/// Import document as read from the user
///
/// The required collections are plain lists; the rest are optional and only
/// replaced when present. An explicit `"companyInfo": null` clears the stored
/// company record.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImportDocument {
    customers: Vec<Customer>,
    products: Vec<Product>,
    bills: Vec<Bill>,
    #[serde(default)]
    invoice_counter: Option<u64>,
    #[serde(default)]
    orders: Option<Vec<Order>>,
    #[serde(default)]
    purchases: Option<Vec<Purchase>>,
    #[serde(default)]
    transactions: Option<Vec<CashTransaction>>,
    #[serde(default)]
    payments: Option<Vec<Payment>>,
    #[serde(default)]
    company_info: Option<CompanyInfo>,
    #[serde(default)]
    audit_log: Option<Vec<AuditEntry>>,
}

/// Parse a full-state document and replace the collections it carries
///
/// # Errors
///
/// Returns an error if:
/// - The text is not JSON (`SerializationError`)
/// - A required collection is missing or null (`MalformedImport`)
/// - Any record fails to deserialize (`SerializationError`)
/// - A storage write fails
///
/// In the first three cases nothing has been written.
pub fn import_document(
    storage: &dyn StorageAdapter,
    text: &str,
) -> Result<ImportReport, LedgerError> {
    let value: Value = serde_json::from_str(text)?;

    let missing: Vec<&str> = REQUIRED_COLLECTIONS
        .iter()
        .copied()
        .filter(|name| !value.get(name).is_some_and(Value::is_array))
        .collect();
    if !missing.is_empty() {
        return Err(LedgerError::malformed_import(&missing));
    }

    let clears_company_info = value.get("companyInfo").is_some_and(Value::is_null);
    let doc: ImportDocument = serde_json::from_value(value)?;

    let mut records = doc.customers.len() + doc.products.len() + doc.bills.len();
    let mut writes = vec![
        (keys::CUSTOMERS, Some(serde_json::to_string_pretty(&doc.customers)?)),
        (keys::PRODUCTS, Some(serde_json::to_string_pretty(&doc.products)?)),
        (keys::BILLS, Some(serde_json::to_string_pretty(&doc.bills)?)),
    ];
    if let Some(counter) = doc.invoice_counter {
        writes.push((keys::INVOICE_COUNTER, Some(serde_json::to_string(&counter)?)));
    }
    push_list(&mut writes, &mut records, keys::ORDERS, doc.orders)?;
    push_list(&mut writes, &mut records, keys::PURCHASES, doc.purchases)?;
    push_list(&mut writes, &mut records, keys::TRANSACTIONS, doc.transactions)?;
    push_list(&mut writes, &mut records, keys::PAYMENTS, doc.payments)?;
    push_list(&mut writes, &mut records, keys::AUDIT_LOG, doc.audit_log)?;
    match doc.company_info {
        Some(info) => {
            writes.push((keys::COMPANY_INFO, Some(serde_json::to_string_pretty(&info)?)));
        }
        None if clears_company_info => writes.push((keys::COMPANY_INFO, None)),
        None => {}
    }

    let replaced: Vec<&'static str> = writes.iter().map(|(key, _)| *key).collect();
    apply_writes(storage, writes)?;
    info!(collections = replaced.len(), records, "state imported");

    Ok(ImportReport { replaced, records })
}

fn read_list<T: serde::de::DeserializeOwned>(
    storage: &dyn StorageAdapter,
    key: &str,
) -> Result<Vec<T>, LedgerError> {
    Ok(read_json(storage, key)?.unwrap_or_default())
}

/// Pending storage change: `Some` replaces the document, `None` removes the key
type PendingWrite = (&'static str, Option<String>);

fn push_list<T: Serialize>(
    writes: &mut Vec<PendingWrite>,
    records: &mut usize,
    key: &'static str,
    list: Option<Vec<T>>,
) -> Result<(), LedgerError> {
    if let Some(list) = list {
        *records += list.len();
        writes.push((key, Some(serde_json::to_string_pretty(&list)?)));
    }
    Ok(())
}

fn apply_writes(
    storage: &dyn StorageAdapter,
    writes: Vec<PendingWrite>,
) -> Result<(), LedgerError> {
    for (key, text) in writes {
        match text {
            Some(text) => storage.set(key, &text)?,
            None => storage.remove(key)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{write_json, MemoryStorage};
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn seed(storage: &dyn StorageAdapter) {
        let when = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let customers = vec![
            Customer {
                id: "c2".into(),
                name: "Bilal".into(),
                phone: Some("555-0102".into()),
                email: None,
                address: None,
                created_at: when,
            },
            Customer {
                id: "c1".into(),
                name: "Asha".into(),
                phone: None,
                email: Some("asha@example.com".into()),
                address: None,
                created_at: when,
            },
        ];
        let products = vec![Product {
            id: "p1".into(),
            name: "Tea 250g".into(),
            sku: Some("TEA-250".into()),
            category: None,
            price: Decimal::new(450, 2),
            cost_price: Decimal::new(300, 2),
            stock: 12,
            low_stock_threshold: 3,
        }];
        write_json(storage, keys::CUSTOMERS, &customers).unwrap();
        write_json(storage, keys::PRODUCTS, &products).unwrap();
        write_json(storage, keys::BILLS, &Vec::<Bill>::new()).unwrap();
        write_json(storage, keys::INVOICE_COUNTER, &7u64).unwrap();
        write_json(
            storage,
            keys::COMPANY_INFO,
            &CompanyInfo {
                name: "Corner Store".into(),
                ..Default::default()
            },
        )
        .unwrap();
    }

    #[test]
    fn test_capture_empty_storage() {
        let storage = MemoryStorage::new();
        let snapshot = StateSnapshot::capture(&storage).unwrap();
        assert_eq!(snapshot.record_count(), 0);
        assert_eq!(snapshot.invoice_counter, 0);
        assert!(snapshot.company_info.is_none());
    }

    #[test]
    fn test_export_then_import_reproduces_collections() {
        let source = MemoryStorage::new();
        seed(&source);
        let exported = StateSnapshot::capture(&source).unwrap();
        let text = exported.to_json().unwrap();

        let target = MemoryStorage::new();
        let report = import_document(&target, &text).unwrap();
        let imported = StateSnapshot::capture(&target).unwrap();

        assert_eq!(report.records, exported.record_count());
        assert_eq!(imported.customers, exported.customers);
        assert_eq!(imported.products, exported.products);
        assert_eq!(imported.invoice_counter, 7);
        assert_eq!(imported.company_info, exported.company_info);
        // Order preserved
        assert_eq!(imported.customers[0].id, "c2");
    }

    #[test]
    fn test_missing_required_collections_aborts_without_writes() {
        let storage = MemoryStorage::new();
        seed(&storage);
        let before = StateSnapshot::capture(&storage).unwrap();

        let doc = json!({ "customers": [], "payments": [] }).to_string();
        let err = import_document(&storage, &doc).unwrap_err();

        assert_eq!(
            err,
            LedgerError::MalformedImport {
                missing: vec!["products".to_string(), "bills".to_string()]
            }
        );
        let after = StateSnapshot::capture(&storage).unwrap();
        assert_eq!(after.customers, before.customers);
        assert_eq!(after.products, before.products);
    }

    #[test]
    fn test_null_collection_counts_as_missing() {
        let storage = MemoryStorage::new();
        let doc = json!({ "customers": [], "products": null, "bills": [] }).to_string();
        assert!(matches!(
            import_document(&storage, &doc),
            Err(LedgerError::MalformedImport { .. })
        ));
    }

    #[test]
    fn test_bad_record_aborts_without_writes() {
        let storage = MemoryStorage::new();
        seed(&storage);

        let doc = json!({
            "customers": [{ "id": "x" }],
            "products": [],
            "bills": []
        })
        .to_string();

        assert!(matches!(
            import_document(&storage, &doc),
            Err(LedgerError::SerializationError { .. })
        ));
        assert_eq!(StateSnapshot::capture(&storage).unwrap().customers.len(), 2);
    }

    #[test]
    fn test_not_json_is_rejected() {
        let storage = MemoryStorage::new();
        assert!(matches!(
            import_document(&storage, "customers,products"),
            Err(LedgerError::SerializationError { .. })
        ));
    }

    #[test]
    fn test_optional_collections_left_alone_when_absent() {
        let storage = MemoryStorage::new();
        write_json(&storage, keys::ORDERS, &json!([])).unwrap();
        storage.set(keys::PAYMENTS, "[]").unwrap();

        let doc = json!({ "customers": [], "products": [], "bills": [] }).to_string();
        let report = import_document(&storage, &doc).unwrap();

        assert_eq!(report.replaced, vec!["customers", "products", "bills"]);
        assert_eq!(storage.get(keys::PAYMENTS).unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_write_to_restores_everything() {
        let source = MemoryStorage::new();
        seed(&source);
        let snapshot = StateSnapshot::capture(&source).unwrap();

        let target = MemoryStorage::new();
        write_json(&target, keys::COMPANY_INFO, &CompanyInfo::default()).unwrap();
        snapshot.write_to(&target).unwrap();

        let restored = StateSnapshot::capture(&target).unwrap();
        assert_eq!(restored.customers, snapshot.customers);
        assert_eq!(restored.company_info, snapshot.company_info);
        assert_eq!(restored.invoice_counter, snapshot.invoice_counter);
    }

    fn seed_everything(storage: &dyn StorageAdapter) {
        let when = "2024-06-02T09:30:00Z";
        let items = json!([{ "name": "Tea 250g", "quantity": "2", "unitPrice": "4.50" }]);
        write_json(storage, keys::CUSTOMERS, &json!([
            { "id": "c7", "name": "Dina", "createdAt": when }
        ]))
        .unwrap();
        write_json(storage, keys::PRODUCTS, &json!([
            { "id": "p7", "name": "Coffee 1kg", "price": "18.00", "stock": 1, "lowStockThreshold": 2 }
        ]))
        .unwrap();
        write_json(storage, keys::BILLS, &json!([{
            "id": "b1", "invoiceNumber": "INV-0003", "customerName": "Dina", "date": when,
            "items": items, "subtotal": "9.00", "total": "9.00", "paidAmount": "4.00"
        }]))
        .unwrap();
        write_json(storage, keys::INVOICE_COUNTER, &3u64).unwrap();
        write_json(storage, keys::ORDERS, &json!([{
            "id": "o1", "orderNumber": "ORD-1", "date": when, "items": items,
            "total": "9.00", "discount": "1.00", "status": "processing"
        }]))
        .unwrap();
        write_json(storage, keys::PURCHASES, &json!([{
            "id": "pu1", "supplierId": "s1", "supplierName": "Leaf Co", "date": when,
            "items": items, "total": "9.00", "paidAmount": "9.00"
        }]))
        .unwrap();
        write_json(storage, keys::TRANSACTIONS, &json!([{
            "id": "t1", "date": when, "flow": "expense", "category": "rent", "amount": "300.00"
        }]))
        .unwrap();
        write_json(storage, keys::PAYMENTS, &json!([
            { "id": "pay2", "date": when, "amount": "2.00", "direction": "outgoing",
              "method": "bank", "relatedId": "s1", "relatedType": "supplier", "createdAt": when },
            { "id": "pay1", "date": when, "amount": "4.00", "direction": "incoming",
              "method": "cash", "relatedId": "c7", "relatedType": "customer",
              "reference": "till 2", "createdAt": when }
        ]))
        .unwrap();
        write_json(storage, keys::AUDIT_LOG, &json!([{
            "id": "a1", "timestamp": when, "action": "create", "entity": "payment", "entityId": "pay1"
        }]))
        .unwrap();
    }

    /// Compare everything but the capture time
    fn assert_same_state(actual: &StateSnapshot, expected: &StateSnapshot) {
        let mut actual = actual.clone();
        actual.exported_at = expected.exported_at;
        assert_eq!(&actual, expected);
    }

    #[test]
    fn test_import_over_existing_data_reproduces_source() {
        let source = MemoryStorage::new();
        seed_everything(&source);
        write_json(
            &source,
            keys::COMPANY_INFO,
            &CompanyInfo {
                name: "Dina's Deli".into(),
                tax_id: Some("TX-99".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let exported = StateSnapshot::capture(&source).unwrap();

        let target = MemoryStorage::new();
        seed(&target);
        target.set(keys::PAYMENTS, r#"[{"id":"stale"}]"#).unwrap();

        import_document(&target, &exported.to_json().unwrap()).unwrap();

        assert_same_state(&StateSnapshot::capture(&target).unwrap(), &exported);
    }

    #[test]
    fn test_import_of_empty_export_clears_company_info() {
        let exported = StateSnapshot::capture(&MemoryStorage::new()).unwrap();
        assert!(exported.to_json().unwrap().contains(r#""companyInfo": null"#));

        let target = MemoryStorage::new();
        seed_everything(&target);
        write_json(
            &target,
            keys::COMPANY_INFO,
            &CompanyInfo {
                name: "Old Co".into(),
                ..Default::default()
            },
        )
        .unwrap();

        let report = import_document(&target, &exported.to_json().unwrap()).unwrap();

        assert!(report.replaced.contains(&keys::COMPANY_INFO));
        assert_eq!(target.get(keys::COMPANY_INFO).unwrap(), None);
        assert_same_state(&StateSnapshot::capture(&target).unwrap(), &exported);
    }

    #[test]
    fn test_absent_company_info_is_kept() {
        let target = MemoryStorage::new();
        seed(&target);

        let doc = json!({ "customers": [], "products": [], "bills": [] }).to_string();
        import_document(&target, &doc).unwrap();

        assert_eq!(
            StateSnapshot::capture(&target).unwrap().company_info.unwrap().name,
            "Corner Store"
        );
    }
}
