//! Flattened tabular export
//!
//! Writes customers, products and bills as CSV so they can be opened in a
//! spreadsheet. Amounts are written with two decimal places; optional fields
//! become empty cells.
//!
//! All functions take a `&mut dyn Write` and do no file handling of their own.

use crate::types::{Bill, Customer, LedgerError, Product};
use csv::Writer;
use rust_decimal::Decimal;
use std::io::Write;

fn money(value: Decimal) -> String {
    format!("{:.2}", value)
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Write customers with columns: id, name, phone, email, address, created_at
pub fn write_customers_csv(customers: &[Customer], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record(["id", "name", "phone", "email", "address", "created_at"])?;

    for customer in customers {
        writer.write_record([
            customer.id.as_str(),
            customer.name.as_str(),
            opt(&customer.phone),
            opt(&customer.email),
            opt(&customer.address),
            customer.created_at.to_rfc3339().as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write products with columns: id, name, sku, category, price, cost_price, stock, low_stock
pub fn write_products_csv(products: &[Product], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record([
        "id",
        "name",
        "sku",
        "category",
        "price",
        "cost_price",
        "stock",
        "low_stock",
    ])?;

    for product in products {
        writer.write_record([
            product.id.clone(),
            product.name.clone(),
            opt(&product.sku).to_string(),
            opt(&product.category).to_string(),
            money(product.price),
            money(product.cost_price),
            product.stock.to_string(),
            product.is_low_stock().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write bills, one row per bill, including the derived balance and status
pub fn write_bills_csv(bills: &[Bill], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = Writer::from_writer(output);
    writer.write_record([
        "invoice_number",
        "date",
        "customer",
        "items",
        "subtotal",
        "discount",
        "tax",
        "total",
        "paid",
        "balance",
        "status",
    ])?;

    for bill in bills {
        writer.write_record([
            bill.invoice_number.clone(),
            bill.date.format("%Y-%m-%d").to_string(),
            bill.customer_name.clone(),
            bill.items.len().to_string(),
            money(bill.subtotal),
            money(bill.discount),
            money(bill.tax),
            money(bill.total),
            money(bill.paid_amount),
            money(bill.balance()),
            bill.status().to_string(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}
