//! I/O module
//!
//! Handles whole-state documents and tabular output.
//!
//! # Components
//!
//! - `snapshot` - Full-state JSON export/import
//! - `csv_export` - Flattened CSV of customers, products and bills

pub mod csv_export;
pub mod snapshot;

pub use csv_export::{write_bills_csv, write_customers_csv, write_products_csv};
pub use snapshot::{import_document, ImportReport, StateSnapshot};
