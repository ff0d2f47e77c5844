//! Error types for the business ledger
//!
//! This module defines all error types that can occur while recording
//! payments, persisting collections, and importing or exporting state.
//!
//! # Error Categories
//!
//! - **Storage Errors**: the storage adapter could not read or write a key
//! - **Format Errors**: malformed JSON documents, CSV write failures
//! - **Validation Errors**: non-positive amounts, negative adjustments
//! - **Import Errors**: documents missing required collections
//!
//! Operations on unknown record ids are not errors: stores ignore them and
//! report `false`. [`LedgerError::NotFound`] is only raised by lookups that
//! must produce a value (order balances, backup restore).

use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the business ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// The storage adapter failed for a specific key
    #[error("Storage error for '{key}': {message}")]
    StorageError {
        /// Storage key being accessed
        key: String,
        /// Description of the failure
        message: String,
    },

    /// A stored or supplied document could not be (de)serialized
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Description of the serde failure
        message: String,
    },

    /// Writing tabular output failed
    #[error("CSV error: {message}")]
    CsvError {
        /// Description of the CSV failure
        message: String,
    },

    /// Payment amount is zero or negative
    ///
    /// Amounts must be strictly positive at the store boundary.
    #[error("Invalid amount {amount}: payment amounts must be greater than zero")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// A discount or tax adjustment is negative
    #[error("Invalid {field} {value}: adjustments must not be negative")]
    InvalidAdjustment {
        /// Name of the adjustment field
        field: String,
        /// The rejected value
        value: Decimal,
    },

    /// Import document lacks one or more required collections
    ///
    /// The import is aborted before anything is written.
    #[error("Malformed import document: missing {}", .missing.join(", "))]
    MalformedImport {
        /// Names of the missing collections
        missing: Vec<String>,
    },

    /// A lookup that must produce a value found nothing
    #[error("{entity} '{id}' not found")]
    NotFound {
        /// Kind of record looked up
        entity: String,
        /// The id that was not found
        id: String,
    },

    /// An import was attempted without the user's confirmation
    #[error("Import not confirmed: existing data would be replaced")]
    ImportNotConfirmed,
}

// Conversion from io::Error to LedgerError
impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(error: serde_json::Error) -> Self {
        LedgerError::SerializationError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        LedgerError::CsvError {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl LedgerError {
    /// Create a StorageError
    pub fn storage(key: &str, message: impl ToString) -> Self {
        LedgerError::StorageError {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        LedgerError::InvalidAmount { amount }
    }

    /// Create an InvalidAdjustment error
    pub fn invalid_adjustment(field: &str, value: Decimal) -> Self {
        LedgerError::InvalidAdjustment {
            field: field.to_string(),
            value,
        }
    }

    /// Create a MalformedImport error
    pub fn malformed_import(missing: &[&str]) -> Self {
        LedgerError::MalformedImport {
            missing: missing.iter().map(|name| name.to_string()).collect(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(entity: &str, id: &str) -> Self {
        LedgerError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }
}
