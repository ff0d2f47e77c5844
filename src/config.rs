//! Application settings
//!
//! The only configuration the ledger carries: presentation defaults and the
//! auto-backup schedule. Settings are persisted as a JSON document under the
//! `settings` storage key; anything missing falls back to the defaults.

use crate::storage::{keys, read_json, write_json, StorageAdapter};
use crate::types::LedgerError;
use clap::ValueEnum;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    System,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Prefix used when rendering amounts
    pub currency_symbol: String,

    pub theme: Theme,

    /// Seconds between automatic backups
    pub backup_interval_secs: u64,

    /// Number of backups retained, newest first
    pub max_backups: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency_symbol: "$".to_string(),
            theme: Theme::Light,
            backup_interval_secs: 300,
            max_backups: 5,
        }
    }
}

impl Settings {
    /// Load persisted settings, or the defaults if none were saved
    ///
    /// Zero-valued backup settings are replaced by their defaults with a
    /// warning rather than rejected.
    pub fn load(storage: &dyn StorageAdapter) -> Result<Self, LedgerError> {
        let settings: Settings = read_json(storage, keys::SETTINGS)?.unwrap_or_default();
        Ok(settings.normalized())
    }

    pub fn save(&self, storage: &dyn StorageAdapter) -> Result<(), LedgerError> {
        write_json(storage, keys::SETTINGS, self)
    }

    pub fn backup_interval(&self) -> Duration {
        Duration::from_secs(self.backup_interval_secs)
    }

    /// Render an amount with the currency symbol and two decimals
    pub fn format_amount(&self, amount: Decimal) -> String {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        if rounded.is_sign_negative() && !rounded.is_zero() {
            format!("-{}{:.2}", self.currency_symbol, rounded.abs())
        } else {
            format!("{}{:.2}", self.currency_symbol, rounded.abs())
        }
    }

    fn normalized(mut self) -> Self {
        let default = Settings::default();
        if self.backup_interval_secs == 0 {
            warn!(
                "Invalid backup_interval_secs (0), using default ({})",
                default.backup_interval_secs
            );
            self.backup_interval_secs = default.backup_interval_secs;
        }
        if self.max_backups == 0 {
            warn!("Invalid max_backups (0), using default ({})", default.max_backups);
            self.max_backups = default.max_backups;
        }
        self
    }
}
