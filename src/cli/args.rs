use crate::config::Theme;
use crate::types::{PaymentDirection, PaymentMethod, RelatedType};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Record payments and derive balances for a small business
#[derive(Parser, Debug)]
#[command(name = "bizledger")]
#[command(about = "Record payments and derive balances for a small business", long_about = None)]
pub struct CliArgs {
    /// Directory holding the JSON collections
    #[arg(
        long = "data-dir",
        value_name = "DIR",
        env = "BIZLEDGER_DATA_DIR",
        default_value = "bizledger-data",
        help = "Directory holding the persisted collections"
    )]
    pub data_dir: PathBuf,

    /// Default log filter when RUST_LOG is unset
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add, amend, delete or list payments
    #[command(subcommand)]
    Payment(PaymentCommand),

    /// Incoming, outgoing and balance for one related entity
    Summary(RelatedArgs),

    /// Chronological statement with running balance
    Statement(RelatedArgs),

    /// Remaining balance and status of an order
    OrderBalance {
        #[arg(value_name = "ORDER_ID")]
        order_id: String,
    },

    /// Headline figures
    Dashboard,

    /// Write the full state as JSON (stdout when no path is given)
    Export {
        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Replace collections from a full-state JSON document
    Import {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Confirm that existing collections will be replaced
        #[arg(long)]
        yes: bool,
    },

    /// Write one table as CSV (stdout when no path is given)
    ExportCsv {
        #[arg(value_name = "TABLE")]
        table: Table,

        #[arg(value_name = "OUTPUT")]
        output: Option<PathBuf>,
    },

    /// Local backups
    #[command(subcommand)]
    Backup(BackupCommand),

    /// Show or change presentation and backup settings
    #[command(subcommand)]
    Settings(SettingsCommand),
}

#[derive(Subcommand, Debug)]
pub enum PaymentCommand {
    Add(AddPaymentArgs),
    Update(UpdatePaymentArgs),
    Delete {
        #[arg(value_name = "PAYMENT_ID")]
        id: String,
    },
    List(ListPaymentArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RelatedArgs {
    #[arg(long = "related-id", value_name = "ID")]
    pub related_id: String,

    #[arg(long = "related-type", value_name = "TYPE", default_value = "customer")]
    pub related_type: RelatedType,
}

#[derive(Args, Debug, Clone)]
pub struct AddPaymentArgs {
    #[arg(long)]
    pub amount: Decimal,

    #[arg(long, default_value = "incoming")]
    pub direction: PaymentDirection,

    #[arg(long, default_value = "cash")]
    pub method: PaymentMethod,

    #[command(flatten)]
    pub related: RelatedArgs,

    /// RFC 3339 timestamp; defaults to now
    #[arg(long)]
    pub date: Option<DateTime<Utc>>,

    #[arg(long)]
    pub discount: Option<Decimal>,

    #[arg(long)]
    pub tax: Option<Decimal>,

    #[arg(long)]
    pub reference: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct UpdatePaymentArgs {
    #[arg(value_name = "PAYMENT_ID")]
    pub id: String,

    #[arg(long)]
    pub amount: Option<Decimal>,

    #[arg(long)]
    pub direction: Option<PaymentDirection>,

    #[arg(long)]
    pub method: Option<PaymentMethod>,

    #[arg(long)]
    pub date: Option<DateTime<Utc>>,

    /// Move the payment to another account
    #[arg(long = "related-id", value_name = "ID")]
    pub related_id: Option<String>,

    #[arg(long = "related-type", value_name = "TYPE")]
    pub related_type: Option<RelatedType>,

    #[arg(long)]
    pub discount: Option<Decimal>,

    #[arg(long)]
    pub tax: Option<Decimal>,

    #[arg(long)]
    pub reference: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ListPaymentArgs {
    #[arg(long = "related-id", value_name = "ID", requires = "related_type")]
    pub related_id: Option<String>,

    #[arg(long = "related-type", value_name = "TYPE")]
    pub related_type: Option<RelatedType>,

    #[arg(long, conflicts_with = "related_id")]
    pub direction: Option<PaymentDirection>,
}

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// Take a backup now
    Run,
    /// List stored backups, newest first
    List,
    /// Replace all collections with a stored backup
    Restore {
        #[arg(value_name = "BACKUP_ID")]
        backup_id: String,
    },
    /// Take backups on the configured interval until interrupted
    Watch {
        /// Override the configured interval
        #[arg(long = "interval-secs", value_name = "SECS")]
        interval_secs: Option<u64>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,
    /// Change one or more settings and save them
    Set(SettingsArgs),
}

#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = true)]
pub struct SettingsArgs {
    #[arg(long = "currency-symbol", value_name = "SYMBOL")]
    pub currency_symbol: Option<String>,

    #[arg(long, value_enum)]
    pub theme: Option<Theme>,

    #[arg(
        long = "backup-interval-secs",
        value_name = "SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub backup_interval_secs: Option<u64>,

    #[arg(long = "max-backups", value_name = "COUNT", value_parser = positive_count)]
    pub max_backups: Option<usize>,
}

fn positive_count(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(format!("`{}` is not a positive whole number", value)),
    }
}

/// Tables available for CSV export
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Table {
    Customers,
    Products,
    Bills,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_add_payment_parsing() {
        let parsed = CliArgs::try_parse_from([
            "bizledger",
            "--data-dir",
            "/tmp/books",
            "payment",
            "add",
            "--amount",
            "12.50",
            "--direction",
            "outgoing",
            "--method",
            "bank",
            "--related-id",
            "s1",
            "--related-type",
            "supplier",
        ])
        .unwrap();

        assert_eq!(parsed.data_dir, PathBuf::from("/tmp/books"));
        match parsed.command {
            Command::Payment(PaymentCommand::Add(add)) => {
                assert_eq!(add.amount, Decimal::new(1250, 2));
                assert_eq!(add.direction, PaymentDirection::Outgoing);
                assert_eq!(add.method, PaymentMethod::Bank);
                assert_eq!(add.related.related_type, RelatedType::Supplier);
                assert!(add.date.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_add_payment_defaults() {
        let parsed = CliArgs::try_parse_from([
            "bizledger", "payment", "add", "--amount", "5", "--related-id", "c1",
        ])
        .unwrap();

        let Command::Payment(PaymentCommand::Add(add)) = parsed.command else {
            panic!("expected payment add");
        };
        assert_eq!(add.direction, PaymentDirection::Incoming);
        assert_eq!(add.method, PaymentMethod::Cash);
        assert_eq!(add.related.related_type, RelatedType::Customer);
    }

    #[rstest]
    #[case::customers("customers", Table::Customers)]
    #[case::products("products", Table::Products)]
    #[case::bills("bills", Table::Bills)]
    fn test_export_csv_table(#[case] name: &str, #[case] expected: Table) {
        let parsed = CliArgs::try_parse_from(["bizledger", "export-csv", name]).unwrap();
        match parsed.command {
            Command::ExportCsv { table, output } => {
                assert_eq!(table, expected);
                assert!(output.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[rstest]
    #[case::missing_command(&["bizledger"])]
    #[case::bad_amount(&["bizledger", "payment", "add", "--amount", "lots", "--related-id", "c1"])]
    #[case::bad_direction(&["bizledger", "payment", "add", "--amount", "1", "--direction", "sideways", "--related-id", "c1"])]
    #[case::missing_related(&["bizledger", "summary"])]
    #[case::bad_table(&["bizledger", "export-csv", "payments"])]
    #[case::settings_without_changes(&["bizledger", "settings", "set"])]
    #[case::zero_max_backups(&["bizledger", "settings", "set", "--max-backups", "0"])]
    #[case::zero_interval(&["bizledger", "settings", "set", "--backup-interval-secs", "0"])]
    #[case::direction_and_related(&["bizledger", "payment", "list", "--related-id", "c1", "--related-type", "customer", "--direction", "incoming"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }

    #[test]
    fn test_update_payment_accepts_every_field() {
        let parsed = CliArgs::try_parse_from([
            "bizledger",
            "payment",
            "update",
            "p1",
            "--related-id",
            "s9",
            "--related-type",
            "supplier",
            "--discount",
            "1.50",
            "--tax",
            "0.25",
        ])
        .unwrap();

        let Command::Payment(PaymentCommand::Update(update)) = parsed.command else {
            panic!("expected payment update");
        };
        assert_eq!(update.id, "p1");
        assert_eq!(update.related_id.as_deref(), Some("s9"));
        assert_eq!(update.related_type, Some(RelatedType::Supplier));
        assert_eq!(update.discount, Some(Decimal::new(150, 2)));
        assert_eq!(update.tax, Some(Decimal::new(25, 2)));
        assert!(update.amount.is_none());
    }

    #[test]
    fn test_settings_set_parsing() {
        let parsed = CliArgs::try_parse_from([
            "bizledger", "settings", "set", "--theme", "dark", "--max-backups", "3",
        ])
        .unwrap();

        let Command::Settings(SettingsCommand::Set(set)) = parsed.command else {
            panic!("expected settings set");
        };
        assert_eq!(set.theme, Some(Theme::Dark));
        assert_eq!(set.max_backups, Some(3));
        assert!(set.currency_symbol.is_none());
    }

    #[test]
    fn test_import_requires_explicit_yes_flag() {
        let parsed = CliArgs::try_parse_from(["bizledger", "import", "state.json"]).unwrap();
        assert!(matches!(parsed.command, Command::Import { yes: false, .. }));
    }
}
