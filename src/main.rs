//! Business ledger CLI
//!
//! Command-line interface for recording payments and reading balances from a
//! directory of JSON collections.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- payment add --amount 120.50 --related-id cust-1
//! cargo run -- --data-dir ./books summary --related-id cust-1
//! cargo run -- order-balance ord-7
//! cargo run -- export state.json
//! cargo run -- import state.json --yes
//! cargo run -- backup watch --interval-secs 60
//! ```
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (unreadable data directory, invalid amount, malformed import, etc.)

use bizledger::cli::{self, CliArgs};
use bizledger::{logging, FileStorage, LedgerEngine, LedgerError, Settings, StorageAdapter};
use std::process;
use std::sync::Arc;

fn main() {
    // Parse command-line arguments using clap
    let args = cli::parse_args();
    logging::init(&args.log_level);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<(), LedgerError> {
    let storage: Arc<dyn StorageAdapter> = Arc::new(FileStorage::open(&args.data_dir)?);
    let settings = Settings::load(storage.as_ref())?;
    let mut engine = LedgerEngine::open(storage)?;

    // Command output goes to stdout, logs to stderr
    let mut output = std::io::stdout();
    cli::execute(args.command, &mut engine, &settings, &mut output)
}
