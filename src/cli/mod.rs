// CLI module
// Command-line interface, argument parsing and command dispatch

mod args;
mod commands;

pub use args::{
    AddPaymentArgs, BackupCommand, CliArgs, Command, ListPaymentArgs, PaymentCommand,
    RelatedArgs, SettingsArgs, SettingsCommand, Table, UpdatePaymentArgs,
};
pub use commands::execute;

use clap::Parser;

/// Parse command-line arguments using clap
///
/// If parsing fails (invalid arguments, missing subcommand, or `--help`),
/// clap prints the error or help text and exits the process.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
