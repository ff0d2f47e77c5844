//! Command dispatch
//!
//! Each subcommand runs against an open [`LedgerEngine`] and writes its
//! human-readable result to the supplied writer, so the whole CLI surface can
//! be exercised in tests without touching stdout.

use super::args::{
    AddPaymentArgs, BackupCommand, Command, ListPaymentArgs, PaymentCommand, SettingsArgs,
    SettingsCommand, Table, UpdatePaymentArgs,
};
use crate::config::Settings;
use crate::core::backup::{spawn_scheduler, BackupOutcome, BackupService};
use crate::core::LedgerEngine;
use crate::io::csv_export::{write_bills_csv, write_customers_csv, write_products_csv};
use crate::types::{LedgerError, NewPayment, Payment, PaymentUpdate};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::sync::Arc;
use tracing::info;

/// Run one parsed command
///
/// # Errors
///
/// Returns the first error raised by the engine, storage or output writer.
/// Unknown payment ids on update/delete are reported on `output`, not as
/// errors.
pub fn execute(
    command: Command,
    engine: &mut LedgerEngine,
    settings: &Settings,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    match command {
        Command::Payment(cmd) => execute_payment(cmd, engine, settings, output),
        Command::Summary(related) => {
            let summary = engine.account_summary(&related.related_id, related.related_type);
            writeln!(output, "Incoming: {}", settings.format_amount(summary.total_incoming))?;
            writeln!(output, "Outgoing: {}", settings.format_amount(summary.total_outgoing))?;
            writeln!(output, "Balance:  {}", settings.format_amount(summary.balance))?;
            Ok(())
        }
        Command::Statement(related) => {
            for line in engine.account_statement(&related.related_id, related.related_type) {
                writeln!(
                    output,
                    "{}  {:<8}  {:>12}  {:>12}  {}",
                    line.date.format("%Y-%m-%d"),
                    line.direction,
                    settings.format_amount(line.amount),
                    settings.format_amount(line.running_balance),
                    line.reference.unwrap_or_default()
                )?;
            }
            Ok(())
        }
        Command::OrderBalance { order_id } => {
            let balance = engine.order_balance(&order_id)?;
            writeln!(output, "Total:     {}", settings.format_amount(balance.total))?;
            writeln!(output, "Discount:  {}", settings.format_amount(balance.discount))?;
            writeln!(output, "Paid:      {}", settings.format_amount(balance.net_paid))?;
            writeln!(output, "Remaining: {}", settings.format_amount(balance.remaining))?;
            writeln!(output, "Status:    {}", balance.status)?;
            Ok(())
        }
        Command::Dashboard => {
            let stats = engine.dashboard();
            writeln!(output, "Customers:        {}", stats.customers)?;
            writeln!(
                output,
                "Products:         {} ({} low on stock)",
                stats.products, stats.low_stock_products
            )?;
            writeln!(output, "Bills:            {} ({} open)", stats.bills, stats.open_bills)?;
            writeln!(output, "Sales:            {}", settings.format_amount(stats.total_sales))?;
            writeln!(
                output,
                "Receivables:      {}",
                settings.format_amount(stats.outstanding_receivables)
            )?;
            writeln!(
                output,
                "Payables:         {}",
                settings.format_amount(stats.outstanding_payables)
            )?;
            writeln!(output, "Pending orders:   {}", stats.pending_orders)?;
            writeln!(
                output,
                "Cash in/out/net:  {} / {} / {}",
                settings.format_amount(stats.cash_flow.total_incoming),
                settings.format_amount(stats.cash_flow.total_outgoing),
                settings.format_amount(stats.cash_flow.balance)
            )?;
            writeln!(
                output,
                "Cash book:        {} / {} / {}",
                settings.format_amount(stats.cash_book.total_incoming),
                settings.format_amount(stats.cash_book.total_outgoing),
                settings.format_amount(stats.cash_book.balance)
            )?;
            Ok(())
        }
        Command::Export { output: path } => {
            let text = engine.export_snapshot()?.to_json()?;
            match path {
                Some(path) => {
                    fs::write(&path, text)?;
                    info!(path = %path.display(), "state exported");
                }
                None => writeln!(output, "{}", text)?,
            }
            Ok(())
        }
        Command::Import { input, yes } => {
            let text = fs::read_to_string(&input)?;
            let report = engine.import_document(&text, yes)?;
            writeln!(
                output,
                "Imported {} records into {}",
                report.records,
                report.replaced.join(", ")
            )?;
            Ok(())
        }
        Command::ExportCsv { table, output: path } => match path {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(&path)?);
                write_table(engine, table, &mut writer)?;
                writer.flush()?;
                Ok(())
            }
            None => write_table(engine, table, output),
        },
        Command::Backup(cmd) => execute_backup(cmd, engine, settings, output),
        Command::Settings(SettingsCommand::Show) => write_settings(settings, output),
        Command::Settings(SettingsCommand::Set(args)) => {
            let updated = apply_settings(settings, args);
            updated.save(engine.storage().as_ref())?;
            info!("settings saved");
            write_settings(&updated, output)
        }
    }
}

fn execute_payment(
    command: PaymentCommand,
    engine: &mut LedgerEngine,
    settings: &Settings,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    match command {
        PaymentCommand::Add(args) => {
            let id = engine.record_payment(new_payment(args))?;
            writeln!(output, "{}", id)?;
        }
        PaymentCommand::Update(args) => {
            let id = args.id.clone();
            if engine.amend_payment(&id, payment_update(args))? {
                writeln!(output, "Updated {}", id)?;
            } else {
                writeln!(output, "No payment with id {}", id)?;
            }
        }
        PaymentCommand::Delete { id } => {
            if engine.remove_payment(&id)? {
                writeln!(output, "Deleted {}", id)?;
            } else {
                writeln!(output, "No payment with id {}", id)?;
            }
        }
        PaymentCommand::List(args) => {
            for payment in list_payments(engine, &args) {
                write_payment_row(&payment, settings, output)?;
            }
        }
    }
    Ok(())
}

fn execute_backup(
    command: BackupCommand,
    engine: &mut LedgerEngine,
    settings: &Settings,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let backups = BackupService::new(engine.storage(), settings.max_backups);
    match command {
        BackupCommand::Run => match backups.run_once()? {
            BackupOutcome::Completed(summary) => {
                writeln!(output, "{}  {} records", summary.id, summary.records)?
            }
            BackupOutcome::Skipped => writeln!(output, "Backup already in progress")?,
        },
        BackupCommand::List => {
            for summary in backups.list_backups()? {
                writeln!(
                    output,
                    "{}  {}  {} records",
                    summary.id,
                    summary.created_at.to_rfc3339(),
                    summary.records
                )?;
            }
        }
        BackupCommand::Restore { backup_id } => {
            engine.restore_backup(&backups, &backup_id)?;
            writeln!(output, "Restored {}", backup_id)?;
        }
        BackupCommand::Watch { interval_secs } => {
            let period = interval_secs
                .filter(|secs| *secs > 0)
                .map(std::time::Duration::from_secs)
                .unwrap_or_else(|| settings.backup_interval());
            watch(Arc::new(backups), period)?;
        }
    }
    Ok(())
}

fn watch(backups: Arc<BackupService>, period: std::time::Duration) -> Result<(), LedgerError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async move {
        info!(interval_secs = period.as_secs(), "backup scheduler started");
        let handle = spawn_scheduler(backups, period);
        let stopped = tokio::signal::ctrl_c().await;
        handle.abort();
        info!("backup scheduler stopped");
        stopped
    })?;
    Ok(())
}

fn new_payment(args: AddPaymentArgs) -> NewPayment {
    NewPayment {
        date: args.date,
        amount: args.amount,
        direction: args.direction,
        method: args.method,
        related_id: args.related.related_id,
        related_type: args.related.related_type,
        discount: args.discount,
        tax: args.tax,
        reference: args.reference,
        notes: args.notes,
    }
}

fn payment_update(args: UpdatePaymentArgs) -> PaymentUpdate {
    PaymentUpdate {
        date: args.date,
        amount: args.amount,
        direction: args.direction,
        method: args.method,
        related_id: args.related_id,
        related_type: args.related_type,
        discount: args.discount,
        tax: args.tax,
        reference: args.reference,
        notes: args.notes,
    }
}

fn apply_settings(current: &Settings, args: SettingsArgs) -> Settings {
    let mut settings = current.clone();
    if let Some(symbol) = args.currency_symbol {
        settings.currency_symbol = symbol;
    }
    if let Some(theme) = args.theme {
        settings.theme = theme;
    }
    if let Some(secs) = args.backup_interval_secs {
        settings.backup_interval_secs = secs;
    }
    if let Some(count) = args.max_backups {
        settings.max_backups = count;
    }
    settings
}

fn write_settings(settings: &Settings, output: &mut dyn Write) -> Result<(), LedgerError> {
    writeln!(output, "Currency symbol:  {}", settings.currency_symbol)?;
    writeln!(output, "Theme:            {}", settings.theme.as_str())?;
    writeln!(output, "Backup interval:  {}s", settings.backup_interval_secs)?;
    writeln!(output, "Backups kept:     {}", settings.max_backups)?;
    Ok(())
}

fn list_payments(engine: &LedgerEngine, args: &ListPaymentArgs) -> Vec<Payment> {
    let store = engine.payments();
    match (&args.related_id, args.related_type, args.direction) {
        (Some(related_id), Some(related_type), _) => {
            store.get_payments_by_related(related_id, related_type)
        }
        (_, _, Some(direction)) => store.get_payments_by_direction(direction),
        _ => store.list().to_vec(),
    }
}

fn write_payment_row(
    payment: &Payment,
    settings: &Settings,
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    writeln!(
        output,
        "{}  {}  {:<8}  {:>12}  {:<6}  {}:{}",
        payment.id,
        payment.date.format("%Y-%m-%d"),
        payment.direction,
        settings.format_amount(payment.amount),
        payment.method,
        payment.related_type,
        payment.related_id
    )?;
    Ok(())
}

fn write_table(engine: &LedgerEngine, table: Table, output: &mut dyn Write) -> Result<(), LedgerError> {
    match table {
        Table::Customers => write_customers_csv(engine.customers().list(), output),
        Table::Products => write_products_csv(engine.products().list(), output),
        Table::Bills => write_bills_csv(engine.bills().list(), output),
    }
}
