//! Report CLI commands
//!
//! Register listing, summary, CSV export and the audit history.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::PathBuf;

use crate::audit::AuditLogger;
use crate::config::{LedgerPaths, Settings};
use crate::display::format_summary;
use crate::error::{LedgerError, LedgerResult};
use crate::reports::RegisterReport;
use crate::services::EntryStore;

pub fn handle_list(store: &EntryStore, settings: &Settings) -> LedgerResult<()> {
    let report = RegisterReport::generate(store.ledger());
    print!(
        "{}",
        report.format_terminal(&settings.date_format, &settings.currency_symbol)
    );
    Ok(())
}

pub fn handle_summary(store: &EntryStore, settings: &Settings) -> LedgerResult<()> {
    print!("{}", format_summary(&store.summary(), &settings.currency_symbol));
    println!("Entries: {}", store.entries().len());
    Ok(())
}

/// Write the register as CSV to `output`, or to stdout
pub fn handle_export(store: &EntryStore, output: Option<PathBuf>) -> LedgerResult<()> {
    let report = RegisterReport::generate(store.ledger());

    match output {
        Some(path) => {
            let file = File::create(&path).map_err(|e| {
                LedgerError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            report.export_csv(BufWriter::new(file))?;
            println!(
                "Exported {} entries to: {}",
                report.rows.len(),
                path.display()
            );
        }
        None => report.export_csv(io::stdout().lock())?,
    }

    Ok(())
}

pub fn handle_history(paths: &LedgerPaths, count: usize) -> LedgerResult<()> {
    let logger = AuditLogger::new(paths.audit_log());
    let records = logger.read_recent(count)?;

    if records.is_empty() {
        println!("No history yet.");
        return Ok(());
    }

    for record in records {
        println!("{}", record.format_human_readable());
    }
    Ok(())
}
