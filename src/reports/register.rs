//! Ledger register report
//!
//! Renders the chronological view with running balances for the terminal
//! and exports it as CSV.

use std::fmt::Write as _;
use std::io::Write;

use chrono::NaiveDate;

use super::balance::{derive_view, summarize, Summary};
use crate::error::{LedgerError, LedgerResult};
use crate::models::entry::DATE_FORMAT;
use crate::models::{EntryId, EntryKind, Ledger, Money};

/// A single row in the register
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterRow {
    pub id: EntryId,
    pub date: NaiveDate,
    pub description: String,
    pub kind: EntryKind,
    /// Signed amount (expenses negative)
    pub amount: Money,
    pub running_balance: Money,
}

/// Register report over a whole ledger
#[derive(Debug, Clone)]
pub struct RegisterReport {
    pub rows: Vec<RegisterRow>,
    pub summary: Summary,
}

impl RegisterReport {
    /// Build the register from the current ledger state
    pub fn generate(ledger: &Ledger) -> Self {
        let rows = derive_view(ledger)
            .into_iter()
            .map(|derived| RegisterRow {
                id: derived.entry.id,
                date: derived.entry.date,
                description: derived.entry.description.clone(),
                kind: derived.entry.kind,
                amount: derived.entry.signed_amount(),
                running_balance: derived.running_balance,
            })
            .collect();

        Self {
            rows,
            summary: summarize(ledger),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Format the report for terminal display
    ///
    /// Dates use `date_format` (strftime); a pattern chrono cannot render
    /// falls back to `YYYY-MM-DD`.
    pub fn format_terminal(&self, date_format: &str, currency_symbol: &str) -> String {
        let mut output = String::new();

        output.push_str("Ledger Register\n");
        output.push_str(&"=".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "Starting Balance: {}\n\n",
            self.summary.starting_balance.format_with_symbol(currency_symbol)
        ));

        if self.rows.is_empty() {
            output.push_str("No entries yet.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<12} {:<12} {:<26} {:<8} {:>12} {:>12}\n",
            "ID", "Date", "Description", "Kind", "Amount", "Balance"
        ));
        output.push_str(&"-".repeat(80));
        output.push('\n');

        for row in &self.rows {
            output.push_str(&format!(
                "{:<12} {:<12} {:<26} {:<8} {:>12} {:>12}\n",
                row.id.short(),
                format_date(row.date, date_format),
                truncate(&row.description, 26),
                row.kind,
                row.amount.format_with_symbol(currency_symbol),
                row.running_balance.format_with_symbol(currency_symbol)
            ));
        }

        output.push_str(&"-".repeat(80));
        output.push('\n');
        output.push_str(&format!(
            "Total Income: {}  |  Total Expenses: {}  |  Final Balance: {}\n",
            self.summary.total_income.format_with_symbol(currency_symbol),
            self.summary.total_expenses.format_with_symbol(currency_symbol),
            self.summary.final_balance.format_with_symbol(currency_symbol)
        ));

        output
    }

    /// Export the register to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> LedgerResult<()> {
        let mut out = csv::Writer::from_writer(writer);

        out.write_record([
            "ID",
            "Date",
            "Description",
            "Kind",
            "Amount",
            "Running Balance",
        ])
        .map_err(|e| LedgerError::Export(e.to_string()))?;

        for row in &self.rows {
            out.write_record([
                row.id.as_uuid().to_string(),
                row.date.to_string(),
                row.description.clone(),
                row.kind.as_str().to_string(),
                format!("{:.2}", row.amount.to_major()),
                format!("{:.2}", row.running_balance.to_major()),
            ])
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        }

        out.flush()
            .map_err(|e| LedgerError::Export(e.to_string()))?;
        Ok(())
    }
}

fn format_date(date: NaiveDate, date_format: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", date.format(date_format)) {
        Ok(()) => out,
        Err(_) => date.format(DATE_FORMAT).to_string(),
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
