//! Entry and summary display formatting

use crate::models::Entry;
use crate::reports::Summary;

/// Format entry details for display
pub fn format_entry_details(entry: &Entry, currency_symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("  ID:          {}\n", entry.id));
    output.push_str(&format!("  Date:        {}\n", entry.date));
    output.push_str(&format!("  Description: {}\n", entry.description));
    output.push_str(&format!("  Kind:        {}\n", entry.kind));
    output.push_str(&format!(
        "  Amount:      {}\n",
        entry.amount.format_with_symbol(currency_symbol)
    ));

    output
}

/// Format the ledger summary block
pub fn format_summary(summary: &Summary, currency_symbol: &str) -> String {
    let line = |label: &str, amount: crate::models::Money| {
        format!("{:<18}{:>14}\n", label, amount.format_with_symbol(currency_symbol))
    };

    let mut output = String::new();
    output.push_str("Ledger Summary\n");
    output.push_str(&"=".repeat(32));
    output.push('\n');
    output.push_str(&line("Starting Balance:", summary.starting_balance));
    output.push_str(&line("Total Income:", summary.total_income));
    output.push_str(&line("Total Expenses:", summary.total_expenses));
    output.push_str(&"-".repeat(32));
    output.push('\n');
    output.push_str(&line("Final Balance:", summary.final_balance));

    output
}
