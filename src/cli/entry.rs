//! Entry CLI commands
//!
//! Adding, editing and deleting entries, and setting the starting balance.

use chrono::NaiveDate;

use super::print_warnings;
use crate::config::Settings;
use crate::display::format_entry_details;
use crate::error::{LedgerError, LedgerResult};
use crate::models::entry::{parse_amount, parse_balance, parse_date};
use crate::models::{EntryKind, EntryUpdate, NewEntry};
use crate::services::EntryStore;

pub async fn handle_add(
    store: &mut EntryStore,
    settings: &Settings,
    description: String,
    amount: String,
    date: Option<String>,
    income: bool,
) -> LedgerResult<()> {
    let kind = if income {
        EntryKind::Income
    } else {
        EntryKind::Expense
    };
    let date = match date {
        Some(date) => date,
        None => today().to_string(),
    };

    let input = NewEntry::parse(&description, &amount, &date, kind)?;
    let added = store.add_entry(input).await?;
    print_warnings(&added.warnings);

    println!("Added entry:");
    print!("{}", format_entry_details(&added.value, &settings.currency_symbol));
    println!(
        "Balance: {}",
        store
            .summary()
            .final_balance
            .format_with_symbol(&settings.currency_symbol)
    );
    Ok(())
}

pub async fn handle_edit(
    store: &mut EntryStore,
    settings: &Settings,
    id: String,
    description: Option<String>,
    amount: Option<String>,
    date: Option<String>,
    kind: Option<String>,
) -> LedgerResult<()> {
    let entry_id = store.find(&id)?.id;

    let mut changes = EntryUpdate::new();
    if let Some(description) = description {
        changes = changes.description(description);
    }
    if let Some(amount) = amount {
        changes = changes.amount(parse_amount(&amount)?);
    }
    if let Some(date) = date {
        changes = changes.date(parse_date(&date)?);
    }
    if let Some(kind) = kind {
        changes = changes.kind(kind.parse()?);
    }

    if changes.is_empty() {
        return Err(LedgerError::Validation(
            "Nothing to change. Pass --description, --amount, --date or --kind".into(),
        ));
    }

    let updated = store.update_entry(entry_id, changes).await?;
    print_warnings(&updated.warnings);

    println!("Updated entry:");
    print!("{}", format_entry_details(&updated.value, &settings.currency_symbol));
    Ok(())
}

/// Delete an entry; an id that matches nothing is not an error
pub async fn handle_delete(store: &mut EntryStore, id: String) -> LedgerResult<()> {
    let entry_id = match store.find(&id) {
        Ok(entry) => entry.id,
        Err(e) if e.is_not_found() => {
            println!("No entry matches '{}'; nothing deleted.", id);
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let removed = store.remove_entry(entry_id).await;
    print_warnings(&removed.warnings);

    if let Some(entry) = removed.value {
        println!(
            "Deleted entry: {} ({} {})",
            entry.id, entry.date, entry.description
        );
    }
    Ok(())
}

pub fn handle_balance(store: &mut EntryStore, settings: &Settings, amount: String) -> LedgerResult<()> {
    let amount = parse_balance(&amount)?;

    let result = store.set_starting_balance(amount);
    print_warnings(&result.warnings);

    println!(
        "Starting balance set to {}",
        result.value.format_with_symbol(&settings.currency_symbol)
    );
    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
