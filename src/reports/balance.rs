//! Balance derivation
//!
//! Pure projections over a [`Ledger`]: the chronological view with a running
//! balance attached to every entry, and the order-independent summary.
//! Neither function mutates the ledger and neither result is ever persisted.

use serde::Serialize;

use crate::models::{Entry, EntryKind, Ledger, Money};

/// An entry together with the balance after applying it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DerivedEntry<'a> {
    pub entry: &'a Entry,
    /// Starting balance plus every entry up to and including this one
    pub running_balance: Money,
}

/// Aggregate totals over the whole ledger
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub starting_balance: Money,
    /// Sum of income amounts, never negative
    pub total_income: Money,
    /// Sum of expense amounts, never negative
    pub total_expenses: Money,
    /// `starting_balance + total_income - total_expenses`; may be negative
    pub final_balance: Money,
}

impl Summary {
    /// Income minus expenses over the ledger
    pub fn net_change(&self) -> Money {
        self.total_income - self.total_expenses
    }
}

/// Sort entries by date and attach the running balance to each one
///
/// The sort is stable, so entries sharing a date keep their insertion order
/// and the running balances come out the same on every call.
pub fn derive_view(ledger: &Ledger) -> Vec<DerivedEntry<'_>> {
    let mut sorted: Vec<&Entry> = ledger.entries.iter().collect();
    sorted.sort_by_key(|e| e.date);

    let mut balance = ledger.starting_balance;
    sorted
        .into_iter()
        .map(|entry| {
            balance += entry.signed_amount();
            DerivedEntry {
                entry,
                running_balance: balance,
            }
        })
        .collect()
}

/// Compute totals and the final balance
pub fn summarize(ledger: &Ledger) -> Summary {
    let total_for = |kind: EntryKind| -> Money {
        ledger
            .entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| e.amount)
            .sum()
    };

    let total_income = total_for(EntryKind::Income);
    let total_expenses = total_for(EntryKind::Expense);

    Summary {
        starting_balance: ledger.starting_balance,
        total_income,
        total_expenses,
        final_balance: ledger.starting_balance + total_income - total_expenses,
    }
}
