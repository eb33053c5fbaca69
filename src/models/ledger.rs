//! Ledger model: the starting balance plus every recorded entry
//!
//! Entries are kept in insertion order. Chronological presentation is the
//! job of [`crate::reports::balance`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::entry::Entry;
use super::ids::EntryId;
use super::money::Money;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ledger {
    #[serde(default)]
    pub starting_balance: Money,

    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Ledger {
    /// Create an empty ledger with the given starting balance
    pub fn new(starting_balance: Money) -> Self {
        Self {
            starting_balance,
            entries: Vec::new(),
        }
    }

    pub fn with_entries(starting_balance: Money, entries: Vec<Entry>) -> Self {
        Self {
            starting_balance,
            entries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn position(&self, id: EntryId) -> Option<usize> {
        self.entries.iter().position(|e| e.id == id)
    }

    /// Entries whose id matches a full UUID or a short `ent-` fragment
    pub fn find_matching(&self, identifier: &str) -> Vec<&Entry> {
        self.entries
            .iter()
            .filter(|e| e.id.matches(identifier))
            .collect()
    }

    /// Drop entries whose id already appeared earlier, keeping the first
    ///
    /// Returns how many entries were removed.
    pub fn dedup_ids(&mut self) -> usize {
        let before = self.entries.len();
        let mut seen = HashSet::new();
        self.entries.retain(|e| seen.insert(e.id));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EntryKind;
    use chrono::NaiveDate;

    fn entry(day: u32, cents: i64) -> Entry {
        Entry::new(
            NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            format!("Entry {}", day),
            Money::from_cents(cents),
            EntryKind::Expense,
        )
    }

    #[test]
    fn test_lookup() {
        let first = entry(1, 100);
        let second = entry(2, 200);
        let ledger = Ledger::with_entries(Money::zero(), vec![first.clone(), second.clone()]);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get(second.id), Some(&second));
        assert_eq!(ledger.position(first.id), Some(0));
        assert_eq!(ledger.position(EntryId::new()), None);
    }

    #[test]
    fn test_dedup_ids_keeps_first() {
        let first = entry(1, 100);
        let mut duplicate = entry(2, 999);
        duplicate.id = first.id;
        let mut ledger = Ledger::with_entries(Money::zero(), vec![first.clone(), duplicate]);

        assert_eq!(ledger.dedup_ids(), 1);
        assert_eq!(ledger.entries, vec![first]);
    }

    #[test]
    fn test_snapshot_field_names() {
        let ledger = Ledger::new(Money::from_cents(100000));
        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json["startingBalance"], 100000);
        assert!(json["entries"].as_array().unwrap().is_empty());

        let parsed: Ledger = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, Ledger::default());
    }
}
