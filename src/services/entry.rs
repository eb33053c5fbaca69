//! Entry store
//!
//! Owns the session's ledger and is the only place it is mutated. Every
//! mutation is applied in memory first, then written to the local snapshot
//! and mirrored to the remote backend. Persistence problems never undo a
//! change; they come back to the caller as warnings on [`Persisted`].

use serde_json::{json, Value};

use crate::audit::{generate_diff, AuditEntry, AuditLogger, EntityType};
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Entry, EntryId, EntryUpdate, Ledger, Money, NewEntry};
use crate::reports::{derive_view, summarize, DerivedEntry, Summary};
use crate::storage::{Persisted, Persistence};

pub struct EntryStore {
    ledger: Ledger,
    persistence: Persistence,
    audit: Option<AuditLogger>,
}

impl EntryStore {
    /// Wrap an already loaded ledger
    pub fn new(ledger: Ledger, persistence: Persistence) -> Self {
        Self {
            ledger,
            persistence,
            audit: None,
        }
    }

    /// Load the session's ledger through `persistence`
    ///
    /// Never fails: an unreachable remote falls back to the local snapshot,
    /// and no data at all yields an empty ledger with a zero starting balance.
    pub async fn load_initial(persistence: Persistence) -> Persisted<Self> {
        let loaded = persistence.load().await;
        loaded.map(|ledger| Self::new(ledger, persistence))
    }

    /// Record every mutation in `logger`
    pub fn with_audit(mut self, logger: AuditLogger) -> Self {
        self.audit = Some(logger);
        self
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    pub fn persistence(&self) -> &Persistence {
        &self.persistence
    }

    /// Entries in insertion order
    pub fn entries(&self) -> &[Entry] {
        &self.ledger.entries
    }

    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.ledger.get(id)
    }

    /// Resolve a full id or an unambiguous short `ent-` prefix
    pub fn find(&self, identifier: &str) -> LedgerResult<&Entry> {
        match self.ledger.find_matching(identifier).as_slice() {
            [entry] => Ok(*entry),
            [] => Err(LedgerError::entry_not_found(identifier)),
            _ => Err(LedgerError::Validation(format!(
                "'{}' matches more than one entry; use more characters of the id",
                identifier
            ))),
        }
    }

    /// Chronological view with running balances
    pub fn view(&self) -> Vec<DerivedEntry<'_>> {
        derive_view(&self.ledger)
    }

    pub fn summary(&self) -> Summary {
        summarize(&self.ledger)
    }

    /// Validate and append a new entry
    pub async fn add_entry(&mut self, input: NewEntry) -> LedgerResult<Persisted<Entry>> {
        input.validate()?;

        let entry = input.into_entry();
        self.ledger.entries.push(entry.clone());
        tracing::debug!("Added entry {} ({})", entry.id, entry.description);

        let mut result = Persisted::new(entry.clone());
        self.save_local(&mut result);
        if let Err(e) = self.persistence.insert(&entry).await {
            result.push_warning(e);
        }

        self.record(AuditEntry::create(
            EntityType::Entry,
            entry.id.to_string(),
            Some(entry.description.clone()),
            &entry,
        ));

        Ok(result)
    }

    /// Apply `changes` to the entry with `id`
    ///
    /// Fails with `NotFound` for an unknown id and with `Validation` when the
    /// merged entry would be invalid; in both cases nothing changes.
    pub async fn update_entry(
        &mut self,
        id: EntryId,
        changes: EntryUpdate,
    ) -> LedgerResult<Persisted<Entry>> {
        let index = self
            .ledger
            .position(id)
            .ok_or_else(|| LedgerError::entry_not_found(id.to_string()))?;

        let before = self.ledger.entries[index].clone();
        let updated = changes.apply_to(&before);
        updated.validate()?;

        self.ledger.entries[index] = updated.clone();
        tracing::debug!("Updated entry {}", id);

        let mut result = Persisted::new(updated.clone());
        self.save_local(&mut result);
        if let Err(e) = self.persistence.update(&updated).await {
            result.push_warning(e);
        }

        let diff = generate_diff(&audit_fields(&before), &audit_fields(&updated));
        self.record(AuditEntry::update(
            EntityType::Entry,
            id.to_string(),
            Some(updated.description.clone()),
            &before,
            &updated,
            diff,
        ));

        Ok(result)
    }

    /// Remove the entry with `id`; removing an absent id is a no-op
    ///
    /// The value is the removed entry, if there was one.
    pub async fn remove_entry(&mut self, id: EntryId) -> Persisted<Option<Entry>> {
        let Some(index) = self.ledger.position(id) else {
            tracing::debug!("Entry {} already absent", id);
            return Persisted::new(None);
        };

        let removed = self.ledger.entries.remove(index);
        tracing::debug!("Removed entry {}", id);

        let mut result = Persisted::new(());
        self.save_local(&mut result);
        if let Err(e) = self.persistence.delete(id).await {
            result.push_warning(e);
        }

        self.record(AuditEntry::delete(
            EntityType::Entry,
            id.to_string(),
            Some(removed.description.clone()),
            &removed,
        ));

        result.map(|()| Some(removed))
    }

    /// Change the balance the running total starts from
    ///
    /// Kept in the local snapshot only.
    pub fn set_starting_balance(&mut self, amount: Money) -> Persisted<Money> {
        let before = self.ledger.starting_balance;
        self.ledger.starting_balance = amount;

        let mut result = Persisted::new(amount);
        self.save_local(&mut result);

        if before != amount {
            self.record(AuditEntry::update(
                EntityType::StartingBalance,
                "ledger",
                None,
                &before,
                &amount,
                Some(format!("{} -> {}", before, amount)),
            ));
        }

        result
    }

    fn save_local<T>(&self, result: &mut Persisted<T>) {
        if let Err(e) = self.persistence.save_local(&self.ledger) {
            tracing::warn!("Could not write local snapshot: {e}");
            result.push_warning(e);
        }
    }

    fn record(&self, entry: AuditEntry) {
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log(&entry) {
                tracing::warn!("Could not write audit log: {e}");
            }
        }
    }
}

/// The user-facing fields of an entry, rendered the way the CLI shows them
fn audit_fields(entry: &Entry) -> Value {
    json!({
        "date": entry.date.to_string(),
        "description": entry.description,
        "amount": entry.amount.to_string(),
        "kind": entry.kind.to_string(),
    })
}
