//! Core data models for pension-ledger
//!
//! Entries, the ledger that owns them, and the money and id types they use.

pub mod entry;
pub mod ids;
pub mod ledger;
pub mod money;

pub use entry::{Entry, EntryKind, EntryUpdate, EntryValidationError, NewEntry};
pub use ids::EntryId;
pub use ledger::Ledger;
pub use money::{Money, MoneyParseError};
