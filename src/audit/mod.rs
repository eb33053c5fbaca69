//! Audit trail for pension-ledger
//!
//! Every change to the ledger (entry created, edited or deleted, starting
//! balance changed) is appended to `audit.log` with before/after values.
//!
//! - `AuditEntry`: one record with timestamp, operation and entity details
//! - `AuditLogger`: appends records as JSON lines and reads them back
//! - `generate_diff`: summarizes which fields changed in an update

mod diff;
mod entry;
mod logger;

pub use diff::generate_diff;
pub use entry::{AuditEntry, EntityType, Operation};
pub use logger::AuditLogger;
