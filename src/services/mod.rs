//! Service layer for pension-ledger
//!
//! The service layer sits on top of storage: it validates input, keeps the
//! in-memory ledger authoritative and talks to the advice endpoint.

pub mod advice;
pub mod entry;

pub use advice::{AdviceRequester, AdviceTicket};
pub use entry::EntryStore;
