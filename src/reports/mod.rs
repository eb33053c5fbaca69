//! Reports module for pension-ledger
//!
//! Balance derivation over the ledger and the register built on top of it.

pub mod balance;
pub mod register;

pub use balance::{derive_view, summarize, DerivedEntry, Summary};
pub use register::{RegisterReport, RegisterRow};
