//! Pension Ledger - income and expense tracking for pensioners
//!
//! Records income and expense entries, derives a running balance in date
//! order, keeps everything in a local snapshot (optionally mirrored to a
//! cloud database) and can ask a generative endpoint for a short tip.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Entries, the ledger, money and ids
//! - `reports`: Running balance view, summary and register
//! - `storage`: Local snapshot, remote table backend and the adapter over both
//! - `services`: Entry store and advice requests
//! - `audit`: Audit logging system
//! - `cli` / `display`: Command handlers and terminal formatting
//!
//! # Example
//!
//! ```rust,ignore
//! use pension_ledger::config::{LedgerPaths, Settings};
//! use pension_ledger::services::EntryStore;
//! use pension_ledger::storage::Persistence;
//!
//! let paths = LedgerPaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let loaded = EntryStore::load_initial(Persistence::from_settings(&paths, &settings)).await;
//! let summary = loaded.value.summary();
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
