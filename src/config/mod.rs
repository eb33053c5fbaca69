//! Configuration module for pension-ledger
//!
//! This module provides configuration management including:
//! - Data directory resolution
//! - User settings persistence and environment overrides

pub mod paths;
pub mod settings;

pub use paths::{LedgerPaths, SNAPSHOT_KEY};
pub use settings::{AdviceSettings, RemoteSettings, Settings};
