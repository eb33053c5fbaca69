//! Local snapshot backend
//!
//! Stores the whole ledger (starting balance and entries) as one JSON blob
//! under the fixed application key. Read once at startup and rewritten after
//! every mutation.

use std::path::{Path, PathBuf};

use crate::error::LedgerResult;
use crate::models::Ledger;

use super::file_io::{move_aside, read_json, write_json_atomic};

#[derive(Debug, Clone)]
pub struct LocalBackend {
    path: PathBuf,
}

impl LocalBackend {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot; `Ok(None)` when nothing has been saved yet
    pub fn load(&self) -> LedgerResult<Option<Ledger>> {
        read_json(&self.path)
    }

    pub fn save(&self, ledger: &Ledger) -> LedgerResult<()> {
        write_json_atomic(&self.path, ledger)
    }

    /// Move an unreadable snapshot out of the way so the next save cannot
    /// overwrite it
    ///
    /// Returns where the file now lives.
    pub fn set_aside(&self) -> LedgerResult<PathBuf> {
        move_aside(&self.path, "corrupt")
    }
}
