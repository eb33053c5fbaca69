//! Storage layer for pension-ledger
//!
//! The ledger always lives in a local JSON snapshot. When a cloud database is
//! configured, entries are additionally mirrored to it and loaded from it at
//! startup. The backend is chosen once, when [`Persistence`] is built, and
//! never re-checked per call.

pub mod file_io;
pub mod local;
pub mod remote;

pub use file_io::{read_json, write_json_atomic};
pub use local::LocalBackend;
pub use remote::{RemoteBackend, RemoteRow};

use crate::config::{LedgerPaths, Settings};
use crate::error::{LedgerError, LedgerResult};
use crate::models::entry::MAX_AMOUNT;
use crate::models::{Entry, EntryId, Ledger, Money};

/// Which store entries are mirrored to besides the local snapshot
#[derive(Debug, Clone)]
pub enum Backend {
    Remote(RemoteBackend),
    Local,
}

impl Backend {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Remote(_) => "remote",
            Self::Local => "local",
        }
    }
}

/// Result of an operation that completed locally, plus any degraded
/// persistence it ran into along the way
#[derive(Debug)]
pub struct Persisted<T> {
    pub value: T,
    pub warnings: Vec<LedgerError>,
}

impl<T> Persisted<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    /// Whether every backend accepted the change
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn push_warning(&mut self, warning: LedgerError) {
        self.warnings.push(warning);
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Persisted<U> {
        Persisted {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}

/// Persistence adapter used by the entry store
#[derive(Debug, Clone)]
pub struct Persistence {
    local: LocalBackend,
    backend: Backend,
}

impl Persistence {
    pub fn new(local: LocalBackend, backend: Backend) -> Self {
        Self { local, backend }
    }

    pub fn local_only(local: LocalBackend) -> Self {
        Self::new(local, Backend::Local)
    }

    /// Select the backend from configuration
    pub fn from_settings(paths: &LedgerPaths, settings: &Settings) -> Self {
        let local = LocalBackend::new(paths.snapshot_file());
        let backend = match RemoteBackend::from_settings(&settings.remote) {
            Some(remote) => {
                tracing::debug!("Using remote backend at {}", remote.table_url());
                Backend::Remote(remote)
            }
            None => {
                tracing::debug!("Remote backend not configured, using local snapshot only");
                Backend::Local
            }
        };
        Self::new(local, backend)
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    pub fn local(&self) -> &LocalBackend {
        &self.local
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.backend, Backend::Remote(_))
    }

    /// Load the ledger for a new session
    ///
    /// Tries the remote store first when one is configured, then the local
    /// snapshot, and finally falls back to an empty ledger. Never fails; any
    /// problem along the way is reported as a warning. The starting balance
    /// always comes from the local snapshot.
    pub async fn load(&self) -> Persisted<Ledger> {
        let mut warnings = Vec::new();

        let snapshot = match self.local.load() {
            Ok(Some(mut snapshot)) => {
                drop_invalid_snapshot_data(&mut snapshot, &mut warnings);
                Some(snapshot)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Ignoring unreadable local snapshot: {e}");
                warnings.push(e);
                if self.local.path().exists() {
                    match self.local.set_aside() {
                        Ok(moved) => {
                            tracing::warn!("Unreadable snapshot kept at {}", moved.display())
                        }
                        Err(e) => {
                            tracing::warn!("{e}");
                            warnings.push(e);
                        }
                    }
                }
                None
            }
        };

        if let Backend::Remote(remote) = &self.backend {
            match remote.list().await {
                Ok(entries) => {
                    let starting_balance = snapshot
                        .as_ref()
                        .map(|s| s.starting_balance)
                        .unwrap_or_default();
                    let mut ledger = Ledger::with_entries(starting_balance, entries);
                    drop_duplicate_ids(&mut ledger);

                    if let Err(e) = self.local.save(&ledger) {
                        tracing::warn!("Could not refresh local snapshot: {e}");
                        warnings.push(e);
                    }
                    return Persisted {
                        value: ledger,
                        warnings,
                    };
                }
                Err(e) => {
                    tracing::warn!("Remote load failed, falling back to local snapshot: {e}");
                    warnings.push(e);
                }
            }
        }

        let mut ledger = snapshot.unwrap_or_default();
        drop_duplicate_ids(&mut ledger);
        Persisted {
            value: ledger,
            warnings,
        }
    }

    /// Write the local snapshot
    pub fn save_local(&self, ledger: &Ledger) -> LedgerResult<()> {
        self.local.save(ledger)
    }

    /// Mirror a new entry to the remote store, if any
    pub async fn insert(&self, entry: &Entry) -> LedgerResult<()> {
        match &self.backend {
            Backend::Remote(remote) => remote
                .insert(entry)
                .await
                .map_err(|e| remote_failure("insert", e)),
            Backend::Local => Ok(()),
        }
    }

    /// Mirror an edited entry to the remote store, if any
    pub async fn update(&self, entry: &Entry) -> LedgerResult<()> {
        match &self.backend {
            Backend::Remote(remote) => remote
                .update(entry)
                .await
                .map_err(|e| remote_failure("update", e)),
            Backend::Local => Ok(()),
        }
    }

    /// Mirror a deletion to the remote store, if any
    pub async fn delete(&self, id: EntryId) -> LedgerResult<()> {
        match &self.backend {
            Backend::Remote(remote) => remote
                .delete(id)
                .await
                .map_err(|e| remote_failure("delete", e)),
            Backend::Local => Ok(()),
        }
    }
}

fn remote_failure(operation: &str, err: LedgerError) -> LedgerError {
    let err = match err {
        LedgerError::BackendUnavailable(msg) => {
            LedgerError::BackendUnavailable(format!("remote {} failed: {}", operation, msg))
        }
        other => other,
    };
    tracing::warn!("{err}; change kept locally");
    err
}

/// Remove snapshot entries that break the entry rules and reset an
/// out-of-range starting balance, reporting each as a warning
fn drop_invalid_snapshot_data(ledger: &mut Ledger, warnings: &mut Vec<LedgerError>) {
    ledger.entries.retain(|entry| match entry.validate() {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("Skipping snapshot entry {}: {e}", entry.id);
            warnings.push(LedgerError::Storage(format!(
                "skipped invalid snapshot entry {}: {}",
                entry.id, e
            )));
            false
        }
    });

    if ledger.starting_balance.abs() > MAX_AMOUNT {
        let e = LedgerError::Storage(format!(
            "starting balance {} is out of range; using {}",
            ledger.starting_balance,
            Money::zero()
        ));
        tracing::warn!("{e}");
        warnings.push(e);
        ledger.starting_balance = Money::zero();
    }
}

fn drop_duplicate_ids(ledger: &mut Ledger) {
    let removed = ledger.dedup_ids();
    if removed > 0 {
        tracing::warn!("Dropped {removed} entries with duplicate ids");
    }
}
