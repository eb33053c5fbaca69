//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod entry;
pub mod report;

use std::path::PathBuf;

use clap::Subcommand;

use crate::audit::AuditLogger;
use crate::config::settings::mask_secret;
use crate::config::{LedgerPaths, Settings};
use crate::error::{LedgerError, LedgerResult};
use crate::services::{AdviceRequester, EntryStore};
use crate::storage::Persistence;

#[derive(Subcommand)]
pub enum Commands {
    /// Record a new entry (an expense unless --income is given)
    Add {
        /// What the money was for, e.g. "Groceries"
        description: String,
        /// Positive amount, e.g. "42.50"
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Entry date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Record as income instead of an expense
        #[arg(short, long)]
        income: bool,
    },

    /// Show every entry in date order with the running balance
    #[command(alias = "ls")]
    List,

    /// Change fields of an existing entry
    Edit {
        /// Entry ID (full or the short ent-xxxxxxxx form)
        id: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(short, long)]
        amount: Option<String>,
        /// New date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,
        /// income or expense
        #[arg(short, long)]
        kind: Option<String>,
    },

    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry ID (full or the short ent-xxxxxxxx form)
        id: String,
    },

    /// Set the balance the ledger starts from
    Balance {
        /// Amount, may be negative
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },

    /// Show totals and the final balance
    Summary,

    /// Ask for a short money-saving tip based on the ledger
    Advice,

    /// Export the register as CSV
    Export {
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show recent changes from the audit log
    History {
        /// Number of records to show
        #[arg(short = 'n', long, default_value = "20")]
        count: usize,
    },

    /// Show current configuration and paths
    Config,
}

/// Run one command
///
/// The ledger is only loaded for commands that work on it, so `history`
/// and `config` never touch the remote backend.
pub async fn run(command: Commands, paths: &LedgerPaths, settings: &Settings) -> LedgerResult<()> {
    match command {
        Commands::History { count } => return report::handle_history(paths, count),
        Commands::Config => return handle_config(paths, settings),
        _ => {}
    }

    let persistence = Persistence::from_settings(paths, settings);
    let loaded = EntryStore::load_initial(persistence).await;
    print_warnings(&loaded.warnings);
    let mut store = loaded.value.with_audit(AuditLogger::new(paths.audit_log()));

    handle_command(&mut store, paths, settings, command).await
}

/// Dispatch a command against an already loaded store
pub async fn handle_command(
    store: &mut EntryStore,
    paths: &LedgerPaths,
    settings: &Settings,
    command: Commands,
) -> LedgerResult<()> {
    match command {
        Commands::Add {
            description,
            amount,
            date,
            income,
        } => entry::handle_add(store, settings, description, amount, date, income).await,
        Commands::List => report::handle_list(store, settings),
        Commands::Edit {
            id,
            description,
            amount,
            date,
            kind,
        } => entry::handle_edit(store, settings, id, description, amount, date, kind).await,
        Commands::Delete { id } => entry::handle_delete(store, id).await,
        Commands::Balance { amount } => entry::handle_balance(store, settings, amount),
        Commands::Summary => report::handle_summary(store, settings),
        Commands::Advice => handle_advice(store, settings).await,
        Commands::Export { output } => report::handle_export(store, output),
        Commands::History { count } => report::handle_history(paths, count),
        Commands::Config => handle_config(paths, settings),
    }
}

async fn handle_advice(store: &EntryStore, settings: &Settings) -> LedgerResult<()> {
    let requester = AdviceRequester::from_settings(&settings.advice);
    let ticket = requester.begin();
    let text = requester
        .request_advice(store.entries(), &store.summary())
        .await;

    if let Some(text) = requester.settle(ticket, text) {
        println!("{}", text);
    }
    Ok(())
}

pub fn handle_config(paths: &LedgerPaths, settings: &Settings) -> LedgerResult<()> {
    let persistence = Persistence::from_settings(paths, settings);

    println!("Pension Ledger Configuration");
    println!("============================");
    println!("Base directory: {}", paths.base_dir().display());
    println!("Snapshot file:  {}", paths.snapshot_file().display());
    println!("Audit log:      {}", paths.audit_log().display());
    println!("Settings file:  {}", paths.settings_file().display());
    println!();
    println!("Settings:");
    println!("  Currency symbol: {}", settings.currency_symbol);
    println!("  Date format:     {}", settings.date_format);
    println!("  Backend:         {}", persistence.backend().name());
    println!(
        "  Remote URL:      {}",
        settings.remote.url.as_deref().unwrap_or("(not set)")
    );
    println!("  Remote key:      {}", masked(settings.remote.key.as_deref()));
    println!("  Advice model:    {}", settings.advice.model);
    println!("  Advice URL:      {}", settings.advice.base_url);
    println!("  Advice key:      {}", masked(settings.advice.key.as_deref()));
    Ok(())
}

fn masked(secret: Option<&str>) -> String {
    match secret {
        Some(secret) if !secret.trim().is_empty() => mask_secret(secret),
        _ => "(not set)".to_string(),
    }
}

/// Print degraded-persistence warnings to stderr
pub fn print_warnings(warnings: &[LedgerError]) {
    for warning in warnings {
        eprintln!("warning: {}", warning);
    }
}
