use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pension_ledger::cli::{self, Commands};
use pension_ledger::config::{LedgerPaths, Settings};

#[derive(Parser)]
#[command(
    name = "pension",
    version,
    about = "Income and expense ledger for pensioners",
    long_about = "Pension Ledger records income and expense entries, shows a running \
                  balance in date order and can ask for a short money-saving tip. \
                  Entries are kept in a local snapshot and, when configured, mirrored \
                  to a cloud database."
)]
struct Cli {
    /// Show debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let paths = LedgerPaths::new()?;
    let mut settings = Settings::load_or_create(&paths)?;
    if !paths.settings_file().exists() {
        if let Err(e) = settings.save(&paths) {
            tracing::warn!(error = %e, "could not write default settings");
        }
    }
    settings.apply_env_overrides();

    match args.command {
        Some(command) => cli::run(command, &paths, &settings).await?,
        None => {
            println!("Pension Ledger - income and expenses with a running balance");
            println!();
            println!("Run 'pension --help' for usage information.");
            println!("Run 'pension add \"Pension\" 1500 --income' to record your first entry.");
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("pension_ledger=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
