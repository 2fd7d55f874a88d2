use std::{fs, path::PathBuf, process};

use clap::Parser;
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use damage_ledger::api::{AppState, create_router};
use damage_ledger::config::ConfigLoader;
use damage_ledger::error::LedgerError;
use damage_ledger::ledger::import_json;

/// Serves the damage ledger over HTTP.
#[derive(Debug, Parser)]
#[command(name = "damage-ledger", version, about)]
struct Args {
    /// Ledger configuration file.
    #[arg(long, env = "DAMAGE_LEDGER_CONFIG", default_value = "./config/ledger.yaml")]
    config: PathBuf,

    /// Address to listen on.
    #[arg(long, env = "DAMAGE_LEDGER_BIND", default_value = "127.0.0.1:3000")]
    bind: String,

    /// Saved state to import on startup.
    #[arg(long, env = "DAMAGE_LEDGER_STATE")]
    state: Option<PathBuf>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error("failed to read state file {path}: {source}")]
    StateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = run(Args::parse()).await {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        warn!("Tracing subscriber already set; skipping re-initialization.");
    }
}

async fn run(args: Args) -> Result<(), AppError> {
    let loader = ConfigLoader::load(&args.config)?;
    info!(config = %args.config.display(), "Loaded configuration");

    let mut store = loader.store();
    if let Some(path) = &args.state {
        let json = fs::read_to_string(path).map_err(|source| AppError::StateFile {
            path: path.clone(),
            source,
        })?;
        let report = import_json(&mut store, &json)?;
        info!(
            state = %path.display(),
            employees = report.employees,
            defaulted = ?report.defaulted,
            "Imported saved state"
        );
    }

    let state = AppState::new(store, loader.parser_chain()?);
    let listener = TcpListener::bind(&args.bind)
        .await
        .map_err(|source| AppError::Bind {
            addr: args.bind.clone(),
            source,
        })?;
    info!(addr = %args.bind, "Listening");

    axum::serve(listener, create_router(state))
        .await
        .map_err(AppError::Serve)
}
