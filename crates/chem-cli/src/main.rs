//! Binary entry point wiring ingestion, persistence, and prediction
//! orchestration into the four subcommands of spec §4 (`ingest`, `search`,
//! `predict`, `predict-status`), with exit codes per spec §6. Grounded on
//! `oolonek-lotus-o3`'s `main.rs` (`env_logger` init, `clap::Parser::parse`,
//! flat dispatch below `main`).

mod cli;
mod commands;
mod config;
mod context;
mod enricher;
mod error;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;

use cli::{Cli, Command};
use config::CONFIG;
use error::CliError;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_default_env().format_target(false)
                                            .format_timestamp_secs()
                                            .filter_level(log::LevelFilter::Info)
                                            .try_init()
                                            .ok();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let pool = chem_persistence::build_pool(&CONFIG.database.url, CONFIG.database.min_connections,
                                             CONFIG.database.max_connections).await?;
    let molecule_store = Arc::new(chem_persistence::PgMoleculeStore::new(pool.clone()));
    let fingerprint_index = Arc::new(chem_persistence::PgFingerprintIndex::new(pool.clone()));

    match cli.command {
        Command::Ingest(args) => commands::ingest::run(args, molecule_store, pool).await,
        Command::Search(args) => commands::search::run(args, molecule_store, fingerprint_index).await,
        Command::Predict(args) => commands::predict::run(args, molecule_store, pool).await,
        Command::PredictStatus(args) => commands::predict_status::run(args, molecule_store, pool).await,
    }
}
