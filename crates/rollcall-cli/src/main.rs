//! Rollcall CLI - submit attendance QR scans from the terminal
//!
//! Scans that cannot reach the server are kept in a local ledger and replayed
//! on the next run.

mod cli;
mod commands;
mod error;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::common::resolve_db_path;
use crate::commands::config::run_config;
use crate::commands::history::run_history;
use crate::commands::queue::run_queue;
use crate::commands::roll::run_roll;
use crate::commands::scan::run_scan;
use crate::commands::stats::run_stats;
use crate::commands::submit::run_submit;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rollcall=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();
    let db_path = resolve_db_path(cli.db_path);

    match cli.command {
        Commands::Submit { token, roll } => run_submit(&token, roll, &db_path).await?,
        Commands::Scan { roll } => run_scan(roll, &db_path).await?,
        Commands::Sync { json } => run_sync(json, &db_path).await?,
        Commands::History { limit, json } => run_history(limit, json, &db_path)?,
        Commands::Stats { json } => run_stats(json, &db_path)?,
        Commands::Queue { command, json } => run_queue(command, json, &db_path)?,
        Commands::Roll { command } => run_roll(command, &db_path)?,
        Commands::Config { command } => run_config(command)?,
    }

    Ok(())
}
