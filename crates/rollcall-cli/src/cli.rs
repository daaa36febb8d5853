use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rollcall")]
#[command(about = "Scan attendance QR codes and submit them, online or offline")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local ledger database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Submit one scanned token (bare digits or a URL with token=<digits>)
    Submit {
        /// Scanned QR payload
        token: String,
        /// Roll number to submit for (defaults to the saved one)
        #[arg(short, long, value_name = "ID")]
        roll: Option<String>,
    },
    /// Read scanned QR payloads from stdin, one per line, and submit each
    Scan {
        /// Roll number to submit for (defaults to the saved one)
        #[arg(short, long, value_name = "ID")]
        roll: Option<String>,
    },
    /// Retry submissions saved while offline
    Sync {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List recent attendance records
    History {
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show attendance statistics
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or clear the offline queue
    Queue {
        #[command(subcommand)]
        command: Option<QueueCommands>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show, set, or clear the saved roll number
    Roll {
        #[command(subcommand)]
        command: Option<RollCommands>,
    },
    /// Configure the attendance server
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum QueueCommands {
    /// Drop every queued submission without sending it
    Clear,
}

#[derive(Subcommand)]
pub enum RollCommands {
    /// Save a roll number as the default
    Set {
        /// Roll number
        value: String,
    },
    /// Forget the saved roll number
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,
    /// Initialize or update the config file
    Init {
        /// Attendance server base URL
        #[arg(long, value_name = "URL")]
        server_url: Option<String>,
        /// Request timeout in seconds
        #[arg(long, value_name = "SECS")]
        timeout_secs: Option<u64>,
        /// Quiet window after an accepted scan, in milliseconds
        #[arg(long, value_name = "MS")]
        scan_window_ms: Option<u64>,
    },
}
