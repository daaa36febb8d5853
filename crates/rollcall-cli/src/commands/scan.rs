use std::path::Path;
use std::time::Instant;

use rollcall_core::config::ClientConfig;
use rollcall_core::{ScanGate, SubmissionSession};
use tokio::io::{self, AsyncBufReadExt, BufReader};

use crate::commands::common::{
    apply_roll_number, build_client, format_outcome_lines, open_ledger, reconcile_quietly,
};
use crate::error::CliError;

/// Submit every accepted scan read from stdin until EOF.
///
/// Pipe a barcode reader in raw mode into this command; repeated reads of
/// the same code inside the quiet window are dropped.
pub async fn run_scan(roll: Option<String>, db_path: &Path) -> Result<(), CliError> {
    let config = ClientConfig::load()?;
    let ledger = open_ledger(db_path)?;
    let client = build_client(&config)?;

    let mut session =
        SubmissionSession::new(&ledger, &client, ScanGate::new(config.scan_quiet_window()));
    apply_roll_number(&mut session, roll)?;

    reconcile_quietly(&ledger, &client).await;

    eprintln!("Waiting for scans for {} (Ctrl-D to stop)", session.roll_number());

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let payload = line.trim();
        if !session.on_scan(payload, Instant::now()) {
            tracing::debug!("Ignored scan inside quiet window");
            continue;
        }

        if let Some(outcome) = session.submit().await {
            for line in format_outcome_lines(&outcome) {
                println!("{line}");
            }
        }
    }

    Ok(())
}
