use std::path::Path;
use std::time::Instant;

use rollcall_core::config::ClientConfig;
use rollcall_core::{ScanGate, SubmissionSession};

use crate::commands::common::{
    apply_roll_number, build_client, ensure_accepted, format_outcome_lines, open_ledger,
    reconcile_quietly,
};
use crate::error::CliError;

pub async fn run_submit(token: &str, roll: Option<String>, db_path: &Path) -> Result<(), CliError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(CliError::EmptyToken);
    }

    let config = ClientConfig::load()?;
    let ledger = open_ledger(db_path)?;
    let client = build_client(&config)?;

    let mut session =
        SubmissionSession::new(&ledger, &client, ScanGate::new(config.scan_quiet_window()));
    apply_roll_number(&mut session, roll)?;

    reconcile_quietly(&ledger, &client).await;

    session.on_scan(token, Instant::now());
    if let Some(outcome) = session.submit().await {
        ensure_accepted(&outcome)?;
        for line in format_outcome_lines(&outcome) {
            println!("{line}");
        }
    }
    Ok(())
}
