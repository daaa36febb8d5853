use std::path::Path;

use rollcall_core::config::ClientConfig;
use rollcall_core::Reconciler;

use crate::commands::common::{build_client, open_ledger};
use crate::error::CliError;

pub async fn run_sync(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let config = ClientConfig::load()?;
    let ledger = open_ledger(db_path)?;
    let client = build_client(&config)?;

    let report = Reconciler::new(&ledger, &client).reconcile().await;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.processed == 0 && report.failed == 0 {
        println!("Offline queue is empty");
    } else {
        println!(
            "Sync completed: {} submitted, {} failed",
            report.processed, report.failed
        );
    }
    Ok(())
}
