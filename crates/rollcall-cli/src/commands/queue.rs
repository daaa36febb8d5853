use std::path::Path;

use crate::cli::QueueCommands;
use crate::commands::common::{format_queue_lines, open_ledger};
use crate::error::CliError;

pub fn run_queue(
    command: Option<QueueCommands>,
    as_json: bool,
    db_path: &Path,
) -> Result<(), CliError> {
    let ledger = open_ledger(db_path)?;

    if let Some(QueueCommands::Clear) = command {
        let dropped = ledger.offline_queue()?.len();
        ledger.clear_offline_queue()?;
        println!("Dropped {dropped} queued submission(s)");
        return Ok(());
    }

    let queue = ledger.offline_queue()?;
    if as_json {
        println!("{}", serde_json::to_string_pretty(&queue)?);
        return Ok(());
    }

    if queue.is_empty() {
        println!("Offline queue is empty");
        return Ok(());
    }

    for line in format_queue_lines(&queue) {
        println!("{line}");
    }
    Ok(())
}
