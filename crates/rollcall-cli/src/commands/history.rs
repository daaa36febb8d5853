use std::path::Path;

use rollcall_core::util::unix_millis_now;

use crate::commands::common::{
    format_history_lines, open_ledger, record_to_history_item, HistoryItem,
};
use crate::error::CliError;

pub fn run_history(limit: usize, as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let ledger = open_ledger(db_path)?;
    let mut records = ledger.history()?;
    records.truncate(limit);

    if as_json {
        let now = unix_millis_now();
        let json_items = records
            .iter()
            .map(|record| record_to_history_item(record, now))
            .collect::<Vec<HistoryItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No attendance records yet. Scan a QR code to get started.");
        return Ok(());
    }

    for line in format_history_lines(&records) {
        println!("{line}");
    }
    Ok(())
}
