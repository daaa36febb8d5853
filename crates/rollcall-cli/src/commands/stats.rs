use std::path::Path;

use crate::commands::common::{format_stats_lines, open_ledger};
use crate::error::CliError;

pub fn run_stats(as_json: bool, db_path: &Path) -> Result<(), CliError> {
    let ledger = open_ledger(db_path)?;
    let stats = ledger.stats()?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    if let Some(roll_number) = ledger.roll_number()? {
        println!("Roll number:     {roll_number}");
    }
    for line in format_stats_lines(&stats) {
        println!("{line}");
    }
    Ok(())
}
