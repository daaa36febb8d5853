use std::path::Path;

use rollcall_core::util::normalize_text_option;

use crate::cli::RollCommands;
use crate::commands::common::open_ledger;
use crate::error::CliError;

pub fn run_roll(command: Option<RollCommands>, db_path: &Path) -> Result<(), CliError> {
    let ledger = open_ledger(db_path)?;

    match command {
        Some(RollCommands::Set { value }) => {
            let value = normalize_text_option(Some(value)).ok_or(CliError::EmptyRollNumber)?;
            ledger.save_roll_number(&value)?;
            println!("Saved roll number {value}");
        }
        Some(RollCommands::Clear) => {
            ledger.clear_roll_number()?;
            println!("Cleared saved roll number");
        }
        None => match ledger.roll_number()? {
            Some(roll_number) => println!("{roll_number}"),
            None => println!("No roll number saved"),
        },
    }
    Ok(())
}
