use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] rollcall_core::Error),
    #[error(transparent)]
    Transport(#[from] rollcall_core::TransportError),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Scanned token cannot be empty")]
    EmptyToken,
    #[error("Roll number cannot be empty")]
    EmptyRollNumber,
    #[error("No roll number provided. Pass --roll or run `rollcall roll set <ID>` first.")]
    MissingRollNumber,
    #[error("Submission rejected by server: {0}")]
    Rejected(String),
}
