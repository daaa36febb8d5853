//! Local ledger storage for Rollcall

mod connection;
mod ledger;
mod migrations;
mod store;

pub use connection::SqliteStore;
pub use ledger::Ledger;
pub use store::{KeyValueStore, MemoryStore};

#[cfg(test)]
pub(crate) use store::testing;
