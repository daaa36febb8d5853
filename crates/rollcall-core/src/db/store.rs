//! Raw key/value storage backing the ledger

use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Trait for the durable string store the ledger serializes into
pub trait KeyValueStore {
    /// Read the value stored under `key`, if any
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Replace the value stored under `key`
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; deleting a missing key is not an error
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// Non-durable store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| Error::Database("memory store lock poisoned".to_string()))
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.lock()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::KeyValueStore;
    use crate::error::{Error, Result};

    /// Store whose every operation fails, as a locked or full disk would
    pub struct FailingStore;

    impl KeyValueStore for FailingStore {
        fn get_item(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::Database("store unavailable".to_string()))
        }

        fn set_item(&self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::Database("store unavailable".to_string()))
        }

        fn remove_item(&self, _key: &str) -> Result<()> {
            Err(Error::Database("store unavailable".to_string()))
        }
    }
}
