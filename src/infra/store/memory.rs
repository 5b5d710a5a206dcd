use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::usecase::ports::store::{OverrideStore, StoreError};

/// In-memory stand-in for the SQLite store, used by tests and available for
/// ephemeral profiles.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

#[allow(dead_code)]
impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideStore for MemoryStore {
    fn init(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn get_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StoreError::Message("store mutex poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StoreError::Message("store mutex poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self, key: &str) -> Result<(), StoreError> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| StoreError::Message("store mutex poisoned".to_string()))?;
        values.remove(key);
        Ok(())
    }
}
