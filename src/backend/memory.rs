//! In-memory backend
//!
//! The reference implementation of the backend contract. Values are kept as
//! handed in (no stringification), nothing is persisted and there is no
//! sync, close or timestamp support.

use super::{Backend, Keys};
use crate::error::{ConfVaultError, Result};
use crate::value::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    store: HashMap<String, Value>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Backend for MemoryBackend {
    fn kind(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Value> {
        self.store
            .get(key)
            .cloned()
            .ok_or_else(|| ConfVaultError::key_not_found(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.store.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.store
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| ConfVaultError::key_not_found(key))
    }

    fn keys(&self) -> Result<Keys<'_>> {
        Ok(Box::new(self.store.keys().cloned()))
    }

    fn len(&self) -> Result<usize> {
        Ok(self.store.len())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.store.contains_key(key))
    }
}
