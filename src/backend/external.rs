//! External key-value service adapter
//!
//! Wraps a client for a remote cache-like service. The wire protocol belongs
//! to the client; this module only maps the service's conventions onto the
//! backend contract. The service reports a missing key with an empty answer
//! rather than an error, and this adapter turns that into `KeyNotFound`.

use super::{ensure_key, Backend, Keys};
use crate::error::{ConfVaultError, Result};
use crate::value::Value;
use tracing::debug;

/// Pattern matching every key
pub const ALL_KEYS: &str = "*";

/// Minimal capability set of a remote key-value service
#[cfg_attr(test, mockall::automock)]
pub trait KeyValueClient {
    /// Stored text, or `None`/empty when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: &str) -> Result<bool>;

    /// Number of keys removed
    fn delete(&self, key: &str) -> Result<u64>;

    fn keys(&self, pattern: &str) -> Result<Vec<String>>;

    fn count(&self) -> Result<usize>;

    /// Remove every key in the current database
    fn flush(&self) -> Result<()>;
}

pub struct ExternalBackend<C: KeyValueClient> {
    client: C,
}

impl<C: KeyValueClient> ExternalBackend<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn into_client(self) -> C {
        self.client
    }

    /// Bulk-clear the service. Not part of the universal backend contract.
    pub fn flush(&mut self) -> Result<()> {
        debug!("FLUSH external store");
        self.client.flush()
    }
}

impl<C: KeyValueClient> Backend for ExternalBackend<C> {
    fn kind(&self) -> &'static str {
        "external"
    }

    fn get(&self, key: &str) -> Result<Value> {
        match self.client.get(key)? {
            Some(text) if !text.is_empty() => Ok(Value::Str(text)),
            _ => Err(ConfVaultError::key_not_found(key)),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        ensure_key(key)?;
        let text = value.to_text();
        debug!("SET {} = {}", key, text);
        if !self.client.set(key, &text)? {
            return Err(ConfVaultError::service(format!(
                "service refused to store '{key}'"
            )));
        }
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.client.delete(key)? == 0 {
            return Err(ConfVaultError::key_not_found(key));
        }
        debug!("DELETE {}", key);
        Ok(())
    }

    fn keys(&self) -> Result<Keys<'_>> {
        Ok(Box::new(self.client.keys(ALL_KEYS)?.into_iter()))
    }

    fn len(&self) -> Result<usize> {
        self.client.count()
    }
}
