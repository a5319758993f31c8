//! Storage backends
//!
//! Every backend implements [`Backend`]. Durable backends additionally expose
//! [`Syncable`] and backends that record per-entry timestamps expose
//! [`TimestampAware`]; callers ask for these capabilities explicitly through
//! [`Backend::syncable`] and [`Backend::timestamps`].
//!
//! None of the backends coordinate between processes. Two writers sharing a
//! file or a service will race and the last rewrite wins.

pub mod external;
pub mod flat_file;
pub mod memory;
pub mod ordered_file;
pub mod structured;

pub use external::{ExternalBackend, KeyValueClient};
pub use flat_file::FlatFileBackend;
pub use memory::MemoryBackend;
pub use ordered_file::OrderedFileBackend;
pub use structured::StructuredBackend;

use crate::error::{ConfVaultError, Result};
use crate::value::Value;

/// Lazy, finite sequence of keys. Every call to [`Backend::keys`] starts a new one.
pub type Keys<'a> = Box<dyn Iterator<Item = String> + 'a>;

/// Contract shared by all storage backends
pub trait Backend {
    /// Short backend name used in log lines
    fn kind(&self) -> &'static str;

    /// Fetch a value, failing with `KeyNotFound` when absent
    fn get(&self, key: &str) -> Result<Value>;

    /// Insert or replace a value
    fn set(&mut self, key: &str, value: Value) -> Result<()>;

    /// Remove a value, failing with `KeyNotFound` when absent
    fn delete(&mut self, key: &str) -> Result<()>;

    fn keys(&self) -> Result<Keys<'_>>;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn contains(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(e) if e.is_key_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Fetch a value, returning `default` instead of failing when absent
    fn get_or(&self, key: &str, default: Value) -> Result<Value> {
        match self.get(key) {
            Ok(value) => Ok(value),
            Err(e) if e.is_key_not_found() => Ok(default),
            Err(e) => Err(e),
        }
    }

    /// Sync/close capability, if this backend has a durable medium
    fn syncable(&mut self) -> Option<&mut dyn Syncable> {
        None
    }

    /// Timestamp capability, if this backend records modification times
    fn timestamps(&self) -> Option<&dyn TimestampAware> {
        None
    }

    /// Flush to the durable medium or fail with `Unsupported`
    fn try_sync(&mut self) -> Result<()> {
        match self.syncable() {
            Some(durable) => durable.sync(),
            None => Err(ConfVaultError::unsupported("sync")),
        }
    }

    /// Release the durable medium or fail with `Unsupported`
    fn try_close(&mut self) -> Result<()> {
        match self.syncable() {
            Some(durable) => durable.close(),
            None => Err(ConfVaultError::unsupported("close")),
        }
    }

    /// Stored modification time, or `None` when timestamps are not recorded
    fn modified_at(&self, key: &str) -> Result<Option<f64>> {
        match self.timestamps() {
            Some(stamped) => stamped.last_modified(key).map(Some),
            None => Ok(None),
        }
    }
}

/// Backends with a durable medium that buffers or owns resources
pub trait Syncable {
    /// Write the in-process state to the durable medium
    fn sync(&mut self) -> Result<()>;

    /// Release the medium. What later calls do is backend-specific.
    fn close(&mut self) -> Result<()>;
}

/// Backends that record when each entry was last modified
pub trait TimestampAware {
    fn last_modified(&self, key: &str) -> Result<f64>;
}

/// Reject keys a durable backend cannot store
pub(crate) fn ensure_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(ConfVaultError::invalid_key(key, "key must not be empty"));
    }
    Ok(())
}

impl<B: Backend + ?Sized> Backend for &mut B {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn get(&self, key: &str) -> Result<Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Keys<'_>> {
        (**self).keys()
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }

    fn contains(&self, key: &str) -> Result<bool> {
        (**self).contains(key)
    }

    fn syncable(&mut self) -> Option<&mut dyn Syncable> {
        (**self).syncable()
    }

    fn timestamps(&self) -> Option<&dyn TimestampAware> {
        (**self).timestamps()
    }
}

impl<B: Backend + ?Sized> Backend for Box<B> {
    fn kind(&self) -> &'static str {
        (**self).kind()
    }

    fn get(&self, key: &str) -> Result<Value> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        (**self).set(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn keys(&self) -> Result<Keys<'_>> {
        (**self).keys()
    }

    fn len(&self) -> Result<usize> {
        (**self).len()
    }

    fn contains(&self, key: &str) -> Result<bool> {
        (**self).contains(key)
    }

    fn syncable(&mut self) -> Option<&mut dyn Syncable> {
        (**self).syncable()
    }

    fn timestamps(&self) -> Option<&dyn TimestampAware> {
        (**self).timestamps()
    }
}
