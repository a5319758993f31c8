//! Key-ordered file backend
//!
//! Stores a JSON object whose keys are kept in sorted order. Every `set` and
//! `delete` rewrites the file immediately. Once closed the backend refuses
//! all further operations with `InvalidState`.

use super::{ensure_key, Backend, Keys, Syncable};
use crate::error::{ConfVaultError, Result};
use crate::utils::fs::{read_existing, write_atomic};
use crate::value::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
pub struct OrderedFileBackend {
    path: PathBuf,
    store: BTreeMap<String, String>,
    closed: bool,
}

impl OrderedFileBackend {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let store = match read_existing(&path)? {
            Some(contents) => serde_json::from_str(&contents)
                .map_err(|e| ConfVaultError::corrupt_file(&path, e.to_string()))?,
            None => BTreeMap::new(),
        };

        info!("Opened ordered file store {}", path.display());
        Ok(Self {
            path,
            store,
            closed: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(ConfVaultError::invalid_state(format!(
                "store {} has been closed",
                self.path.display()
            )));
        }
        Ok(())
    }

    fn persist(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.store)?;
        write_atomic(&self.path, &contents)
    }
}

impl Backend for OrderedFileBackend {
    fn kind(&self) -> &'static str {
        "ordered-file"
    }

    fn get(&self, key: &str) -> Result<Value> {
        self.ensure_open()?;
        self.store
            .get(key)
            .map(|text| Value::Str(text.clone()))
            .ok_or_else(|| ConfVaultError::key_not_found(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        self.ensure_open()?;
        ensure_key(key)?;
        debug!("SET {} = {}", key, value);
        self.store.insert(key.to_string(), value.to_text());
        self.persist()
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        self.ensure_open()?;
        if self.store.remove(key).is_none() {
            return Err(ConfVaultError::key_not_found(key));
        }
        debug!("DELETE {}", key);
        self.persist()
    }

    fn keys(&self) -> Result<Keys<'_>> {
        self.ensure_open()?;
        Ok(Box::new(self.store.keys().cloned()))
    }

    fn len(&self) -> Result<usize> {
        self.ensure_open()?;
        Ok(self.store.len())
    }

    fn syncable(&mut self) -> Option<&mut dyn Syncable> {
        Some(self)
    }
}

impl Syncable for OrderedFileBackend {
    fn sync(&mut self) -> Result<()> {
        self.ensure_open()?;
        self.persist()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.persist()?;
        self.closed = true;
        info!("Closed ordered file store {}", self.path.display());
        Ok(())
    }
}
