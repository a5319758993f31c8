//! Config facade
//!
//! [`Config`] binds one backend, an option registry, a batch flag, a value
//! codec and a prompter. Lookups are split into an explicit found/not-found
//! step ([`Config::try_get`]) and a resolution step
//! ([`Config::resolve_option`]) that either substitutes a registered default
//! (batch mode) or runs the interactive prompt.

use super::options::{ConfigOption, OptionSpec};
use super::prompt::{ask, Prompter, TerminalPrompter};
use super::timestamped::{PlainCodec, ValueCodec};
use crate::backend::{Backend, Keys, MemoryBackend};
use crate::error::{ConfVaultError, Result};
use crate::utils::datetime::now_seconds;
use crate::value::Value;
use std::collections::HashSet;
use tracing::{debug, info};

pub struct Config<B: Backend = MemoryBackend> {
    backend: B,
    options: Vec<ConfigOption>,
    batch: bool,
    codec: Box<dyn ValueCodec>,
    prompter: Box<dyn Prompter>,
}

impl Config<MemoryBackend> {
    /// Config over a fresh in-memory backend
    pub fn memory() -> Self {
        Self::new(MemoryBackend::new())
    }
}

impl Default for Config<MemoryBackend> {
    fn default() -> Self {
        Self::memory()
    }
}

impl<B: Backend> Config<B> {
    /// Interactive config over `backend`, prompting on the terminal
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            options: Vec::new(),
            batch: false,
            codec: Box::new(PlainCodec),
            prompter: Box::new(TerminalPrompter::new()),
        }
    }

    pub fn with_batch(mut self, batch: bool) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_prompter<P: Prompter + 'static>(mut self, prompter: P) -> Self {
        self.prompter = Box::new(prompter);
        self
    }

    pub fn with_codec<C: ValueCodec + 'static>(mut self, codec: C) -> Self {
        self.codec = Box::new(codec);
        self
    }

    /// Decoded value if the backend has the key
    pub fn try_get(&self, key: &str) -> Result<Option<Value>> {
        match self.backend.get(key) {
            Ok(stored) => self.codec.decode(stored).map(Some),
            Err(e) if e.is_key_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Look up a key, falling back to its registered option when absent
    pub fn get(&mut self, key: &str) -> Result<Value> {
        match self.try_get(key)? {
            Some(value) => Ok(value),
            None => self.resolve_option(key),
        }
    }

    /// Look up a key, returning `default` when absent. Options are not consulted.
    pub fn get_or<V: Into<Value>>(&self, key: &str, default: V) -> Result<Value> {
        Ok(self.try_get(key)?.unwrap_or_else(|| default.into()))
    }

    /// Produce a value for a missing key from its registered option
    ///
    /// In batch mode the option's default is used, or the lookup fails with
    /// `BatchModeUnableToPrompt`. Otherwise the prompter is asked. The
    /// resolved value is stored before it is returned.
    pub fn resolve_option(&mut self, key: &str) -> Result<Value> {
        let option = self
            .option(key)
            .cloned()
            .ok_or_else(|| ConfVaultError::key_not_found(key))?;

        let value = if self.batch {
            option
                .default
                .clone()
                .ok_or_else(|| ConfVaultError::batch_mode(key))?
        } else {
            info!("Prompting for '{}'", key);
            ask(&option, &mut *self.prompter)?
        };

        self.store(key, value.clone(), now_seconds())?;
        Ok(value)
    }

    pub fn set<V: Into<Value>>(&mut self, key: &str, value: V) -> Result<()> {
        self.store(key, value.into(), now_seconds())
    }

    pub(crate) fn store(&mut self, key: &str, value: Value, timestamp: f64) -> Result<()> {
        let encoded = self.codec.encode(value, timestamp)?;
        debug!("{} SET {}", self.backend.kind(), key);
        self.backend.set(key, encoded)
    }

    pub fn delete(&mut self, key: &str) -> Result<()> {
        debug!("{} DELETE {}", self.backend.kind(), key);
        self.backend.delete(key)
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        self.backend.contains(key)
    }

    pub fn len(&self) -> Result<usize> {
        self.backend.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.backend.is_empty()
    }

    pub fn keys(&self) -> Result<Keys<'_>> {
        self.backend.keys()
    }

    /// Every key with its decoded value
    pub fn items(&self) -> Result<Vec<(String, Value)>> {
        let mut items = Vec::new();
        for key in self.backend.keys()? {
            let value = self.codec.decode(self.backend.get(&key)?)?;
            items.push((key, value));
        }
        Ok(items)
    }

    /// When the key was last modified, if the codec or backend records it
    pub fn last_modified(&self, key: &str) -> Result<Option<f64>> {
        let stored = self.backend.get(key)?;
        match self.codec.timestamp(&stored)? {
            Some(timestamp) => Ok(Some(timestamp)),
            None => self.backend.modified_at(key),
        }
    }

    /// Validate and register an option. Invalid descriptions fail here.
    pub fn add_option(&mut self, spec: OptionSpec) -> Result<&ConfigOption> {
        let option = spec.validate()?;
        debug!("Registered option {}", option);
        self.options.push(option);
        let index = self.options.len() - 1;
        Ok(&self.options[index])
    }

    pub fn options(&self) -> &[ConfigOption] {
        &self.options
    }

    /// Most recently registered option with this name
    pub fn option(&self, name: &str) -> Option<&ConfigOption> {
        self.options.iter().rev().find(|option| option.name == name)
    }

    /// Resolve every registered option whose key is missing
    ///
    /// Options are visited in registration order, once per name. The sweep
    /// stops at the first failure. Returns the number of keys resolved.
    pub fn prompt(&mut self) -> Result<usize> {
        let mut seen = HashSet::new();
        let names: Vec<String> = self
            .options
            .iter()
            .filter(|option| seen.insert(option.name.clone()))
            .map(|option| option.name.clone())
            .collect();

        let mut resolved = 0;
        for name in names {
            if self.backend.contains(&name)? {
                continue;
            }
            self.resolve_option(&name)?;
            resolved += 1;
        }
        info!("Resolved {} missing option(s)", resolved);
        Ok(resolved)
    }

    pub fn enable_batch(&mut self) {
        self.batch = true;
    }

    pub fn disable_batch(&mut self) {
        self.batch = false;
    }

    pub fn is_batch(&self) -> bool {
        self.batch
    }

    /// Flush the backend. `Ok(false)` when the backend has nothing to sync.
    pub fn sync(&mut self) -> Result<bool> {
        match self.backend.syncable() {
            Some(durable) => {
                durable.sync()?;
                Ok(true)
            }
            None => {
                debug!("{} backend does not support sync", self.backend.kind());
                Ok(false)
            }
        }
    }

    /// Close the backend. `Ok(false)` when the backend has nothing to close.
    pub fn close(&mut self) -> Result<bool> {
        match self.backend.syncable() {
            Some(durable) => {
                durable.close()?;
                Ok(true)
            }
            None => {
                debug!("{} backend does not support close", self.backend.kind());
                Ok(false)
            }
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }
}
