//! Flat key=value file backend
//!
//! Values live in one section of a TOML file, `[DEFAULT]` unless another
//! section is named. Values in that section are read as text. Other sections
//! found in the file, nested tables included, are carried through rewrites
//! with their original types.
//!
//! Writes are buffered: `set` and `delete` only change the in-process copy.
//! `sync` or `close` rewrites the whole file, and dropping a backend with
//! unsynced changes makes a best-effort sync.

use super::{ensure_key, Backend, Keys, Syncable};
use crate::error::{ConfVaultError, Result};
use crate::utils::fs::{read_existing, write_atomic};
use crate::value::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Section used when none is given
pub const DEFAULT_SECTION: &str = "DEFAULT";

#[derive(Debug)]
pub struct FlatFileBackend {
    path: PathBuf,
    section: String,
    entries: BTreeMap<String, String>,
    /// Every section other than `section`, as parsed
    foreign: toml::Table,
    dirty: bool,
}

impl FlatFileBackend {
    /// Open (or prepare to create) a file using the default section
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_section(path, DEFAULT_SECTION)
    }

    /// Open (or prepare to create) a file using a named section
    pub fn open_section<P: AsRef<Path>>(path: P, section: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (entries, foreign) = match read_existing(&path)? {
            Some(contents) => parse_sections(&path, &contents, section)?,
            None => (BTreeMap::new(), toml::Table::new()),
        };

        info!(
            "Opened flat file store {} (section [{}])",
            path.display(),
            section
        );
        Ok(Self {
            path,
            section: section.to_string(),
            entries,
            foreign,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn section(&self) -> &str {
        &self.section
    }

    /// True when there are changes not yet written to disk
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    fn render(&self) -> Result<String> {
        let mut document = self.foreign.clone();
        let active: toml::Table = self
            .entries
            .iter()
            .map(|(key, text)| (key.clone(), toml::Value::String(text.clone())))
            .collect();
        document.insert(self.section.clone(), toml::Value::Table(active));
        toml::to_string_pretty(&document)
            .map_err(|e| ConfVaultError::serialization(e.to_string()))
    }
}

/// Split a document into the active section's text entries and everything else
fn parse_sections(
    path: &Path,
    contents: &str,
    section: &str,
) -> Result<(BTreeMap<String, String>, toml::Table)> {
    let mut foreign = contents
        .parse::<toml::Table>()
        .map_err(|e| ConfVaultError::corrupt_file(path, e.to_string()))?;

    if let Some((name, _)) = foreign.iter().find(|(_, value)| !value.is_table()) {
        return Err(ConfVaultError::corrupt_file(
            path,
            format!("key '{name}' is not inside a section"),
        ));
    }

    let mut entries = BTreeMap::new();
    if let Some(toml::Value::Table(active)) = foreign.remove(section) {
        for (key, value) in active {
            let text = match value {
                toml::Value::String(s) => s,
                toml::Value::Table(_) => {
                    return Err(ConfVaultError::corrupt_file(
                        path,
                        format!("[{section}] holds a nested table at '{key}'"),
                    ))
                }
                other => other.to_string(),
            };
            entries.insert(key, text);
        }
    }
    Ok((entries, foreign))
}

impl Backend for FlatFileBackend {
    fn kind(&self) -> &'static str {
        "flat-file"
    }

    fn get(&self, key: &str) -> Result<Value> {
        self.entries
            .get(key)
            .map(|text| Value::Str(text.clone()))
            .ok_or_else(|| ConfVaultError::key_not_found(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        ensure_key(key)?;
        debug!("SET [{}] {} = {}", self.section, key, value);
        self.entries.insert(key.to_string(), value.to_text());
        self.dirty = true;
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        if self.entries.remove(key).is_none() {
            return Err(ConfVaultError::key_not_found(key));
        }
        debug!("DELETE [{}] {}", self.section, key);
        self.dirty = true;
        Ok(())
    }

    fn keys(&self) -> Result<Keys<'_>> {
        Ok(Box::new(self.entries.keys().cloned()))
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.len())
    }

    fn syncable(&mut self) -> Option<&mut dyn Syncable> {
        Some(self)
    }
}

impl Syncable for FlatFileBackend {
    fn sync(&mut self) -> Result<()> {
        let contents = self.render()?;
        write_atomic(&self.path, &contents)?;
        self.dirty = false;
        debug!("SYNC {}", self.path.display());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.sync()
    }
}

impl Drop for FlatFileBackend {
    fn drop(&mut self) {
        if self.dirty {
            if let Err(e) = self.sync() {
                warn!(
                    "Failed to write pending changes to {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}
