//! Structured file backend with optional integrity signing
//!
//! The file is a versioned JSON document holding an ordered list of entries.
//! Each entry records its text value and the type tag of the value it was
//! created from. With signing enabled, entries also carry a timestamp and an
//! HMAC signature over `name ++ value ++ type`.
//!
//! Signing only detects edits made outside this backend. The HMAC key is a
//! fixed constant, so it offers no protection against someone who has it.
//!
//! Every `set` and `delete` rewrites the whole file. Entries are found by a
//! linear scan, which suits the small key counts configuration files have.

use super::{ensure_key, Backend, Keys, Syncable, TimestampAware};
use crate::error::{ConfVaultError, Result};
use crate::signing::entry_signature;
use crate::utils::datetime::now_seconds;
use crate::utils::fs::{read_existing, write_atomic};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Version written to new documents
pub const FORMAT_VERSION: &str = "1.0.0";

/// One stored entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub value: String,
    /// Informative only; values are always returned as text
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Entry {
    /// True when the stored signature matches the stored fields
    pub fn verify(&self) -> bool {
        match (&self.signature, entry_signature(&self.name, &self.value, &self.type_tag)) {
            (Some(stored), Ok(expected)) => *stored == expected,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    version: String,
    #[serde(default)]
    entries: Vec<Entry>,
}

impl Default for Document {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION.to_string(),
            entries: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct StructuredBackend {
    path: PathBuf,
    document: Document,
    signing: bool,
}

impl StructuredBackend {
    /// Open a document without signing
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, false)
    }

    /// Open a document that signs and timestamps every entry it writes
    pub fn open_signed<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, true)
    }

    pub fn open_with<P: AsRef<Path>>(path: P, signing: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = match read_existing(&path)? {
            Some(contents) => {
                info!("Reading structured store {}", path.display());
                serde_json::from_str::<Document>(&contents)
                    .map_err(|e| ConfVaultError::corrupt_file(&path, e.to_string()))?
            }
            None => Document::default(),
        };

        let mut names = HashSet::new();
        if let Some(entry) = document
            .entries
            .iter()
            .find(|entry| !names.insert(entry.name.as_str()))
        {
            return Err(ConfVaultError::corrupt_file(
                &path,
                format!("entry '{}' appears more than once", entry.name),
            ));
        }

        if document.version != FORMAT_VERSION {
            warn!(
                "{} declares version {}, expected {}",
                path.display(),
                document.version,
                FORMAT_VERSION
            );
        }

        Ok(Self {
            path,
            document,
            signing,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn version(&self) -> &str {
        &self.document.version
    }

    pub fn is_signing(&self) -> bool {
        self.signing
    }

    pub fn entries(&self) -> &[Entry] {
        &self.document.entries
    }

    fn find(&self, key: &str) -> Option<&Entry> {
        self.document.entries.iter().find(|entry| entry.name == key)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.document
            .entries
            .iter()
            .position(|entry| entry.name == key)
    }

    fn render(&self) -> Result<String> {
        let mut contents = serde_json::to_string_pretty(&self.document)?;
        contents.push('\n');
        Ok(contents)
    }

    fn persist(&self) -> Result<()> {
        write_atomic(&self.path, &self.render()?)?;
        debug!("SYNC {}", self.path.display());
        Ok(())
    }
}

impl Backend for StructuredBackend {
    fn kind(&self) -> &'static str {
        "structured"
    }

    fn get(&self, key: &str) -> Result<Value> {
        self.find(key)
            .map(|entry| Value::Str(entry.value.clone()))
            .ok_or_else(|| ConfVaultError::key_not_found(key))
    }

    fn set(&mut self, key: &str, value: Value) -> Result<()> {
        ensure_key(key)?;
        let text = value.to_text();
        let type_tag = value.type_name().to_string();

        let (timestamp, signature) = if self.signing {
            (
                Some(now_seconds()),
                Some(entry_signature(key, &text, &type_tag)?),
            )
        } else {
            (None, None)
        };

        let entry = Entry {
            name: key.to_string(),
            value: text,
            type_tag,
            timestamp,
            signature,
        };
        debug!("SET {} = {} ({})", entry.name, entry.value, entry.type_tag);

        match self.position(key) {
            Some(index) => self.document.entries[index] = entry,
            None => self.document.entries.push(entry),
        }
        self.persist()
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        let index = self
            .position(key)
            .ok_or_else(|| ConfVaultError::key_not_found(key))?;
        self.document.entries.remove(index);
        debug!("DELETE {}", key);
        self.persist()
    }

    fn keys(&self) -> Result<Keys<'_>> {
        Ok(Box::new(
            self.document.entries.iter().map(|entry| entry.name.clone()),
        ))
    }

    fn len(&self) -> Result<usize> {
        Ok(self.document.entries.len())
    }

    fn syncable(&mut self) -> Option<&mut dyn Syncable> {
        Some(self)
    }

    fn timestamps(&self) -> Option<&dyn TimestampAware> {
        if self.signing {
            Some(self)
        } else {
            None
        }
    }
}

impl Syncable for StructuredBackend {
    fn sync(&mut self) -> Result<()> {
        self.persist()
    }

    fn close(&mut self) -> Result<()> {
        // The file is never held open; closing is a final sync.
        self.persist()
    }
}

impl TimestampAware for StructuredBackend {
    /// Stored timestamp when the signature verifies, otherwise the current time
    fn last_modified(&self, key: &str) -> Result<f64> {
        let entry = self
            .find(key)
            .ok_or_else(|| ConfVaultError::key_not_found(key))?;

        match entry.timestamp {
            Some(timestamp) if entry.verify() => Ok(timestamp),
            _ => {
                warn!(
                    "Signature mismatch for '{}' in {}, treating it as modified now",
                    key,
                    self.path.display()
                );
                Ok(now_seconds())
            }
        }
    }
}
