//! Collaborator settings
//!
//! Settings choose the backend a collaborator (the `cv` binary, or an
//! application embedding the library) binds its [`Config`](super::Config)
//! to. They are loaded from defaults, an optional TOML file and
//! `CONFVAULT_*` environment variables, in increasing priority. Command-line
//! flags are applied on top by the caller.

use crate::backend::flat_file::DEFAULT_SECTION;
use crate::backend::{
    Backend, FlatFileBackend, MemoryBackend, OrderedFileBackend, StructuredBackend,
};
use crate::error::{ConfVaultError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Prefix of environment variables that override settings
pub const ENV_PREFIX: &str = "CONFVAULT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    Memory,
    #[default]
    FlatFile,
    OrderedFile,
    Structured,
}

impl BackendKind {
    /// File name used when no explicit path is configured
    pub fn default_file_name(&self) -> Option<&'static str> {
        match self {
            BackendKind::Memory => None,
            BackendKind::FlatFile => Some("store.toml"),
            BackendKind::OrderedFile => Some("store.json"),
            BackendKind::Structured => Some("store.structured.json"),
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::Memory => "memory",
            BackendKind::FlatFile => "flat-file",
            BackendKind::OrderedFile => "ordered-file",
            BackendKind::Structured => "structured",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendKind,
    /// Store location; derived from the backend kind when unset
    pub path: Option<PathBuf>,
    /// Flat file section
    pub section: String,
    /// Sign structured entries
    pub signing: bool,
    /// Never prompt; use option defaults or fail
    pub batch: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            path: None,
            section: DEFAULT_SECTION.to_string(),
            signing: false,
            batch: false,
        }
    }
}

impl Settings {
    /// Directory holding the settings file and default stores
    pub fn config_dir() -> Result<PathBuf> {
        // XDG layout on Linux and macOS, platform directory elsewhere
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            use std::env;
            let base = if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
                PathBuf::from(xdg_config_home)
            } else {
                let home_dir = env::var("HOME")
                    .map_err(|_| ConfVaultError::config("HOME environment variable not set"))?;
                PathBuf::from(home_dir).join(".config")
            };
            Ok(base.join("confvault"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            let base = dirs::config_dir()
                .ok_or_else(|| ConfVaultError::config("Unable to determine config directory"))?;
            Ok(base.join("confvault"))
        }
    }

    pub fn settings_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("settings.toml"))
    }

    /// Load from the default settings file and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    /// Load from `path` (if it exists) and the environment
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading settings from {}", path.display());
        let settings = ::config::Config::builder()
            .add_source(::config::File::from(path.to_path_buf()).required(false))
            .add_source(::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.section.is_empty() {
            return Err(ConfVaultError::config("section must not be empty"));
        }
        if self.signing && self.backend != BackendKind::Structured {
            return Err(ConfVaultError::config(format!(
                "signing requires the structured backend, not {}",
                self.backend
            )));
        }
        Ok(())
    }

    /// Store file for file-like backends; `None` for memory
    pub fn store_path(&self) -> Result<Option<PathBuf>> {
        if let Some(path) = &self.path {
            return Ok(Some(path.clone()));
        }
        match self.backend.default_file_name() {
            Some(name) => Ok(Some(Self::config_dir()?.join(name))),
            None => Ok(None),
        }
    }

    /// Open the configured backend
    pub fn open_backend(&self) -> Result<Box<dyn Backend>> {
        self.validate()?;
        let path = self.store_path()?;
        info!(
            "Opening {} backend{}",
            self.backend,
            path.as_ref()
                .map(|p| format!(" at {}", p.display()))
                .unwrap_or_default()
        );

        let backend: Box<dyn Backend> = match (self.backend, path) {
            (BackendKind::Memory, _) => Box::new(MemoryBackend::new()),
            (BackendKind::FlatFile, Some(path)) => {
                Box::new(FlatFileBackend::open_section(path, &self.section)?)
            }
            (BackendKind::OrderedFile, Some(path)) => Box::new(OrderedFileBackend::open(path)?),
            (BackendKind::Structured, Some(path)) => {
                Box::new(StructuredBackend::open_with(path, self.signing)?)
            }
            (kind, None) => {
                return Err(ConfVaultError::config(format!(
                    "{kind} backend needs a file path"
                )))
            }
        };
        Ok(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.backend, BackendKind::FlatFile);
        assert_eq!(settings.section, "DEFAULT");
        assert!(!settings.signing);
        assert!(!settings.batch);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.toml")).unwrap();
        assert_eq!(settings.section, Settings::default().section);
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "backend = \"structured\"\npath = \"/tmp/app.json\"\nsigning = true\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.backend, BackendKind::Structured);
        assert_eq!(settings.path, Some(PathBuf::from("/tmp/app.json")));
        assert!(settings.signing);
        assert!(!settings.batch);
    }

    #[test]
    fn test_signing_requires_structured_backend() {
        let settings = Settings {
            signing: true,
            ..Settings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ConfVaultError::ConfigError(_))
        ));
    }

    #[test]
    fn test_open_backend_kinds() {
        let dir = TempDir::new().unwrap();

        let memory = Settings {
            backend: BackendKind::Memory,
            ..Settings::default()
        };
        assert_eq!(memory.open_backend().unwrap().kind(), "memory");

        for (kind, file) in [
            (BackendKind::FlatFile, "a.toml"),
            (BackendKind::OrderedFile, "b.json"),
            (BackendKind::Structured, "c.json"),
        ] {
            let settings = Settings {
                backend: kind,
                path: Some(dir.path().join(file)),
                ..Settings::default()
            };
            let mut backend = settings.open_backend().unwrap();
            backend.set("k", Value::from(1)).unwrap();
            assert_eq!(backend.get("k").unwrap(), Value::from("1"));
            backend.try_close().unwrap();
        }
    }
}
