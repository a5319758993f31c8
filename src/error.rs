use std::path::PathBuf;
use thiserror::Error;

/// Main error type for confvault operations
#[derive(Debug, Error)]
pub enum ConfVaultError {
    #[error("Key not found: {key}")]
    KeyNotFound { key: String },

    #[error("Illegal argument: {0}")]
    IllegalArgument(String),

    #[error("Batch mode is enabled, unable to prompt for '{key}'")]
    BatchModeUnableToPrompt { key: String },

    #[error("Too many invalid answers for '{key}' after {attempts} attempts")]
    TooManyRetries { key: String, attempts: u32 },

    #[error("Signature error: {0}")]
    SignatureError(String),

    #[error("Type error: {0}")]
    TypeMismatch(String),

    #[error("Invalid key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Operation '{0}' is not supported by this backend")]
    Unsupported(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(
        "Configuration file '{}' is corrupt: {details}. \
         Validate the file or rename it before opening it again.",
        path.display()
    )]
    CorruptFile { path: PathBuf, details: String },

    #[error("Key-value service error: {0}")]
    ServiceError(String),

    #[error("Prompt input error: {0}")]
    PromptError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration loading error: {0}")]
    ConfigLoadError(#[from] ::config::ConfigError),
}

impl ConfVaultError {
    pub fn key_not_found<S: Into<String>>(key: S) -> Self {
        Self::KeyNotFound { key: key.into() }
    }

    pub fn illegal_argument<S: Into<String>>(msg: S) -> Self {
        Self::IllegalArgument(msg.into())
    }

    pub fn batch_mode<S: Into<String>>(key: S) -> Self {
        Self::BatchModeUnableToPrompt { key: key.into() }
    }

    pub fn too_many_retries<S: Into<String>>(key: S, attempts: u32) -> Self {
        Self::TooManyRetries {
            key: key.into(),
            attempts,
        }
    }

    pub fn signature<S: Into<String>>(msg: S) -> Self {
        Self::SignatureError(msg.into())
    }

    pub fn type_mismatch<S: Into<String>>(msg: S) -> Self {
        Self::TypeMismatch(msg.into())
    }

    pub fn invalid_key<K: Into<String>, R: Into<String>>(key: K, reason: R) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported<S: Into<String>>(operation: S) -> Self {
        Self::Unsupported(operation.into())
    }

    pub fn invalid_state<S: Into<String>>(msg: S) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn corrupt_file<P: Into<PathBuf>, S: Into<String>>(path: P, details: S) -> Self {
        Self::CorruptFile {
            path: path.into(),
            details: details.into(),
        }
    }

    pub fn service<S: Into<String>>(msg: S) -> Self {
        Self::ServiceError(msg.into())
    }

    pub fn prompt<S: Into<String>>(msg: S) -> Self {
        Self::PromptError(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        Self::SerializationError(msg.into())
    }

    /// True when the error only reports a missing key
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Self::KeyNotFound { .. })
    }
}

/// Result type alias for confvault operations
pub type Result<T> = std::result::Result<T, ConfVaultError>;
