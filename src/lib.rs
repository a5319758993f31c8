//! confvault - configuration-value store
//!
//! Named settings behind one facade, persisted by a pluggable backend
//! (memory, flat file, key-ordered file, structured file with integrity
//! signing, or an external key-value service), with optional timestamps and
//! an interactive prompt for values that are missing.

pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod signing;
pub mod utils;
pub mod value;

// Re-export commonly used types
pub use crate::backend::{Backend, Syncable, TimestampAware};
pub use crate::config::{Config, OptionSpec, TimestampedConfig};
pub use crate::error::{ConfVaultError, Result};
pub use crate::signing::{Signer, TimestampSigner};
pub use crate::value::{Value, ValueKind};
