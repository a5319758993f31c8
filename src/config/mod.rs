//! Config facade module
//!
//! The facade binds a backend to an option registry and the interactive
//! prompt. Settings describe which backend a collaborator opens.

pub mod facade;
pub mod options;
pub mod prompt;
pub mod settings;
pub mod timestamped;

pub use facade::Config;
pub use options::{ConfigOption, OptionSpec, DEFAULT_RETRIES};
pub use prompt::{ask, Prompter, ScriptedPrompter, TerminalPrompter};
pub use settings::{BackendKind, Settings};
pub use timestamped::{
    PlainCodec, SignedTimestampCodec, TimestampCodec, TimestampedConfig, ValueCodec,
};
