//! Command-line collaborator for confvault
//!
//! Command definitions, argument parsing and command execution for `cv`.

pub mod commands;

pub use commands::*;
