//! Small helpers shared by the backends and the CLI

pub mod datetime;
pub mod format;
pub mod fs;
