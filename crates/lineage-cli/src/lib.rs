//! Lineage CLI
//!
//! Library half of the `lineage` binary: configuration loading and the
//! subcommand implementations.

#![warn(missing_docs)]

pub mod commands;
pub mod config;

pub use commands::{check, classify, resolve, source_field, CheckReport, ResolveArgs, Workspace};
pub use config::{ConfigError, LineageConfig, DEFAULT_LOG_FILTER};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
