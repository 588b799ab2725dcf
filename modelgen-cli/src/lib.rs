//! # modelgen-cli
//!
//! CLI library for generating C# model classes from Contentstack stacks.
//!
//! This crate provides everything around the [`modelgen`] engine used by the
//! `contentstack-modelgen` binary.
//!
//! ## Architecture
//!
//! - [`config`] - Configuration management and TOML parsing
//! - [`source`] - Paginated schema sources (Content Management API, JSON export)
//! - [`generator`] - Registry loading, generation and rendering
//! - [`writer`] - File output with overwrite policies and dry-run support
//! - [`error`] - Error types and exit codes

pub mod config;
pub mod error;
pub mod generator;
pub mod source;
pub mod writer;

// Re-export main types for convenience
pub use config::{Config, ConfigManager};
pub use error::{CliError, CliResult};
pub use generator::{GeneratedModels, ModelGenerator};
pub use source::{ContentstackClient, FileSource, SchemaSource};
pub use writer::{UnitWriter, WriteResult};
