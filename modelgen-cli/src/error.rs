//! Error types for the CLI.
//!
//! This module defines all error types used throughout the CLI. Each layer
//! (fetching, configuration, writing) has its own enum, wrapped by
//! [`CliError`] which also decides the process exit code.

use std::path::PathBuf;
use thiserror::Error;

pub use modelgen::GenerateError;

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Main error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// Error fetching schemas.
    #[error("Failed to fetch schemas: {0}")]
    Fetch(#[from] FetchError),

    /// Error loading configuration.
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ConfigError),

    /// Error writing output files.
    #[error("Failed to write output: {0}")]
    Write(#[from] WriteError),

    /// Fatal error during model generation.
    #[error("Failed to generate models: {0}")]
    Generate(#[from] GenerateError),

    /// Generic IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// API, authentication and configuration problems are recoverable by the
    /// user and exit with `1`; everything else exits with `2`.
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Fetch(_) | CliError::Config(_) => 1,
            _ => 2,
        }
    }
}

/// Error fetching schemas from the Content Management API or an export file.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No API key or token was supplied.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// Request could not be sent or its body could not be read.
    #[error("Request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Credentials were rejected.
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    /// API returned an error body.
    #[error("API error ({status}){}: {message}", .code.map(|c| format!(" code {c}")).unwrap_or_default())]
    Api {
        status: u16,
        code: Option<i64>,
        message: String,
    },

    /// Response body did not match the expected shape.
    #[error("Unexpected response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Export file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Export file is not valid JSON.
    #[error("Invalid schema export {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Error loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid TOML syntax.
    #[error("Invalid TOML in {path}: {message}")]
    InvalidToml { path: PathBuf, message: String },

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Configuration file exists and `--force` was not given.
    #[error("Configuration file already exists: {path} (use --force to overwrite)")]
    AlreadyExists { path: PathBuf },

    /// IO error reading config.
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Error writing output files.
#[derive(Debug, Error)]
pub enum WriteError {
    /// Failed to create directory.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("Failed to write file {path}: {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Overwrite prompt could not be shown or was interrupted.
    #[error("Overwrite prompt for {path} failed: {message}")]
    Prompt { path: PathBuf, message: String },
}

impl FetchError {
    /// Create a missing credentials error.
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::MissingCredentials(message.into())
    }

    /// Create a decode error.
    pub fn decode(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl ConfigError {
    /// Create an invalid TOML error.
    pub fn invalid_toml(path: PathBuf, message: impl Into<String>) -> Self {
        Self::InvalidToml {
            path,
            message: message.into(),
        }
    }

    /// Create an invalid value error.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }
}
