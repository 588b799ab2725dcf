//! Configuration management for the CLI.
//!
//! This module handles loading configuration from `modelgen.toml` files
//! and merging with command-line arguments.

use crate::error::{CliResult, ConfigError};
use chrono::NaiveDate;
use modelgen::{EmitOptions, NamingPrefixes, ReferencePolicy};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default configuration filename.
pub const CONFIG_FILENAME: &str = "modelgen.toml";

/// Main configuration structure.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Content Management API settings.
    pub api: ApiConfig,

    /// Output configuration.
    pub output: OutputConfig,

    /// Naming conventions.
    pub naming: NamingConfig,

    /// Feature flags.
    pub features: FeaturesConfig,
}

/// Content Management API settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API host, with or without scheme.
    pub host: String,

    /// Stack branch.
    pub branch: Option<String>,
}

/// Output configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the model directory is created in.
    pub path: PathBuf,

    /// Name of the model directory.
    pub directory: String,

    /// Root namespace of generated code.
    pub namespace: String,

    /// Overwrite existing files without asking.
    pub force: bool,
}

/// Naming convention configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    /// Prefix of modular block types.
    pub modular_block_prefix: String,

    /// Prefix of group types.
    pub group_prefix: String,
}

/// Feature flags configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FeaturesConfig {
    /// Emit nullable reference annotations.
    pub nullable: bool,

    /// How reference fields are typed.
    pub references: ReferenceMode,
}

/// Configured reference typing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceMode {
    /// Lists for stacks on schema version 2019-04-04 or later.
    #[default]
    Auto,
    /// Always lists.
    List,
    /// As declared by each field.
    Declared,
}

impl ReferenceMode {
    /// Policy for a stack with the given schema version.
    pub fn policy(self, stack_version: Option<NaiveDate>) -> ReferencePolicy {
        match self {
            Self::Auto => ReferencePolicy::for_stack_version(stack_version),
            Self::List => ReferencePolicy::AlwaysList,
            Self::Declared => ReferencePolicy::AsDeclared,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "api.contentstack.io".to_string(),
            branch: None,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("."),
            directory: "Models".to_string(),
            namespace: "ContentstackModels".to_string(),
            force: false,
        }
    }
}

impl Default for NamingConfig {
    fn default() -> Self {
        let prefixes = NamingPrefixes::default();
        Self {
            modular_block_prefix: prefixes.modular_block,
            group_prefix: prefixes.group,
        }
    }
}

impl Config {
    /// Directory generated files are written below.
    pub fn output_root(&self) -> PathBuf {
        self.output.path.clone()
    }

    /// Engine options for this configuration.
    pub fn emit_options(&self, reference_policy: ReferencePolicy) -> EmitOptions {
        EmitOptions {
            namespace: self.output.namespace.clone(),
            root_directory: self.output.directory.clone(),
            prefixes: NamingPrefixes {
                modular_block: self.naming.modular_block_prefix.clone(),
                group: self.naming.group_prefix.clone(),
            },
            reference_policy,
            support_units: true,
        }
    }
}

/// Configuration manager for loading and merging configs.
pub struct ConfigManager;

impl ConfigManager {
    /// Load configuration from a file path.
    ///
    /// If the path is None, attempts to load from the default location and
    /// returns the default configuration when that file does not exist. An
    /// explicit path must exist.
    pub fn load(path: Option<&Path>) -> CliResult<Config> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILENAME);
                if !default.exists() {
                    tracing::debug!(path = %default.display(), "no configuration file, using defaults");
                    return Ok(Config::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(&config_path).map_err(|e| ConfigError::Io {
            path: config_path.clone(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid_toml(config_path, e.to_string()))?;

        Ok(config)
    }

    /// Merge CLI arguments into configuration.
    ///
    /// CLI arguments take precedence over config file values.
    pub fn merge_cli_args(mut config: Config, args: &CliArgs) -> Config {
        if let Some(ref host) = args.host {
            config.api.host = host.clone();
        }

        if let Some(ref branch) = args.branch {
            config.api.branch = Some(branch.clone());
        }

        if let Some(ref path) = args.path {
            config.output.path = path.clone();
        }

        if let Some(ref namespace) = args.namespace {
            config.output.namespace = namespace.clone();
        }

        if let Some(force) = args.force {
            config.output.force = force;
        }

        if let Some(ref prefix) = args.modular_block_prefix {
            config.naming.modular_block_prefix = prefix.clone();
        }

        if let Some(ref prefix) = args.group_prefix {
            config.naming.group_prefix = prefix.clone();
        }

        if let Some(nullable) = args.nullable {
            config.features.nullable = nullable;
        }

        if let Some(references) = args.references {
            config.features.references = references;
        }

        config
    }

    /// Check values the generator relies on.
    pub fn validate(config: &Config) -> CliResult<()> {
        if config.output.namespace.split('.').any(|s| !is_identifier(s)) {
            return Err(ConfigError::invalid_value(
                "output.namespace",
                format!("'{}' is not a dotted identifier", config.output.namespace),
            )
            .into());
        }

        if !is_identifier(&config.output.directory) {
            return Err(ConfigError::invalid_value(
                "output.directory",
                format!("'{}' must be a single identifier", config.output.directory),
            )
            .into());
        }

        for (key, prefix) in [
            ("naming.modular_block_prefix", &config.naming.modular_block_prefix),
            ("naming.group_prefix", &config.naming.group_prefix),
        ] {
            if !is_identifier(prefix) {
                return Err(ConfigError::invalid_value(
                    key,
                    format!(
                        "'{prefix}' must start with a letter or '_' and contain only letters, digits and '_'"
                    ),
                )
                .into());
            }
        }

        if config.api.host.trim().is_empty() {
            return Err(ConfigError::invalid_value("api.host", "must not be empty").into());
        }

        Ok(())
    }

    /// Generate default configuration file content with comments.
    pub fn default_config_content() -> &'static str {
        r#"# contentstack-modelgen configuration file

[api]
# Content Management API host (e.g. eu-api.contentstack.com for the EU region)
host = "api.contentstack.io"

# Stack branch to read schemas from
# branch = "main"

[output]
# Directory the model directory is created in
path = "."

# Name of the model directory, also the namespace segment after the root namespace
directory = "Models"

# Root namespace of generated classes
namespace = "ContentstackModels"

# Overwrite existing files without asking
force = false

[naming]
# Prefix of modular block types (MB<Owner><Field>)
modular_block_prefix = "MB"

# Prefix of group types (Group<Owner><Field>)
group_prefix = "Group"

[features]
# Emit nullable reference annotations (string?)
nullable = false

# How reference fields are typed:
#   auto     - lists for stacks on schema version 2019-04-04 or later
#   list     - always lists
#   declared - lists only for multiple references
references = "auto"
"#
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// CLI arguments that can override configuration.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// API host override.
    pub host: Option<String>,

    /// Branch override.
    pub branch: Option<String>,

    /// Output path override.
    pub path: Option<PathBuf>,

    /// Namespace override.
    pub namespace: Option<String>,

    /// Force override.
    pub force: Option<bool>,

    /// Modular block prefix override.
    pub modular_block_prefix: Option<String>,

    /// Group prefix override.
    pub group_prefix: Option<String>,

    /// Nullable override.
    pub nullable: Option<bool>,

    /// Reference mode override.
    pub references: Option<ReferenceMode>,
}
