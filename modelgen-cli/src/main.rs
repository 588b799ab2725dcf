//! # contentstack-modelgen
//!
//! Generate C# model classes from the content types and global fields of a
//! Contentstack stack.
//!
//! ## Usage
//!
//! ```bash
//! # Generate models for a stack
//! contentstack-modelgen generate --api-key <KEY> --authtoken <TOKEN> --path ./src
//!
//! # Use a management token and a custom namespace
//! contentstack-modelgen generate -a <KEY> --management-token <TOKEN> --namespace Acme.Cms
//!
//! # Generate offline from a schema export
//! contentstack-modelgen generate --from-file stack.json --dry-run
//!
//! # Initialize configuration
//! contentstack-modelgen init
//! ```

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use modelgen_cli::{
    config::{CliArgs, Config, ConfigManager, ReferenceMode},
    error::{CliError, ConfigError},
    generator::{GeneratedModels, ModelGenerator},
    source::{load_registry, ContentstackClient, Credentials, FileSource, SchemaSource},
    writer::{NeverOverwrite, PromptOverwrite, UnitWriter, WriteResult},
};

#[derive(Parser)]
#[command(name = "contentstack-modelgen")]
#[command(author, version, about = "Generate C# models from Contentstack content types", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate model classes for a stack
    Generate(GenerateArgs),

    /// Initialize a new modelgen configuration file
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "modelgen.toml")]
        output: PathBuf,

        /// Overwrite existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[derive(clap::Args)]
struct GenerateArgs {
    /// Stack API key
    #[arg(short = 'a', long, env = "CONTENTSTACK_API_KEY")]
    api_key: Option<String>,

    /// User authtoken
    #[arg(short = 'A', long, env = "CONTENTSTACK_AUTHTOKEN", hide_env_values = true)]
    authtoken: Option<String>,

    /// Stack management token (used instead of the authtoken when given)
    #[arg(long, env = "CONTENTSTACK_MANAGEMENT_TOKEN", hide_env_values = true)]
    management_token: Option<String>,

    /// Stack branch
    #[arg(short, long)]
    branch: Option<String>,

    /// Content Management API host
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Root namespace of the generated classes
    #[arg(long)]
    namespace: Option<String>,

    /// Directory the model directory is created in
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Overwrite existing files without asking
    #[arg(short, long)]
    force: bool,

    /// Prefix of modular block types
    #[arg(long)]
    modular_block_prefix: Option<String>,

    /// Prefix of group types
    #[arg(long)]
    group_prefix: Option<String>,

    /// Emit nullable reference annotations
    #[arg(short = 'N', long = "is-nullable")]
    nullable: bool,

    /// How reference fields are typed
    #[arg(long, value_enum)]
    references: Option<ReferenceMode>,

    /// Read schemas from a JSON export instead of the API
    #[arg(long)]
    from_file: Option<PathBuf>,

    /// Preview files without writing them
    #[arg(long)]
    dry_run: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl GenerateArgs {
    fn overrides(&self) -> CliArgs {
        CliArgs {
            host: self.endpoint.clone(),
            branch: self.branch.clone(),
            path: self.path.clone(),
            namespace: self.namespace.clone(),
            force: self.force.then_some(true),
            modular_block_prefix: self.modular_block_prefix.clone(),
            group_prefix: self.group_prefix.clone(),
            nullable: self.nullable.then_some(true),
            references: self.references,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Generate(args) => cmd_generate(args),
        Commands::Init { output, force } => cmd_init(output, force),
    }
}

fn init_tracing(verbose: u8) {
    let base_filter = match std::env::var("RUST_LOG") {
        Ok(filter) => filter,
        Err(_) => match verbose {
            0 => "warn".to_string(),
            1 => "warn,modelgen=debug,modelgen_cli=debug".to_string(),
            _ => "debug,modelgen=trace,modelgen_cli=trace".to_string(),
        },
    };

    let filter = EnvFilter::try_new(&base_filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}

/// Generate command implementation.
fn cmd_generate(args: GenerateArgs) -> Result<(), CliError> {
    init_tracing(args.verbose);

    let config = ConfigManager::load(args.config.as_deref())?;
    let config = ConfigManager::merge_cli_args(config, &args.overrides());
    ConfigManager::validate(&config)?;

    let source: Box<dyn SchemaSource> = match &args.from_file {
        Some(path) => {
            println!("{} {}", "Reading schema export".cyan(), path.display());
            Box::new(FileSource::open(path)?)
        }
        None => {
            let credentials = Credentials::from_parts(
                args.api_key.clone(),
                args.authtoken.clone(),
                args.management_token.clone(),
            )?;
            let client =
                ContentstackClient::new(&config.api.host, credentials, config.api.branch.clone())?;
            println!("{} {}", "Connecting to".cyan(), client.base_url());
            Box::new(client)
        }
    };

    println!("{}", "Fetching stack details...".cyan());
    let stack = source.stack()?;
    if !stack.name.is_empty() {
        println!("  Stack: {}", stack.name.green());
    }

    println!("{}", "Fetching content types and global fields...".cyan());
    let registry = load_registry(source.as_ref())?;
    println!(
        "  Found {} content type(s) and {} global field(s)",
        registry.content_types().count().to_string().green(),
        registry.global_fields().count().to_string().green()
    );

    println!("{}", "Generating models...".cyan());
    let generator = ModelGenerator::new(config.clone());
    let models = generator.generate_from_registry(stack, &registry)?;
    report_diagnostics(&models);

    write_models(&config, &models, args.dry_run)
}

fn report_diagnostics(models: &GeneratedModels) {
    let warnings: Vec<_> = models
        .diagnostics
        .iter()
        .filter(|d| d.kind.is_warning())
        .collect();

    if warnings.is_empty() {
        return;
    }

    println!("{} {} schema problem(s):", "Warning:".yellow(), warnings.len());
    for diagnostic in warnings {
        println!("  {diagnostic}");
    }
}

fn write_models(config: &Config, models: &GeneratedModels, dry_run: bool) -> Result<(), CliError> {
    let writer = UnitWriter::new(config.output_root())
        .with_force(config.output.force)
        .with_dry_run(dry_run);
    let writer = if std::io::stdin().is_terminal() {
        writer.with_policy(PromptOverwrite)
    } else {
        writer.with_policy(NeverOverwrite)
    };

    let mut written = 0;
    let mut skipped = 0;

    for unit in &models.units {
        match writer.write(unit)? {
            WriteResult::Written { path, .. } => {
                written += 1;
                println!("{} {}", "✓".green(), path.display());
            }
            WriteResult::Skipped { path } => {
                skipped += 1;
                println!("{} {}", "Skipping".yellow(), path.display());
            }
            WriteResult::DryRun { path, content } => {
                println!("{} Would write {}:", "[dry-run]".yellow(), path.display());
                println!("{}", "─".repeat(60).dimmed());
                println!("{content}");
                println!("{}", "─".repeat(60).dimmed());
            }
        }
    }

    if !dry_run {
        println!(
            "{} Created {} file(s) in {}{}",
            "✓".green(),
            written.to_string().green(),
            config.output_root().join(&config.output.directory).display(),
            if skipped > 0 {
                format!(", skipped {skipped}")
            } else {
                String::new()
            }
        );
    }

    Ok(())
}

/// Init command implementation.
fn cmd_init(output: PathBuf, force: bool) -> Result<(), CliError> {
    if output.exists() && !force {
        return Err(ConfigError::AlreadyExists { path: output }.into());
    }

    std::fs::write(&output, ConfigManager::default_config_content())?;

    println!(
        "{} Created configuration file: {}",
        "✓".green(),
        output.display()
    );

    Ok(())
}

/// Print an error with formatting.
fn print_error(error: &CliError) {
    eprintln!("{} {}", "Error:".red().bold(), error);
}
