//! Shaderbin CLI: inspection and maintenance of shader program cache blobs.
//!
//! Provides `shaderbin key` to compute the cache key of shader sources,
//! `shaderbin inspect` and `shaderbin verify` to examine a single blob, and
//! `shaderbin list` / `shaderbin clear` to manage the cache directory.

#![warn(missing_docs)]

mod blob;
mod cache;
mod key;
mod settings;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use shaderbin_common::KeyScheme;

/// Shaderbin: a binary cache for linked shader programs.
#[derive(Parser, Debug)]
#[command(name = "shaderbin", version, about = "Shader program binary cache")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a `shaderbin.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Cache directory, overriding configuration and environment.
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the cache key of shader sources, given in attach order.
    Key(KeyArgs),
    /// Print the validation header of a blob.
    Inspect(InspectArgs),
    /// Load a blob against a driver identity and report the outcome.
    Verify(VerifyArgs),
    /// List the entries in the cache directory.
    List(ListArgs),
    /// Delete every entry in the cache directory.
    Clear,
}

/// Arguments for the `shaderbin key` subcommand.
#[derive(Parser, Debug)]
pub struct KeyArgs {
    /// Shader source files.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Key scheme, overriding the configuration.
    #[arg(long)]
    pub scheme: Option<KeyScheme>,
}

/// Arguments for the `shaderbin inspect` subcommand.
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Blob file path.
    pub blob: PathBuf,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for the `shaderbin verify` subcommand.
#[derive(Parser, Debug)]
pub struct VerifyArgs {
    /// Blob file path. Files ending in `.shader` are read as standalone
    /// shader blobs, anything else as a program blob.
    pub blob: PathBuf,

    /// Device vendor the blob must match.
    #[arg(long)]
    pub vendor: String,

    /// Device renderer the blob must match.
    #[arg(long)]
    pub renderer: String,

    /// Load into an ES context instead of a desktop one.
    #[arg(long)]
    pub es: bool,

    /// Build magic to expect instead of this binary's own.
    #[arg(long)]
    pub magic: Option<String>,
}

/// Arguments for the `shaderbin list` subcommand.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Report output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Optional path to a configuration file.
    pub config: Option<PathBuf>,
    /// Optional cache directory override.
    pub cache_dir: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        config: cli.config,
        cache_dir: cli.cache_dir,
    };
    init_logging(&global);

    let result = match cli.command {
        Command::Key(ref args) => key::run(args, &global),
        Command::Inspect(ref args) => blob::inspect(args, &global),
        Command::Verify(ref args) => blob::verify(args, &global),
        Command::List(ref args) => cache::list(args, &global),
        Command::Clear => cache::clear(&global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the stderr log subscriber. `RUST_LOG` takes precedence over the
/// `-q`/`-v` flags.
fn init_logging(global: &GlobalArgs) {
    let level = default_log_level(global);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn default_log_level(global: &GlobalArgs) -> &'static str {
    if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        "warn"
    }
}
