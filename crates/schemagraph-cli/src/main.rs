//! SchemaGraph CLI - Build-unit resolution and liveness inspection
//!
//! A command-line interface over the resolver and the liveness index.
//!
//! # Usage
//!
//! ```bash
//! # Print the resolved project tree
//! schemagraph resolve schema.json
//!
//! # Live/dead report for every unit, trimmed to the jre platform
//! schemagraph --platform jre live schema.json
//!
//! # Index entries of one unit
//! schemagraph entries :app jre:test
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use schemagraph_config::{ConfigOverrides, GraphConfig, LogFormat};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

/// SchemaGraph - Platform x module build-unit resolution
#[derive(Parser, Debug)]
#[command(name = "schemagraph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Workspace root holding `.schemagraph/config.toml`
    #[arg(long, short = 'w', global = true, env = "SCHEMAGRAPH_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Liveness index directory (relative paths resolve against the workspace)
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Comma-separated platforms to keep; everything outside their replace
    /// chains is disabled
    #[arg(long, short = 'p', global = true)]
    platform: Option<String>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            index_dir: self.index_dir.clone(),
            explicit_platform: self.platform.clone(),
            ..Default::default()
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve a metadata tree and print projects, platforms, modules and dependencies
    Resolve(commands::resolve::ResolveArgs),

    /// Report which units are live according to the index
    Live(commands::live::LiveArgs),

    /// Show the classified index entries of one unit
    Entries(commands::entries::EntriesArgs),

    /// Check whether a project is built for more than the conventional units
    Multiplatform(commands::multiplatform::MultiplatformArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let workspace = commands::resolve_workspace(&cli.global)?;
    let config = commands::load_config(&cli.global, &workspace)?;
    init_logging(&cli.global, &config)?;

    let session = commands::Session { workspace, config };
    match cli.command {
        Commands::Resolve(args) => commands::resolve::execute(args, &cli.global, &session),
        Commands::Live(args) => commands::live::execute(args, &cli.global, &session),
        Commands::Entries(args) => commands::entries::execute(args, &cli.global, &session),
        Commands::Multiplatform(args) => {
            commands::multiplatform::execute(args, &cli.global, &session)
        }
    }
}

/// Install the stderr subscriber: `--quiet`/`--verbose` win over the
/// configured level, `RUST_LOG` wins over both.
fn init_logging(global: &GlobalOptions, config: &GraphConfig) -> Result<()> {
    let level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    match config.logging.format {
        LogFormat::Text => tracing::subscriber::set_global_default(builder.with_ansi(true).finish())?,
        LogFormat::Json => tracing::subscriber::set_global_default(builder.json().finish())?,
    }
    Ok(())
}
