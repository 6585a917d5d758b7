//! # customs-cli
//!
//! The `customs` command surface. Applications embed it from their own
//! binary so their compiled-in migrations are available by name:
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     customs_cli::main_with(data_migrations::registry()).await
//! }
//! ```

pub mod commands;
pub mod error;

pub use error::CliError;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use customs_core::config::DEFAULT_MIGRATIONS_DIR;
use customs_core::{init_logging, LoggingConfig};
use customs_orm::MigrationRegistry;

use commands::run::RunOptions;

#[derive(Parser, Debug)]
#[command(name = "customs")]
#[command(version, about = "Run transactional, self-verifying data migrations")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a data migration inside a single transaction
    Run {
        /// Migration name, e.g. `backfill_display_names`
        #[arg(env = "NAME")]
        name: Option<String>,

        /// Comma-separated arguments passed to the migration's constructor
        #[arg(long, env = "ARGS", allow_hyphen_values = true)]
        args: Option<String>,

        /// Rows per batch for the batching helpers
        #[arg(long)]
        batch_size: Option<usize>,

        /// Seconds to pause after each batch; zero or negative disables pausing
        #[arg(long, allow_negative_numbers = true)]
        throttle: Option<f64>,

        /// Transaction isolation level, e.g. `serializable`
        #[arg(long)]
        isolation_level: Option<String>,
    },

    /// Generate a new data migration file and refresh the registry module
    Generate {
        /// Migration name, e.g. `backfill_display_names`
        name: String,

        /// Directory holding the data migrations
        #[arg(long, env = "CUSTOMS_MIGRATIONS_DIR", default_value = DEFAULT_MIGRATIONS_DIR)]
        dir: PathBuf,

        /// Overwrite an existing migration file
        #[arg(long)]
        force: bool,
    },

    /// List the data migrations compiled into this binary
    List,

    /// Show the resolved configuration and where each value came from
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Execute a parsed command line against `registry`
pub async fn execute(cli: Cli, registry: &MigrationRegistry) -> Result<(), CliError> {
    match cli.command {
        Commands::Run {
            name,
            args,
            batch_size,
            throttle,
            isolation_level,
        } => {
            let options = RunOptions {
                batch_size,
                throttle,
                isolation_level,
            };
            commands::run::run(registry, name.as_deref(), args.as_deref(), &options).await
        }
        Commands::Generate { name, dir, force } => commands::generate::generate(&name, &dir, force),
        Commands::List => {
            print!("{}", commands::list::render(registry));
            Ok(())
        }
        Commands::Config { json } => commands::config::show(json),
    }
}

/// Parse the process arguments, run the command and map the outcome to an exit code
pub async fn main_with(registry: MigrationRegistry) -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(logging_config(cli.verbose, |key| env::var(key).ok())) {
        eprintln!("⚠️  Failed to initialize logging: {}", e);
    }

    match execute(cli, &registry).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("❌ {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

/// Logging settings from `CUSTOMS_LOG` and `CUSTOMS_LOG_FORMAT`, raised by `-v` flags
fn logging_config<F>(verbose: u8, lookup: F) -> LoggingConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = LoggingConfig::from_lookup(lookup).unwrap_or_else(|e| {
        eprintln!("⚠️  {}; using default logging", e);
        LoggingConfig::default()
    });

    match verbose {
        0 => {}
        1 => config.level = "info".to_string(),
        2 => config.level = "debug".to_string(),
        _ => config.level = "trace".to_string(),
    }
    config
}
