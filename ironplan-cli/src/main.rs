//! Ironplan CLI - Command line interface for Ironplan
//!
//! Turns workout plan text into stored workouts and keeps them in sync.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ironplan_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{CleanupArgs, GenerateArgs, ParseArgs, SetWeightArgs, ShowArgs, SyncArgs};

/// Ironplan: structured workouts from plain-text plans
#[derive(Parser, Debug)]
#[command(name = "ironplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the database file (overrides config and env)
    #[arg(long, global = true, env = "IRONPLAN_DB_PATH")]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Parse plan text without storing anything
    Parse(ParseArgs),

    /// Create or replace workouts from plan text
    #[command(visible_alias = "gen")]
    Generate(GenerateArgs),

    /// Delete workouts for days no longer in the plan text
    Cleanup(CleanupArgs),

    /// Generate and clean up, as after saving a plan
    Sync(SyncArgs),

    /// Show stored workouts for a plan
    Show(ShowArgs),

    /// Change an exercise's weight in plan text
    SetWeight(SetWeightArgs),

    /// Show current configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(cli.db.clone())?;

    if cli.verbose {
        tracing::info!(
            db = ?config.database.resolved_path(),
            busy_timeout = ?config.database.busy_timeout,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("ironplan {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Parse(args)) => {
            args.execute(cli.verbose)?;
        }
        Some(Commands::Generate(args)) => {
            args.execute(&config)?;
        }
        Some(Commands::Cleanup(args)) => {
            args.execute(&config)?;
        }
        Some(Commands::Sync(args)) => {
            args.execute(&config)?;
        }
        Some(Commands::Show(args)) => {
            args.execute(&config)?;
        }
        Some(Commands::SetWeight(args)) => {
            args.execute()?;
        }
        Some(Commands::Config) => {
            println!("Ironplan Configuration");
            println!("======================");
            println!();
            println!("Database Settings:");
            match config.database.resolved_path() {
                Some(path) => println!("  path: {}", path.display()),
                None => println!("  path: (unavailable)"),
            }
            println!(
                "  busy_timeout: {}ms",
                config.database.busy_timeout.as_millis()
            );
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Ironplan - structured workouts from plain-text plans");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
