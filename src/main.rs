//! The interactive CLI (§6 "CLI surface", ambient per §2a): a `clap`-derived
//! argument parser wrapping a `rustyline`-backed REPL that accumulates
//! multi-line input terminated by `;`.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tinysql::engine::{Config, Engine, LogLevel};

/// An embedded single-file SQL engine with an interactive shell.
#[derive(Parser, Debug)]
#[command(name = "tinysql", about = "An embedded SQL engine")]
struct Cli {
    /// Path to the database file. Omit to run in-memory only.
    database: Option<PathBuf>,

    /// Bump the configured log level to `debug` (overridden by RUST_LOG when set).
    #[arg(short, long)]
    verbose: bool,
}

/// Derives the tracing filter from `config.log_level` (itself set by
/// `SQL_ENGINE_LOG_LEVEL`, §2a), with `-v` bumping anything below `debug`
/// up to `debug`. `RUST_LOG` always wins when present.
fn install_logging(config_level: LogLevel, verbose: bool) {
    let level = if verbose {
        config_level.max(LogLevel::Debug)
    } else {
        config_level
    };
    let default_filter = level.as_tracing_filter();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() {
    let cli = Cli::parse();

    let mut config = Config {
        file_path: cli.database,
        ..Config::default()
    };
    config.apply_environment_overrides();
    install_logging(config.log_level, cli.verbose);

    let mut engine = match Engine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = tinysql::repl::run(&mut engine) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
