// SPDX-FileCopyrightText: 2026 Querygate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Querygate - guarded natural-language SQL chat over SQLite.
//!
//! This is the binary entry point.

mod inspect;
mod pipeline;
#[cfg(feature = "gateway")]
mod serve;
mod shell;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use colored::Colorize;
use querygate_config::diagnostic::figment_to_config_errors;
use querygate_config::{render_errors, ConfigError, QuerygateConfig};
use querygate_core::QuerygateError;

/// Querygate - ask questions about a SQLite database in plain language.
#[derive(Parser, Debug)]
#[command(name = "querygate", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this TOML file instead of ./querygate.toml.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start an interactive chat session (the default).
    Shell,
    /// Serve the HTTP API.
    #[cfg(feature = "gateway")]
    Serve,
    /// Create the sample database.
    Seed {
        /// Where to write it; defaults to the configured database path.
        path: Option<PathBuf>,
    },
    /// Show tables, columns, row counts and sample rows.
    Schema,
    /// Print the resolved configuration with secrets masked.
    Config,
}

/// How much of the configuration a command needs to be valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Requirement {
    /// Parsed only.
    Parsed,
    /// The database file must exist.
    Database,
    /// Fully validated, and the database file must exist.
    Full,
}

impl Commands {
    fn requirement(&self) -> Requirement {
        match self {
            Commands::Shell => Requirement::Full,
            #[cfg(feature = "gateway")]
            Commands::Serve => Requirement::Full,
            Commands::Schema => Requirement::Database,
            Commands::Seed { .. } | Commands::Config => Requirement::Parsed,
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Shell);

    let config = match load_config(cli.config.as_deref(), command.requirement()) {
        Ok(config) => config,
        Err(errors) => {
            render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level);

    let result = match command {
        Commands::Shell => shell::run_shell(config).await,
        #[cfg(feature = "gateway")]
        Commands::Serve => serve::run_serve(config).await,
        Commands::Seed { path } => run_seed(&config, path).await,
        Commands::Schema => inspect::run_schema(&config).await,
        Commands::Config => run_config(&config),
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// Resolves configuration and checks what `requirement` asks for.
fn load_config(
    file: Option<&Path>,
    requirement: Requirement,
) -> Result<QuerygateConfig, Vec<ConfigError>> {
    let loaded = match file {
        Some(path) => querygate_config::load_config_from_path(path),
        None => querygate_config::load_config(),
    };
    let config = loaded.map_err(figment_to_config_errors)?;

    if requirement == Requirement::Full {
        querygate_config::validate_config(&config)?;
    }
    if requirement != Requirement::Parsed {
        querygate_config::check_database_path(&config.database.path).map_err(|e| vec![e])?;
    }
    Ok(config)
}

/// Initializes the tracing subscriber. `RUST_LOG` overrides the configured level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("querygate={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_seed(config: &QuerygateConfig, path: Option<PathBuf>) -> Result<(), QuerygateError> {
    let path = path.unwrap_or_else(|| PathBuf::from(&config.database.path));
    let summary = querygate_storage::seed_sample_database(&path).await?;
    println!(
        "{} {}",
        "Sample database created:".green().bold(),
        path.display()
    );
    println!("{summary}");
    Ok(())
}

fn run_config(config: &QuerygateConfig) -> Result<(), QuerygateError> {
    let rendered = toml::to_string_pretty(&config.redacted())
        .map_err(|e| QuerygateError::Internal(format!("failed to render configuration: {e}")))?;
    println!("{rendered}");

    if let Err(errors) = querygate_config::validate_config(config) {
        render_errors(&errors);
        return Err(QuerygateError::Config(format!(
            "{} configuration problem(s) found",
            errors.len()
        )));
    }
    Ok(())
}
