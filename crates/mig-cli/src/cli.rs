//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// migrate - forward-only SQL migrations tracked in a ledger table
#[derive(Parser, Debug)]
#[command(name = "migrate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all logging except errors (wins over --verbose)
    #[arg(short, long, global = true)]
    pub suppress: bool,

    /// Config file to use instead of ./migrate.yml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new, empty migration file
    Create(CreateArgs),

    /// Apply every pending migration in one transaction
    Run(RunArgs),

    /// List applied and pending migrations without applying anything
    Status(StatusArgs),
}

/// Arguments for the create command
#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Directory to create the migration in
    #[arg(short, long, env = "MIGRATE_DIR")]
    pub dir: PathBuf,

    /// Migration name; spaces become hyphens
    #[arg(short, long)]
    pub name: String,
}

/// Connection and location arguments shared by run and status
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Directory holding the migration files
    #[arg(short, long, env = "MIGRATE_DIR")]
    pub dir: Option<PathBuf>,

    /// Ledger table name
    #[arg(short, long, env = "MIGRATE_TABLE")]
    pub table: Option<String>,

    /// Database file to migrate
    #[arg(long, env = "MIGRATE_DB")]
    pub db: Option<String>,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub target: TargetArgs,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// One line per migration
    Text,
    /// JSON array
    Json,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
