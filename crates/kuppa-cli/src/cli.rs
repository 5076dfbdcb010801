//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// Kuppa - migrations, scaffolding, and database inspection for
/// Supabase-backed projects
#[derive(Parser, Debug)]
#[command(name = "kuppa")]
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
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending migrations
    Migrate(MigrateArgs),

    /// Revert the most recent migration batch
    #[command(name = "migrate:rollback")]
    MigrateRollback(MigrateArgs),

    /// Drop every table in the working schema and replay all migrations
    #[command(name = "migrate:fresh")]
    MigrateFresh(MigrateArgs),

    /// Show which migrations have run, and in which batch
    #[command(name = "migrate:status")]
    MigrateStatus(MigrateArgs),

    /// Create a timestamped migration file
    #[command(name = "make:migration")]
    MakeMigration(MakeMigrationArgs),

    /// List tables, or describe one table's columns
    #[command(name = "db:check")]
    DbCheck(DbCheckArgs),

    /// Interactive SQL shell against the database
    Sql,
}

/// Arguments shared by the migration commands
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Skip interactive confirmations (production guard and wipe)
    #[arg(long)]
    pub force: bool,
}

/// Arguments for make:migration
#[derive(Args, Debug)]
pub struct MakeMigrationArgs {
    /// Snake-case migration name (e.g. create_posts_table)
    pub name: String,
}

/// Arguments for db:check
#[derive(Args, Debug)]
pub struct DbCheckArgs {
    /// Table to describe; lists all public tables when omitted
    pub table: Option<String>,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
