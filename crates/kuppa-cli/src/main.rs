//! Kuppa CLI - migrations, scaffolding, and database inspection

use clap::Parser;

mod cli;
mod commands;
mod context;

use cli::{Cli, Commands};
use commands::{db_check, make_migration, migrate, sql};
use kuppa_migrate::Mode;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Migrate(args) => migrate::execute(Mode::Up, args, &cli.global).await,
        Commands::MigrateRollback(args) => migrate::execute(Mode::Down, args, &cli.global).await,
        Commands::MigrateFresh(args) => migrate::execute(Mode::Fresh, args, &cli.global).await,
        Commands::MigrateStatus(args) => migrate::execute(Mode::Status, args, &cli.global).await,
        Commands::MakeMigration(args) => make_migration::execute(args, &cli.global),
        Commands::DbCheck(args) => db_check::execute(args, &cli.global).await,
        Commands::Sql => sql::execute(&cli.global).await,
    };

    if let Err(err) = result {
        if let Some(code) = err.downcast_ref::<commands::common::ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("[kuppa] {err:#}");
        std::process::exit(1);
    }
}
