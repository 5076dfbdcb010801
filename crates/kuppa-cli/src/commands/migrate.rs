//! Migration commands: migrate, migrate:rollback, migrate:fresh,
//! migrate:status

use anyhow::Result;
use kuppa_db::SqlBridge;
use kuppa_migrate::{
    Mode, MigrateError, RunOptions, RunOutcome, Runner, StatusEntry, SupabaseHistory,
    TerminalConfirmation,
};

use crate::cli::{GlobalArgs, MigrateArgs};
use crate::commands::common::{warn_database_disabled, ExitCode};
use crate::context::RuntimeContext;

/// Execute one migration command.
pub(crate) async fn execute(mode: Mode, args: &MigrateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let Some(client) = ctx.connect()? else {
        warn_database_disabled(&format!("migration mode {mode}"));
        return Ok(());
    };
    ctx.verbose(&format!(
        "migrations directory: {}",
        ctx.migrations_dir().display()
    ));

    let bridge = SqlBridge::new(client.clone());
    let history = SupabaseHistory::new(client, &ctx.config.database.history_table);
    let options = RunOptions {
        production: ctx.config.is_production(),
        force: args.force,
        migrations_dir: ctx.migrations_dir(),
        schema: ctx.config.database.schema.clone(),
    };

    println!("[kuppa] Starting database migration [Mode: {mode}]...");
    let runner = Runner::new(&history, &bridge, &TerminalConfirmation, options);
    match runner.run(mode).await {
        Ok(outcome) => {
            print_outcome(&outcome);
            Ok(())
        }
        Err(MigrateError::DirNotFound { path }) => {
            // Not an error for a project without migrations yet
            println!("[kuppa] Migrations directory not found: {path}");
            Ok(())
        }
        Err(err @ MigrateError::HistoryFetch(_)) => {
            eprintln!("[kuppa] Error fetching history: {err}");
            Err(ExitCode(1).into())
        }
        Err(MigrateError::ConfirmationUnavailable(message)) => {
            eprintln!("[kuppa] {message}");
            Err(ExitCode(2).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Applied { batch, files } => {
            for file in files {
                println!("[kuppa] Migrated: {file}");
            }
            println!(
                "[kuppa] Batch {batch} complete ({} migration{}).",
                files.len(),
                if files.len() == 1 { "" } else { "s" }
            );
        }
        RunOutcome::RolledBack { batch, files } => {
            for file in files {
                println!("[kuppa] Rolling back: {file}");
            }
            println!("[kuppa] Batch {batch} reverted.");
        }
        RunOutcome::Wiped { replay } => {
            println!("[kuppa] Database wiped. Re-starting...");
            print_outcome(replay);
        }
        RunOutcome::NothingToMigrate => println!("[kuppa] Nothing to migrate."),
        RunOutcome::NothingToRollback => println!("[kuppa] Nothing to roll back."),
        RunOutcome::Aborted => println!("[kuppa] Migration aborted by user."),
        RunOutcome::Halted {
            file,
            message,
            completed,
        } => {
            eprintln!("[kuppa] SQL Error in {file}: {message}");
            eprintln!(
                "[kuppa] Run halted; {} migration(s) before it completed.",
                completed.len()
            );
        }
        RunOutcome::Status(entries) => print_status(entries),
    }
}

fn print_status(entries: &[StatusEntry]) {
    let rule = "-".repeat(70);
    println!("\n Migration Status:");
    println!("{rule}");
    println!(" Ran?   |  Batch  |  Migration Name");
    println!("{rule}");
    for entry in entries {
        let ran = if entry.ran() { "  Yes" } else { "  No " };
        let batch = entry
            .batch
            .map(|b| format!("{b:>5}"))
            .unwrap_or_else(|| "  N/A".to_string());
        println!("{ran}   |  {batch}  |  {}", entry.file);
    }
    println!("{rule}\n");
}
