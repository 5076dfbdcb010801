//! make:migration command - scaffolds a timestamped migration file

use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;

use crate::cli::{GlobalArgs, MakeMigrationArgs};
use crate::context::RuntimeContext;

/// Execute the make:migration command.
pub(crate) fn execute(args: &MakeMigrationArgs, global: &GlobalArgs) -> Result<()> {
    // Reject names that could cause path traversal or unusable filenames
    if args.name.is_empty()
        || args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid migration name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let ctx = RuntimeContext::new(global)?;
    let dir = ctx.migrations_dir();
    fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let file_name = kuppa_migrate::file::filename(Utc::now(), &args.name);
    let path = dir.join(&file_name);
    if path.exists() {
        anyhow::bail!("File {file_name} already exists.");
    }

    fs::write(&path, render_migration(&args.name))
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("[kuppa] Created: {}", path.display());
    Ok(())
}

/// Render the migration file content for a given name.
///
/// `create_<table>_table` names get a full table skeleton from the
/// schema builder; anything else gets empty sections to fill in.
pub(crate) fn render_migration(name: &str) -> String {
    match table_name_from(name) {
        Some(table) => {
            let up = kuppa_schema::ddl::create_table(&table, |t| {
                t.id();
                t.timestamps();
            });
            let down = kuppa_schema::ddl::drop_table(&table);
            format!("-- Migration: {name}\n-- kuppa:up\n{up}\n\n-- kuppa:down\n{down}\n")
        }
        None => format!("-- Migration: {name}\n-- kuppa:up\n\n-- kuppa:down\n"),
    }
}

/// Extract the table name from a `create_<table>_table` migration name.
pub(crate) fn table_name_from(name: &str) -> Option<String> {
    let table = name.strip_prefix("create_")?.strip_suffix("_table")?;
    if table.is_empty() {
        None
    } else {
        Some(table.to_string())
    }
}

#[cfg(test)]
#[path = "make_migration_test.rs"]
mod tests;
