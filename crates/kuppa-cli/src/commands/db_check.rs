//! db:check command - database inspector

use anyhow::Result;
use kuppa_db::{SqlBridge, SqlExecutor};
use serde_json::Value;

use crate::cli::{DbCheckArgs, GlobalArgs};
use crate::commands::common::warn_database_disabled;
use crate::context::RuntimeContext;

/// Execute the db:check command.
pub(crate) async fn execute(args: &DbCheckArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let Some(client) = ctx.connect()? else {
        warn_database_disabled("database inspection");
        return Ok(());
    };
    let bridge = SqlBridge::new(client);

    match &args.table {
        None => list_tables(&bridge).await,
        Some(table) => describe_table(&bridge, table).await,
    }
}

async fn list_tables(bridge: &SqlBridge) -> Result<()> {
    println!("[kuppa] Fetching tables...");
    let sql =
        "SELECT tablename FROM pg_catalog.pg_tables WHERE schemaname = 'public' ORDER BY tablename ASC";
    match bridge.query(sql).await {
        Ok(rows) if rows.is_empty() => {
            println!("[kuppa] No tables found in schema public.");
            Ok(())
        }
        Ok(rows) => {
            for row in &rows {
                if let Some(name) = row.get("tablename").and_then(Value::as_str) {
                    println!("  - {name}");
                }
            }
            println!("[kuppa] {} table(s).", rows.len());
            Ok(())
        }
        Err(err) if err.is_missing_function() => {
            print_setup_instructions();
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

async fn describe_table(bridge: &SqlBridge, table: &str) -> Result<()> {
    println!("[kuppa] Describing {table}...");
    let sql = format!(
        "SELECT column_name, data_type, is_nullable FROM information_schema.columns \
         WHERE table_schema = 'public' AND table_name = '{table}' ORDER BY ordinal_position"
    );
    match bridge.query(&sql).await {
        Ok(rows) if rows.is_empty() => {
            println!("[kuppa] Table '{table}' not found.");
            Ok(())
        }
        Ok(rows) => {
            for row in &rows {
                let name = row.get("column_name").and_then(Value::as_str).unwrap_or("?");
                let data_type = row.get("data_type").and_then(Value::as_str).unwrap_or("?");
                let nullable = row.get("is_nullable").and_then(Value::as_str).unwrap_or("?");
                println!("  {name:<30} {data_type:<25} nullable: {nullable}");
            }
            Ok(())
        }
        Err(err) if err.is_missing_function() => {
            print_setup_instructions();
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

/// The self-installation bootstrap needs the procedure it installs; a
/// deployment that never had it requires one manual run in the SQL
/// editor.
fn print_setup_instructions() {
    let rule = "-".repeat(66);
    println!("\n[!] Action Required: SQL helper function not found.");
    println!("Run this SQL in your Supabase SQL editor, then retry:\n");
    println!("{rule}");
    println!("{}", kuppa_db::installer_sql());
    println!("{rule}\n");
}
