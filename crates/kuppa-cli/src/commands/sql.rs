//! sql command - interactive SQL shell

use anyhow::Result;
use kuppa_db::{SqlBridge, SqlExecutor};
use serde_json::Value;
use std::io::{BufRead, Write};

use crate::cli::GlobalArgs;
use crate::commands::common::warn_database_disabled;
use crate::context::RuntimeContext;

/// Execute the sql command.
pub(crate) async fn execute(global: &GlobalArgs) -> Result<()> {
    let ctx = RuntimeContext::new(global)?;
    let Some(client) = ctx.connect()? else {
        warn_database_disabled("SQL shell");
        return Ok(());
    };
    let bridge = SqlBridge::new(client);

    // Refresh the SQL engine on every shell entry so grants and
    // definition drift self-heal. Best effort: the shell still opens
    // when the bootstrap cannot run.
    if let Err(err) = bridge.install().await {
        log::warn!("could not refresh SQL engine: {err}");
    }

    println!("Kuppa SQL Shell");
    println!("Connected to Supabase. Type \"exit\" to quit.\n");

    let stdin = std::io::stdin();
    loop {
        print!("kuppa-sql> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }
        let query = line.trim();
        if query.eq_ignore_ascii_case("exit") {
            break;
        }
        if query.is_empty() {
            continue;
        }

        if query.to_lowercase().starts_with("select") {
            match bridge.query(query).await {
                Ok(rows) if rows.is_empty() => println!("Query executed: no rows returned."),
                Ok(rows) => {
                    for row in &rows {
                        println!("{}", render_row(row));
                    }
                }
                Err(err) => eprintln!("[SQL Error]: {err}"),
            }
        } else {
            match bridge.execute(query).await {
                Ok(()) => println!("Query executed successfully."),
                Err(err) => eprintln!("[SQL Error]: {err}"),
            }
        }
    }
    Ok(())
}

/// Compact one row for terminal display.
pub(crate) fn render_row(row: &Value) -> String {
    match row {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| format!("{key}={}", render_value(value)))
            .collect::<Vec<_>>()
            .join("  "),
        other => render_value(other),
    }
}

/// Truncate long strings so rows stay readable in a terminal.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 15 => {
            format!("{}...", s.chars().take(15).collect::<String>())
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "sql_test.rs"]
mod tests;
