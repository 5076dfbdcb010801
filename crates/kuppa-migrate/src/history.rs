//! Migration history persisted on the target database

use crate::error::{MigrateError, MigrateResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kuppa_db::{SqlBridge, SqlExecutor, SupabaseClient, SCHEMA_RELOAD_SQL};
use serde::Deserialize;
use serde_json::{json, Value};

/// One applied migration, as stored in the history table.
#[derive(Debug, Clone, Deserialize)]
pub struct MigrationRecord {
    pub id: i64,
    /// Migration file name; unique per application.
    pub migration: String,
    /// Batch the migration was applied in (≥ 1).
    pub batch: i64,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Bookkeeping operations over the history table.
///
/// The production implementation is [`SupabaseHistory`]; tests use an
/// in-memory store.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Idempotently create the history table.
    async fn ensure_table(&self) -> MigrateResult<()>;

    /// All records, ordered by id.
    async fn fetch_all(&self) -> MigrateResult<Vec<MigrationRecord>>;

    /// Whether `name` has been applied. A missing history table means
    /// nothing has run, not an error.
    async fn is_migrated(&self, name: &str) -> MigrateResult<bool>;

    /// Insert a history row for an applied migration.
    async fn record(&self, name: &str, batch: i64) -> MigrateResult<()>;

    /// Delete the history row for a reverted migration.
    async fn remove(&self, name: &str) -> MigrateResult<()>;
}

/// History store backed by the Supabase table API, with the raw-SQL
/// bridge for table creation.
pub struct SupabaseHistory {
    client: SupabaseClient,
    bridge: SqlBridge,
    table: String,
}

impl SupabaseHistory {
    pub fn new(client: SupabaseClient, table: &str) -> Self {
        let bridge = SqlBridge::new(client.clone());
        SupabaseHistory {
            client,
            bridge,
            table: table.to_string(),
        }
    }

    /// DDL creating the history table.
    ///
    /// RLS is disabled on it so the engine can always read and write
    /// its own ledger regardless of project policies.
    pub fn system_table_sql(table: &str) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    \
                 id SERIAL PRIMARY KEY,\n    \
                 migration TEXT NOT NULL UNIQUE,\n    \
                 batch INTEGER NOT NULL,\n    \
                 created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()\n\
             );\n\
             ALTER TABLE {table} DISABLE ROW LEVEL SECURITY;"
        )
    }
}

#[async_trait]
impl HistoryStore for SupabaseHistory {
    async fn ensure_table(&self) -> MigrateResult<()> {
        self.bridge
            .execute(&Self::system_table_sql(&self.table))
            .await?;
        Ok(())
    }

    async fn fetch_all(&self) -> MigrateResult<Vec<MigrationRecord>> {
        self.client
            .from(&self.table)
            .select("*")
            .order("id", true)
            .fetch::<MigrationRecord>()
            .await
            .map_err(MigrateError::HistoryFetch)
    }

    async fn is_migrated(&self, name: &str) -> MigrateResult<bool> {
        let result = self
            .client
            .from(&self.table)
            .select("migration")
            .eq("migration", name)
            .limit(1)
            .fetch::<Value>()
            .await;
        match result {
            Ok(rows) => Ok(!rows.is_empty()),
            // Uninitialized database: behave as if nothing has run
            Err(err) if err.is_missing_relation() => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    async fn record(&self, name: &str, batch: i64) -> MigrateResult<()> {
        let row = json!([{ "migration": name, "batch": batch }]);
        let inserted = self
            .client
            .from(&self.table)
            .insert(row.clone())
            .execute()
            .await;
        match inserted {
            Err(err) if err.is_missing_relation() => {
                log::warn!("history table missing, creating it and retrying");
                self.ensure_table().await?;
                // The REST layer caches the schema; reload so it can see
                // the table we just created.
                self.bridge.execute(SCHEMA_RELOAD_SQL).await?;
                self.client
                    .from(&self.table)
                    .insert(row)
                    .execute()
                    .await
                    .map_err(Into::into)
            }
            other => other.map_err(Into::into),
        }
    }

    async fn remove(&self, name: &str) -> MigrateResult<()> {
        self.client
            .from(&self.table)
            .delete()
            .eq("migration", name)
            .execute()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
