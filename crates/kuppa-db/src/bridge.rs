//! Remote SQL execution bridge

use crate::client::SupabaseClient;
use crate::error::{DbError, DbResult};
use crate::installer::{installer_sql, SQL_FUNCTION};
use crate::traits::SqlExecutor;
use async_trait::async_trait;
use serde_json::{json, Value};

/// Routes raw SQL through the `kuppa_execute_sql` remote procedure.
///
/// When a call fails because the procedure is missing, the bridge
/// reinstalls it and retries once. The installation itself goes through
/// the same procedure, so a deployment where it has never existed needs
/// one manual bootstrap in the SQL editor — the CLI prints
/// [`installer_sql`] for exactly that case.
#[derive(Debug, Clone)]
pub struct SqlBridge {
    client: SupabaseClient,
}

impl SqlBridge {
    pub fn new(client: SupabaseClient) -> Self {
        SqlBridge { client }
    }

    /// (Re)install the remote procedure and its grants.
    ///
    /// Safe to call on every startup; the DDL drops and recreates the
    /// function and re-grants execute each time.
    pub async fn install(&self) -> DbResult<()> {
        log::debug!("installing {SQL_FUNCTION}");
        self.client
            .rpc(SQL_FUNCTION, json!({ "sql_query": installer_sql() }))
            .await?;
        Ok(())
    }

    async fn call(&self, sql: &str) -> DbResult<Value> {
        let params = json!({ "sql_query": sql });
        match self.client.rpc(SQL_FUNCTION, params.clone()).await {
            Err(err) if err.is_missing_function() => {
                log::warn!("{SQL_FUNCTION} missing, attempting self-installation");
                self.install().await?;
                self.client.rpc(SQL_FUNCTION, params).await
            }
            other => other,
        }
    }
}

#[async_trait]
impl SqlExecutor for SqlBridge {
    async fn execute(&self, sql: &str) -> DbResult<()> {
        self.call(sql).await?;
        Ok(())
    }

    async fn query(&self, sql: &str) -> DbResult<Vec<Value>> {
        match self.call(sql).await? {
            // jsonb_agg over zero rows yields NULL, not an empty array
            Value::Null => Ok(Vec::new()),
            Value::Array(rows) => Ok(rows),
            other => Err(DbError::Decode(format!(
                "expected a JSON array of rows, got: {other}"
            ))),
        }
    }
}
