//! SQL execution trait

use crate::error::DbResult;
use async_trait::async_trait;
use serde_json::Value;

/// Raw-SQL execution abstraction for the migration core.
///
/// Implementations must be Send + Sync for async operation. The
/// production implementation is [`SqlBridge`]; tests substitute
/// in-process fakes.
///
/// [`SqlBridge`]: crate::bridge::SqlBridge
#[async_trait]
pub trait SqlExecutor: Send + Sync {
    /// Execute a statement (or statement batch), discarding output.
    async fn execute(&self, sql: &str) -> DbResult<()>;

    /// Execute a SELECT and return its rows as JSON objects.
    async fn query(&self, sql: &str) -> DbResult<Vec<Value>>;
}
