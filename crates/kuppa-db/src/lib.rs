//! kuppa-db - Database layer for Kuppa
//!
//! Supabase exposes a constrained per-table REST interface, not raw SQL.
//! This crate provides both halves the migration core needs: a typed
//! client for the table interface ([`SupabaseClient`] / [`TableQuery`])
//! and a bridge that routes arbitrary SQL through the
//! `kuppa_execute_sql` remote procedure ([`SqlBridge`]), installing that
//! procedure on demand.

pub mod bridge;
pub mod client;
pub mod error;
pub mod installer;
pub mod query;
pub mod traits;

pub use bridge::SqlBridge;
pub use client::SupabaseClient;
pub use error::{DbError, DbResult};
pub use installer::{installer_sql, SCHEMA_RELOAD_SQL, SQL_FUNCTION};
pub use query::TableQuery;
pub use traits::SqlExecutor;
