//! kuppa-migrate - Migration engine for Kuppa
//!
//! Discovers on-disk migration files, tracks what has been applied in a
//! history table on the target database, and applies, reverts, or wipes
//! in deterministic order. The runner talks to the backend only through
//! the [`SqlExecutor`] and [`HistoryStore`] abstractions, so every piece
//! of its behavior is testable in process.
//!
//! [`SqlExecutor`]: kuppa_db::SqlExecutor
//! [`HistoryStore`]: crate::history::HistoryStore

pub mod confirm;
pub mod error;
pub mod file;
pub mod history;
pub mod runner;

pub use confirm::{Confirmation, TerminalConfirmation};
pub use error::{MigrateError, MigrateResult};
pub use file::MigrationFile;
pub use history::{HistoryStore, MigrationRecord, SupabaseHistory};
pub use runner::{Mode, RunOptions, RunOutcome, Runner, StatusEntry};
