//! Error types for the migration engine.

use kuppa_db::DbError;
use thiserror::Error;

/// Migration engine errors.
#[derive(Error, Debug)]
pub enum MigrateError {
    /// Migrations directory does not exist (M001).
    #[error("[M001] Migrations directory not found: {path}")]
    DirNotFound { path: String },

    /// A migration file could not be parsed (M002).
    #[error("[M002] Invalid migration file {name}: {message}")]
    InvalidFile { name: String, message: String },

    /// The migration history could not be fetched (M003).
    ///
    /// Kept separate from other database errors: the CLI reserves exit
    /// code 1 for exactly this failure.
    #[error("[M003] Failed to fetch migration history: {0}")]
    HistoryFetch(DbError),

    /// Database error outside the history fetch (M004).
    #[error("[M004] {0}")]
    Db(#[from] DbError),

    /// Filesystem error (M005).
    #[error("[M005] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A confirmation was required but could not be asked (M006).
    #[error("[M006] Confirmation unavailable: {0}")]
    ConfirmationUnavailable(String),
}

/// Result type alias for [`MigrateError`].
pub type MigrateResult<T> = Result<T, MigrateError>;
