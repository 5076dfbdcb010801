//! Error types for kuppa-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection setup error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Transport-level request failure (D002)
    #[error("[D002] Request failed: {0}")]
    Transport(String),

    /// Error reported by the backend (D003)
    ///
    /// `code` is the PostgREST/Postgres error code when the backend
    /// provided one, empty otherwise.
    #[error("[D003] Backend error ({status} {code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Response decoding error (D004)
    #[error("[D004] Failed to decode response: {0}")]
    Decode(String),

    /// Database features are disabled (D005)
    #[error("[D005] Database features are disabled: {0}")]
    Disabled(String),
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;

impl DbError {
    /// Whether this error means the `kuppa_execute_sql` procedure is not
    /// installed (or not visible in the PostgREST schema cache).
    ///
    /// PostgREST reports a missing RPC as `PGRST202`; older deployments
    /// surface a Postgres `42883` (undefined function) instead. The
    /// message match is a last resort for proxies that rewrite codes.
    pub fn is_missing_function(&self) -> bool {
        match self {
            DbError::Api { code, message, .. } => {
                code == "PGRST202"
                    || code == "42883"
                    || message.contains(crate::installer::SQL_FUNCTION)
            }
            _ => false,
        }
    }

    /// Whether this error means the queried table does not exist.
    ///
    /// `PGRST205` is PostgREST's schema-cache miss; `42P01` is the raw
    /// Postgres undefined-table code.
    pub fn is_missing_relation(&self) -> bool {
        match self {
            DbError::Api { code, message, .. } => {
                code == "PGRST205"
                    || code == "42P01"
                    || message.contains("Could not find the table")
                    || message.contains("does not exist")
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DbError {
    fn from(err: reqwest::Error) -> Self {
        DbError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Decode(err.to_string())
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
