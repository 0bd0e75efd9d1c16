//! Error types for the PostgreSQL storage backend.

use medtour_storage::StorageError;
use sqlx_core::error::Error as SqlxError;

/// PostgreSQL error code for unique violation (23505).
pub const PG_UNIQUE_VIOLATION: &str = "23505";

/// Checks if a sqlx error has a specific PostgreSQL error code.
pub fn has_pg_error_code(err: &SqlxError, code: &str) -> bool {
    if let SqlxError::Database(db_err) = err {
        db_err.code().as_deref() == Some(code)
    } else {
        false
    }
}

/// Returns `true` for errors meaning the database could not be reached.
pub fn is_connection_error(err: &SqlxError) -> bool {
    matches!(
        err,
        SqlxError::Io(_)
            | SqlxError::Tls(_)
            | SqlxError::PoolTimedOut
            | SqlxError::PoolClosed
            | SqlxError::WorkerCrashed
    )
}

/// Derives the document field from a unique constraint name.
///
/// Index names follow `<table>_<field>_key`; the primary key maps to `_id`.
pub(crate) fn field_from_constraint(table: &str, constraint: &str) -> String {
    if constraint.ends_with("_pkey") {
        return "_id".to_string();
    }
    constraint
        .strip_prefix(table)
        .and_then(|rest| rest.strip_prefix('_'))
        .and_then(|rest| rest.strip_suffix("_key"))
        .unwrap_or(constraint)
        .to_string()
}

/// Maps a sqlx error raised while working on `table` into a storage error.
pub(crate) fn map_sqlx_error(table: &str, err: SqlxError) -> StorageError {
    if has_pg_error_code(&err, PG_UNIQUE_VIOLATION) {
        let field = match &err {
            SqlxError::Database(db_err) => db_err
                .constraint()
                .map(|c| field_from_constraint(table, c))
                .unwrap_or_else(|| "_id".to_string()),
            _ => "_id".to_string(),
        };
        return StorageError::already_exists(table, field);
    }
    if is_connection_error(&err) {
        return StorageError::connection_error(err.to_string());
    }
    StorageError::internal(format!("Query on {table} failed: {err}"))
}

/// Errors specific to the PostgreSQL storage backend.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    /// Database connection error.
    #[error("Database connection error: {0}")]
    Connection(#[from] sqlx_core::error::Error),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Schema management error.
    #[error("Schema error: {message}")]
    Schema { message: String },
}

impl PostgresError {
    /// Creates a new configuration error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates a new schema error.
    #[must_use]
    pub fn schema(message: impl Into<String>) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) if is_connection_error(&e) => {
                StorageError::connection_error(e.to_string())
            }
            PostgresError::Connection(e) => StorageError::internal(e.to_string()),
            PostgresError::Config { message } => {
                StorageError::internal(format!("Configuration error: {message}"))
            }
            PostgresError::Schema { message } => {
                StorageError::internal(format!("Schema error: {message}"))
            }
        }
    }
}

/// Result type alias for PostgreSQL operations.
pub type Result<T> = std::result::Result<T, PostgresError>;
