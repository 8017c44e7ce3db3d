//! Error types for mig-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error (D001)
    #[error("[D001] Database connection failed: {0}")]
    ConnectionError(String),

    /// Statement execution error (D002)
    #[error("[D002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Query error (D003)
    #[error("[D003] SQL query failed: {0}")]
    QueryError(String),

    /// Transaction management error (D004)
    #[error("[D004] Transaction failed: {0}")]
    TransactionError(String),

    /// A row did not have the expected shape (D005)
    #[error("[D005] Unexpected row: {0}")]
    UnexpectedRow(String),

    /// The caller cancelled the operation (D006)
    #[error("[D006] Operation cancelled")]
    Cancelled,

    /// Mutex poisoned (D007)
    #[error("[D007] Database mutex poisoned: {0}")]
    MutexPoisoned(String),
}

impl DbError {
    /// Whether the error is a cancellation rather than a database failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DbError::Cancelled)
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
