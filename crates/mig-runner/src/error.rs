//! Error types for mig-runner
//!
//! Each variant names the stage that failed and keeps the component error as
//! its source, so callers can still tell a consistency error from a driver
//! error.

use mig_core::CoreError;
use mig_db::DbError;
use std::path::PathBuf;
use thiserror::Error;

/// Migration run errors
#[derive(Error, Debug)]
pub enum RunnerError {
    /// R001: Ledger table could not be created
    #[error("[R001] Failed to ensure migrations table {table}")]
    EnsureSchema {
        table: String,
        #[source]
        source: DbError,
    },

    /// R002: Applied migrations could not be read
    #[error("[R002] Failed to list applied migrations from {table}")]
    ListApplied {
        table: String,
        #[source]
        source: DbError,
    },

    /// R003: Migration directory could not be scanned
    #[error("[R003] Failed to scan migration directory {}", dir.display())]
    Scan {
        dir: PathBuf,
        #[source]
        source: CoreError,
    },

    /// R004: Applied migrations and files disagree
    #[error("[R004] Applied migrations do not match migration files")]
    Consistency {
        #[source]
        source: CoreError,
    },

    /// R005: Transaction could not be started
    #[error("[R005] Failed to begin migration transaction")]
    Begin {
        #[source]
        source: DbError,
    },

    /// R006: A migration statement failed; the batch was rolled back
    #[error("[R006] Migration {filename} failed at statement {statement}")]
    Statement {
        filename: String,
        statement: usize,
        #[source]
        source: DbError,
    },

    /// R007: Applied migrations could not be recorded; the batch was rolled back
    #[error("[R007] Failed to record applied migrations in {table}")]
    Record {
        table: String,
        #[source]
        source: DbError,
    },

    /// R008: Commit failed
    #[error("[R008] Failed to commit migration transaction")]
    Commit {
        #[source]
        source: DbError,
    },

    /// R009: Run cancelled before commit; nothing was applied
    #[error("[R009] Migration run cancelled")]
    Cancelled,
}

impl RunnerError {
    /// Whether the run stopped because the caller cancelled it.
    pub fn is_cancelled(&self) -> bool {
        match self {
            RunnerError::Cancelled => true,
            RunnerError::EnsureSchema { source, .. }
            | RunnerError::ListApplied { source, .. }
            | RunnerError::Begin { source }
            | RunnerError::Statement { source, .. }
            | RunnerError::Record { source, .. }
            | RunnerError::Commit { source } => source.is_cancelled(),
            RunnerError::Scan { .. } | RunnerError::Consistency { .. } => false,
        }
    }

    /// Whether the ledger and the migration files disagree.
    pub fn is_consistency(&self) -> bool {
        matches!(self, RunnerError::Consistency { .. })
    }
}

/// Result type alias for RunnerError
pub type RunnerResult<T> = Result<T, RunnerError>;
