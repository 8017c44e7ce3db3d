//! Error types for mig-core

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for migrate
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Migration file does not carry the `.sql` extension
    #[error("[C001] Invalid file type: {filename} should be a .sql file")]
    InvalidFileType { filename: String },

    /// C002: Migration filename does not follow `<epoch-millis>.<name>.sql`
    #[error("[C002] Invalid file name '{filename}': {reason}")]
    InvalidFilename { filename: String, reason: String },

    /// C003: Two migration files share a timestamp
    #[error("[C003] Migrations {first} and {second} share timestamp {timestamp}")]
    DuplicateTimestamp {
        timestamp: i64,
        first: String,
        second: String,
    },

    /// C004: Migration name cannot be turned into a filename
    #[error("[C004] Invalid migration name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// C005: Migration directory does not exist
    #[error("[C005] Migration directory not found: {}", path.display())]
    DirectoryNotFound { path: PathBuf },

    /// C006: Migration directory path is not a directory
    #[error("[C006] {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// C007: Failed to list the migration directory
    #[error("[C007] Failed to read migration directory {}", path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// C008: Failed to read a migration file
    #[error("[C008] Failed to read migration file {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// C009: Failed to create a migration file
    #[error("[C009] Failed to create migration file {}", path.display())]
    FileCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// C010: The ledger records more migrations than exist on disk
    #[error("[C010] Ledger records {ledger} applied migrations but only {files} migration files exist")]
    LedgerAhead { ledger: usize, files: usize },

    /// C011: The ledger and the files disagree at some position
    #[error("[C011] Applied migration {ledger} does not match migration file {file} at position {position}")]
    Drift {
        position: usize,
        ledger: String,
        file: String,
    },

    /// C012: An applied migration file was edited after it ran
    #[error("[C012] Migration {filename} was modified after it was applied (applied checksum {applied}, file checksum {current})")]
    InstructionChanged {
        filename: String,
        applied: String,
        current: String,
    },

    /// C013: Configuration file not found
    #[error("[C013] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C014: Failed to parse configuration file
    #[error("[C014] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// C015: Invalid configuration value
    #[error("[C015] Invalid config: {message}")]
    ConfigInvalid { message: String },
}

impl CoreError {
    /// Whether the error reports disagreement between the ledger and the files.
    ///
    /// These are never repaired automatically.
    pub fn is_consistency(&self) -> bool {
        matches!(
            self,
            CoreError::LedgerAhead { .. }
                | CoreError::Drift { .. }
                | CoreError::InstructionChanged { .. }
        )
    }

    /// Whether the error came from decoding a migration filename.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            CoreError::InvalidFileType { .. } | CoreError::InvalidFilename { .. }
        )
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
