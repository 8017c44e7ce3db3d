//! mig-db - Database abstraction layer for migrate
//!
//! This crate provides the `Database` and `Transaction` capability traits the
//! ledger and executor are written against, and a DuckDB implementation.

pub mod duckdb;
pub mod error;
pub mod traits;

pub use duckdb::DuckDbBackend;
pub use error::{DbError, DbResult};
pub use tokio_util::sync::CancellationToken;
pub use traits::{check_cancelled, Database, Row, SqlValue, Transaction};
