//! Database capability traits

use crate::error::{DbError, DbResult};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// A single bound parameter or result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
}

impl SqlValue {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

/// One result row, columns in select-list order.
pub type Row = Vec<SqlValue>;

/// Return [`DbError::Cancelled`] if `cancel` has fired.
pub fn check_cancelled(cancel: &CancellationToken) -> DbResult<()> {
    if cancel.is_cancelled() {
        Err(DbError::Cancelled)
    } else {
        Ok(())
    }
}

/// Database handle the ledger and executor are written against.
///
/// Every call takes a cancellation token; an already-cancelled token makes
/// the call return [`DbError::Cancelled`] without touching the connection.
/// Implementations must be Send + Sync for async operation.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute one statement, returning the number of affected rows
    async fn execute(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[SqlValue],
    ) -> DbResult<usize>;

    /// Execute one query and collect every row
    async fn query(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[SqlValue],
    ) -> DbResult<Vec<Row>>;

    /// Begin a transaction
    async fn begin<'a>(&'a self, cancel: &CancellationToken)
        -> DbResult<Box<dyn Transaction + 'a>>;

    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;
}

/// An open transaction.
///
/// Dropping a transaction without calling [`commit`](Self::commit) or
/// [`rollback`](Self::rollback) rolls it back.
#[async_trait]
pub trait Transaction: Send {
    /// Execute one statement inside the transaction
    async fn execute(
        &mut self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[SqlValue],
    ) -> DbResult<usize>;

    /// Commit. Not cancellable: once started it completes or fails on its own.
    async fn commit(self: Box<Self>) -> DbResult<()>;

    /// Roll back every statement executed in the transaction
    async fn rollback(self: Box<Self>) -> DbResult<()>;
}
