//! DuckDB database backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{check_cancelled, Database, Row, SqlValue, Transaction};
use async_trait::async_trait;
use duckdb::types::Value;
use duckdb::{params_from_iter, Connection, InterruptHandle};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio_util::sync::CancellationToken;

/// DuckDB database backend
///
/// Transactions are explicit `BEGIN` / `COMMIT` / `ROLLBACK` statements on the
/// single shared connection, so only one transaction may be open at a time.
///
/// Statements and queries run on tokio's blocking pool. Cancelling the token
/// while one is running interrupts it through the connection's
/// [`InterruptHandle`] and the call returns [`DbError::Cancelled`].
pub struct DuckDbBackend {
    conn: Arc<Mutex<Connection>>,
    interrupt: Arc<InterruptHandle>,
}

impl DuckDbBackend {
    /// Create a new in-memory DuckDB connection
    pub fn in_memory() -> DbResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| DbError::ConnectionError(e.to_string()))?;
        Ok(Self::from_connection(conn))
    }

    /// Create a new DuckDB connection from a file path
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| DbError::ConnectionError(format!("{e}: {}", path.display())))?;
        Ok(Self::from_connection(conn))
    }

    fn from_connection(conn: Connection) -> Self {
        let interrupt = conn.interrupt_handle();
        Self {
            conn: Arc::new(Mutex::new(conn)),
            interrupt,
        }
    }

    /// Create from path string (handles :memory: special case)
    pub fn new(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DbError::MutexPoisoned(e.to_string()))
    }

    /// Run `work` on the blocking pool, interrupting it if `cancel` fires.
    ///
    /// A statement that fails after the token fired reports
    /// [`DbError::Cancelled`]; one that finished before the interrupt landed
    /// keeps its own result.
    async fn run_cancellable<T, F>(&self, cancel: &CancellationToken, work: F) -> DbResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> DbResult<T> + Send + 'static,
    {
        check_cancelled(cancel)?;
        let conn = Arc::clone(&self.conn);
        let mut task = tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| DbError::MutexPoisoned(e.to_string()))?;
            work(&conn)
        });

        let joined = tokio::select! {
            joined = &mut task => joined,
            () = cancel.cancelled() => {
                self.interrupt.interrupt();
                task.await
            }
        };

        match joined {
            Ok(Err(_)) if cancel.is_cancelled() => Err(DbError::Cancelled),
            Ok(result) => result,
            Err(join_err) => Err(DbError::ExecutionError(format!(
                "database task failed: {join_err}"
            ))),
        }
    }

    async fn execute_cancellable(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[SqlValue],
    ) -> DbResult<usize> {
        let sql = sql.to_string();
        let params: Vec<Value> = params.iter().map(to_duckdb).collect();
        self.run_cancellable(cancel, move |conn| {
            conn.execute(&sql, params_from_iter(params))
                .map_err(|e| DbError::ExecutionError(format!("{e}: {sql}")))
        })
        .await
    }

    /// Execute a transaction control statement synchronously
    fn control_sync(&self, sql: &str) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(sql)
            .map_err(|e| DbError::TransactionError(format!("{sql} failed: {e}")))
    }
}

#[async_trait]
impl Database for DuckDbBackend {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[SqlValue],
    ) -> DbResult<usize> {
        self.execute_cancellable(cancel, sql, params).await
    }

    async fn query(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[SqlValue],
    ) -> DbResult<Vec<Row>> {
        let sql = sql.to_string();
        let params: Vec<Value> = params.iter().map(to_duckdb).collect();
        self.run_cancellable(cancel, move |conn| query_rows(conn, &sql, params))
            .await
    }

    async fn begin<'a>(
        &'a self,
        cancel: &CancellationToken,
    ) -> DbResult<Box<dyn Transaction + 'a>> {
        check_cancelled(cancel)?;
        self.control_sync("BEGIN TRANSACTION")?;
        Ok(Box::new(DuckDbTransaction {
            backend: self,
            finished: false,
        }))
    }

    fn db_type(&self) -> &'static str {
        "duckdb"
    }
}

/// Transaction on a [`DuckDbBackend`] connection
struct DuckDbTransaction<'a> {
    backend: &'a DuckDbBackend,
    finished: bool,
}

#[async_trait]
impl Transaction for DuckDbTransaction<'_> {
    async fn execute(
        &mut self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[SqlValue],
    ) -> DbResult<usize> {
        self.backend.execute_cancellable(cancel, sql, params).await
    }

    async fn commit(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        if let Err(commit_err) = self.backend.control_sync("COMMIT") {
            let _ = self.backend.control_sync("ROLLBACK");
            return Err(commit_err);
        }
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        self.backend.control_sync("ROLLBACK")
    }
}

impl Drop for DuckDbTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            let _ = self.backend.control_sync("ROLLBACK");
        }
    }
}

fn query_rows(conn: &Connection, sql: &str, params: Vec<Value>) -> DbResult<Vec<Row>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| DbError::QueryError(format!("{e}: {sql}")))?;

    let raw_rows = stmt
        .query_map(params_from_iter(params), |row| {
            let columns = row.as_ref().column_count();
            (0..columns)
                .map(|i| row.get::<_, Value>(i))
                .collect::<duckdb::Result<Vec<Value>>>()
        })
        .map_err(|e| DbError::QueryError(format!("{e}: {sql}")))?
        .collect::<duckdb::Result<Vec<Vec<Value>>>>()
        .map_err(|e| DbError::QueryError(format!("{e}: {sql}")))?;

    raw_rows
        .into_iter()
        .map(|row| row.into_iter().map(from_duckdb).collect())
        .collect()
}

fn to_duckdb(value: &SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::BigInt(*i),
        SqlValue::Text(s) => Value::Text(s.clone()),
    }
}

fn from_duckdb(value: Value) -> DbResult<SqlValue> {
    match value {
        Value::Null => Ok(SqlValue::Null),
        Value::TinyInt(i) => Ok(SqlValue::Integer(i.into())),
        Value::SmallInt(i) => Ok(SqlValue::Integer(i.into())),
        Value::Int(i) => Ok(SqlValue::Integer(i.into())),
        Value::BigInt(i) => Ok(SqlValue::Integer(i)),
        Value::UTinyInt(i) => Ok(SqlValue::Integer(i.into())),
        Value::USmallInt(i) => Ok(SqlValue::Integer(i.into())),
        Value::UInt(i) => Ok(SqlValue::Integer(i.into())),
        Value::UBigInt(i) => i64::try_from(i)
            .map(SqlValue::Integer)
            .map_err(|_| DbError::UnexpectedRow(format!("integer {i} out of range"))),
        Value::HugeInt(i) => i64::try_from(i)
            .map(SqlValue::Integer)
            .map_err(|_| DbError::UnexpectedRow(format!("integer {i} out of range"))),
        Value::Text(s) => Ok(SqlValue::Text(s)),
        other => Err(DbError::UnexpectedRow(format!(
            "unsupported column value {other:?}"
        ))),
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
