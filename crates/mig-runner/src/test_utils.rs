//! In-memory fake database for exercising the ledger and executor without a
//! real driver.
//!
//! The fake understands just enough SQL to stand in for the ledger: a
//! parameterised `INSERT` appends a ledger row (staged until commit inside a
//! transaction), a `SELECT` returns the committed rows ordered by `created`,
//! and every other statement succeeds without effect. Every statement is
//! recorded; a statement containing a registered fragment can be made to fail
//! or to fire a cancellation token.

use async_trait::async_trait;
use mig_core::Migration;
use mig_db::{
    check_cancelled, CancellationToken, Database, DbError, DbResult, Row, SqlValue, Transaction,
};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct MemoryState {
    rows: Vec<Row>,
    next_id: i64,
    executed: Vec<String>,
    fail_on: Vec<String>,
    cancel_on: Vec<(String, CancellationToken)>,
    commits: usize,
    rollbacks: usize,
}

impl MemoryState {
    fn run(&mut self, sql: &str) -> DbResult<()> {
        self.executed.push(sql.to_string());
        for (fragment, token) in &self.cancel_on {
            if sql.contains(fragment.as_str()) {
                token.cancel();
            }
        }
        match self.fail_on.iter().find(|fragment| sql.contains(fragment.as_str())) {
            Some(fragment) => Err(DbError::ExecutionError(format!(
                "injected failure on '{fragment}': {sql}"
            ))),
            None => Ok(()),
        }
    }

    fn insert(&mut self, params: &[SqlValue]) {
        self.next_id += 1;
        let mut row = Vec::with_capacity(params.len() + 1);
        row.push(SqlValue::Integer(self.next_id));
        row.extend_from_slice(params);
        self.rows.push(row);
    }
}

fn is_ledger_insert(sql: &str, params: &[SqlValue]) -> bool {
    !params.is_empty() && sql.trim_start().to_ascii_uppercase().starts_with("INSERT")
}

fn created(row: &Row) -> i64 {
    row.get(3).and_then(SqlValue::as_integer).unwrap_or_default()
}

/// Scripted in-memory [`Database`]
#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<MemoryState>,
}

impl MemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fail every later statement whose text contains `fragment`.
    pub fn fail_on(&self, fragment: &str) {
        self.state().fail_on.push(fragment.to_string());
    }

    /// Cancel `token` once a statement containing `fragment` has run.
    pub fn cancel_on(&self, fragment: &str, token: &CancellationToken) {
        self.state()
            .cancel_on
            .push((fragment.to_string(), token.clone()));
    }

    /// Pre-populate the ledger as if `migration` had been applied earlier.
    pub fn seed(&self, migration: &Migration) {
        self.state().insert(&[
            SqlValue::from(migration.name.as_str()),
            SqlValue::from(migration.filename.as_str()),
            SqlValue::Integer(migration.timestamp.as_millis()),
            SqlValue::from(migration.instruction.as_str()),
        ]);
    }

    /// Every statement executed so far, including ones later rolled back.
    pub fn executed(&self) -> Vec<String> {
        self.state().executed.clone()
    }

    /// Committed ledger rows.
    pub fn rows(&self) -> Vec<Row> {
        self.state().rows.clone()
    }

    pub fn commits(&self) -> usize {
        self.state().commits
    }

    pub fn rollbacks(&self) -> usize {
        self.state().rollbacks
    }
}

#[async_trait]
impl Database for MemoryDatabase {
    async fn execute(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[SqlValue],
    ) -> DbResult<usize> {
        check_cancelled(cancel)?;
        let mut state = self.state();
        state.run(sql)?;
        if is_ledger_insert(sql, params) {
            state.insert(params);
            return Ok(1);
        }
        Ok(0)
    }

    async fn query(
        &self,
        cancel: &CancellationToken,
        sql: &str,
        _params: &[SqlValue],
    ) -> DbResult<Vec<Row>> {
        check_cancelled(cancel)?;
        let mut state = self.state();
        state.run(sql)?;
        let mut rows = state.rows.clone();
        rows.sort_by_key(created);
        Ok(rows)
    }

    async fn begin<'a>(
        &'a self,
        cancel: &CancellationToken,
    ) -> DbResult<Box<dyn Transaction + 'a>> {
        check_cancelled(cancel)?;
        Ok(Box::new(MemoryTransaction {
            db: self,
            staged: Vec::new(),
            finished: false,
        }))
    }

    fn db_type(&self) -> &'static str {
        "memory"
    }
}

struct MemoryTransaction<'a> {
    db: &'a MemoryDatabase,
    staged: Vec<Vec<SqlValue>>,
    finished: bool,
}

#[async_trait]
impl Transaction for MemoryTransaction<'_> {
    async fn execute(
        &mut self,
        cancel: &CancellationToken,
        sql: &str,
        params: &[SqlValue],
    ) -> DbResult<usize> {
        check_cancelled(cancel)?;
        self.db.state().run(sql)?;
        if is_ledger_insert(sql, params) {
            self.staged.push(params.to_vec());
            return Ok(1);
        }
        Ok(0)
    }

    async fn commit(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        let staged = std::mem::take(&mut self.staged);
        let mut state = self.db.state();
        for params in &staged {
            state.insert(params);
        }
        state.commits += 1;
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> DbResult<()> {
        self.finished = true;
        self.db.state().rollbacks += 1;
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.db.state().rollbacks += 1;
        }
    }
}
