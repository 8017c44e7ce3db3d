//! Transactional application of pending migrations.

use crate::error::{RunnerError, RunnerResult};
use crate::ledger::Ledger;
use mig_core::{split_statements, Logger, Migration};
use mig_db::{CancellationToken, Database, Transaction};
use std::sync::Arc;

/// Runs a batch of pending migrations and records them, all in one
/// transaction.
pub struct Executor {
    db: Arc<dyn Database>,
    ledger: Ledger,
    logger: Logger,
}

impl Executor {
    pub fn new(db: Arc<dyn Database>, ledger: Ledger, logger: &Logger) -> Self {
        Self {
            db,
            ledger,
            logger: logger.clone(),
        }
    }

    /// Apply `pending` in order and record them in the ledger.
    ///
    /// Any failure before the commit rolls back the whole batch, so the
    /// ledger never shows part of a batch. Cancellation is honored before
    /// `BEGIN`, between statements, and while a statement runs, but never
    /// during the commit. Returns the number of statements executed.
    pub async fn apply(
        &self,
        cancel: &CancellationToken,
        pending: &[Migration],
    ) -> RunnerResult<usize> {
        if cancel.is_cancelled() {
            return Err(RunnerError::Cancelled);
        }

        let mut tx = self
            .db
            .begin(cancel)
            .await
            .map_err(|source| RunnerError::Begin { source })?;

        let mut executed = 0;
        for migration in pending {
            let result = self.run_migration(tx.as_mut(), cancel, migration).await;
            match result {
                Ok(count) => executed += count,
                Err(err) => return Err(self.abort(tx, err).await),
            }
        }

        let recorded = self.ledger.record_in(tx.as_mut(), cancel, pending).await;
        if let Err(source) = recorded {
            let err = RunnerError::Record {
                table: self.ledger.table().to_string(),
                source,
            };
            return Err(self.abort(tx, err).await);
        }

        if let Err(source) = tx.commit().await {
            self.logger.error(
                "Error committing migration transaction",
                &[("error", &source)],
            );
            return Err(RunnerError::Commit { source });
        }

        self.logger.info(
            "Applied migrations",
            &[("migrations", &pending.len()), ("statements", &executed)],
        );
        Ok(executed)
    }

    async fn run_migration<'t>(
        &self,
        tx: &mut (dyn Transaction + 't),
        cancel: &CancellationToken,
        migration: &Migration,
    ) -> RunnerResult<usize> {
        let statements = split_statements(&migration.instruction);
        self.logger.debug(
            "Running migration",
            &[
                ("file", &migration.filename),
                ("statements", &statements.len()),
            ],
        );

        for (index, statement) in statements.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(RunnerError::Cancelled);
            }
            self.logger.debug(
                "Executing statement",
                &[("file", &migration.filename), ("sql", statement)],
            );
            tx.execute(cancel, statement, &[])
                .await
                .map_err(|source| {
                    if source.is_cancelled() {
                        return RunnerError::Cancelled;
                    }
                    RunnerError::Statement {
                        filename: migration.filename.clone(),
                        statement: index + 1,
                        source,
                    }
                })?;
        }

        self.logger.info(
            "Migration ran successfully",
            &[("file", &migration.filename)],
        );
        Ok(statements.len())
    }

    /// Roll back after `err` and hand `err` back.
    ///
    /// A rollback failure is logged; the original error is the one reported.
    async fn abort(&self, tx: Box<dyn Transaction + '_>, err: RunnerError) -> RunnerError {
        self.logger.error("Rolling back migration batch", &[("error", &err)]);
        if let Err(rb_err) = tx.rollback().await {
            self.logger.error(
                "Error rolling back migration transaction",
                &[("error", &rb_err)],
            );
        }
        err
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
