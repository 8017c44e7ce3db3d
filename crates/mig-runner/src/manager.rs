//! Run orchestration.
//!
//! A run moves through `EnsureSchema -> List -> Scan -> Diff` and then ends
//! as a no-op or applies the pending batch. Every stage that fails ends the
//! run with that stage's error; nothing is retried.

use crate::error::{RunnerError, RunnerResult};
use crate::executor::Executor;
use crate::ledger::Ledger;
use mig_core::{diff, scan_dir, Config, DiffOptions, Logger, Migration, TableName};
use mig_db::{CancellationToken, Database};
use std::path::PathBuf;
use std::sync::Arc;

/// What a [`Manager`] works on.
#[derive(Debug, Clone)]
pub struct ManagerConfig {
    pub dir: PathBuf,
    pub table: TableName,
    pub verify_instructions: bool,
}

impl From<&Config> for ManagerConfig {
    fn from(config: &Config) -> Self {
        Self {
            dir: config.dir.clone(),
            table: config.table.clone(),
            verify_instructions: config.verify_instructions,
        }
    }
}

/// Terminal state of a successful run.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Every migration file was already applied.
    NoOp,
    /// The pending migrations were applied and recorded, in this order.
    Applied { migrations: Vec<Migration> },
}

/// Applied and pending migrations, as `status` reports them.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub applied: Vec<Migration>,
    pub pending: Vec<Migration>,
}

/// Reconciles the ledger with the migration directory and applies the gap.
pub struct Manager {
    config: ManagerConfig,
    ledger: Ledger,
    executor: Executor,
    logger: Logger,
}

impl Manager {
    pub fn new(db: Arc<dyn Database>, config: ManagerConfig, logger: &Logger) -> Self {
        let logger = logger.with("dir", config.dir.display());
        let ledger = Ledger::new(db.clone(), config.table.clone(), &logger);
        let executor = Executor::new(db, ledger.clone(), &logger);
        Self {
            config,
            ledger,
            executor,
            logger,
        }
    }

    /// Bring the database up to date with the migration directory.
    pub async fn run(&self, cancel: &CancellationToken) -> RunnerResult<RunOutcome> {
        let (_, pending) = self.reconcile(cancel).await?;

        if pending.is_empty() {
            self.logger.info("No migrations to run", &[]);
            return Ok(RunOutcome::NoOp);
        }

        self.logger.info(
            "Running pending migrations",
            &[("count", &pending.len())],
        );
        check(cancel)?;
        self.executor.apply(cancel, &pending).await?;

        Ok(RunOutcome::Applied {
            migrations: pending,
        })
    }

    /// Report applied and pending migrations without executing anything.
    ///
    /// Fails exactly where [`Manager::run`] would fail before applying.
    pub async fn status(&self, cancel: &CancellationToken) -> RunnerResult<Status> {
        let (applied, pending) = self.reconcile(cancel).await?;
        Ok(Status { applied, pending })
    }

    async fn reconcile(
        &self,
        cancel: &CancellationToken,
    ) -> RunnerResult<(Vec<Migration>, Vec<Migration>)> {
        check(cancel)?;
        self.ledger
            .ensure_schema(cancel)
            .await
            .map_err(|source| RunnerError::EnsureSchema {
                table: self.config.table.to_string(),
                source,
            })?;

        check(cancel)?;
        let existing = self
            .ledger
            .list(cancel)
            .await
            .map_err(|source| RunnerError::ListApplied {
                table: self.config.table.to_string(),
                source,
            })?;

        check(cancel)?;
        let files = scan_dir(&self.config.dir, &self.logger).map_err(|source| {
            RunnerError::Scan {
                dir: self.config.dir.clone(),
                source,
            }
        })?;

        let options = DiffOptions {
            verify_instructions: self.config.verify_instructions,
        };
        let pending = diff(&existing, &files, options)
            .map_err(|source| RunnerError::Consistency { source })?
            .to_vec();

        self.logger.debug(
            "Compared applied migrations with files",
            &[
                ("applied", &existing.len()),
                ("files", &files.len()),
                ("pending", &pending.len()),
            ],
        );
        Ok((existing, pending))
    }
}

fn check(cancel: &CancellationToken) -> RunnerResult<()> {
    if cancel.is_cancelled() {
        Err(RunnerError::Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[path = "manager_test.rs"]
mod tests;
