//! The ledger: a table with one row per applied migration.

use mig_core::{Logger, Migration, TableName, Timestamp};
use mig_db::{CancellationToken, Database, DbError, DbResult, Row, SqlValue, Transaction};
use std::sync::Arc;

/// Database-backed record of applied migrations.
///
/// Only the executor's batch transaction writes to the ledger.
#[derive(Clone)]
pub struct Ledger {
    db: Arc<dyn Database>,
    table: TableName,
    logger: Logger,
}

impl Ledger {
    pub fn new(db: Arc<dyn Database>, table: TableName, logger: &Logger) -> Self {
        let logger = logger.with("table", &table);
        Self { db, table, logger }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Create the ledger table and its id sequence if they do not exist.
    ///
    /// Idempotent; safe to call on every run.
    pub async fn ensure_schema(&self, cancel: &CancellationToken) -> DbResult<()> {
        self.logger.debug("Ensuring migrations table exists", &[]);
        self.db
            .execute(cancel, &self.create_sequence_sql(), &[])
            .await?;
        self.db.execute(cancel, &self.create_table_sql(), &[]).await?;
        Ok(())
    }

    /// Every applied migration, oldest first.
    pub async fn list(&self, cancel: &CancellationToken) -> DbResult<Vec<Migration>> {
        let rows = self.db.query(cancel, &self.select_sql(), &[]).await?;
        let migrations = rows
            .into_iter()
            .map(migration_from_row)
            .collect::<DbResult<Vec<_>>>()?;

        self.logger.debug(
            "Loaded applied migrations",
            &[("count", &migrations.len())],
        );
        Ok(migrations)
    }

    /// Record `migrations` in a transaction of their own.
    ///
    /// Either every row is inserted or none is.
    pub async fn record_batch(
        &self,
        cancel: &CancellationToken,
        migrations: &[Migration],
    ) -> DbResult<()> {
        let mut tx = self.db.begin(cancel).await?;
        if let Err(err) = self.record_in(tx.as_mut(), cancel, migrations).await {
            if let Err(rb_err) = tx.rollback().await {
                self.logger.error(
                    "Error rolling back ledger transaction",
                    &[("error", &rb_err)],
                );
            }
            return Err(err);
        }
        tx.commit().await
    }

    /// Record `migrations` inside the caller's transaction.
    pub async fn record_in<'t>(
        &self,
        tx: &mut (dyn Transaction + 't),
        cancel: &CancellationToken,
        migrations: &[Migration],
    ) -> DbResult<()> {
        let sql = self.insert_sql();
        for migration in migrations {
            self.logger.debug(
                "Recording migration",
                &[
                    ("name", &migration.name),
                    ("created", &migration.timestamp.as_millis()),
                ],
            );

            let affected = tx
                .execute(
                    cancel,
                    &sql,
                    &[
                        SqlValue::from(migration.name.as_str()),
                        SqlValue::from(migration.filename.as_str()),
                        SqlValue::Integer(migration.timestamp.as_millis()),
                        SqlValue::from(migration.instruction.as_str()),
                    ],
                )
                .await?;

            self.logger.debug(
                "Recorded migration in transaction",
                &[("file", &migration.filename), ("affected", &affected)],
            );
        }
        Ok(())
    }

    fn create_sequence_sql(&self) -> String {
        format!(
            "CREATE SEQUENCE IF NOT EXISTS {}",
            mig_core::table_name::quote_ident(&self.table.sequence_name())
        )
    }

    fn create_table_sql(&self) -> String {
        format!(
            "CREATE TABLE IF NOT EXISTS {} (
  id BIGINT PRIMARY KEY DEFAULT nextval('{}'),
  name TEXT NOT NULL,
  filename TEXT NOT NULL,
  created BIGINT NOT NULL,
  instruction TEXT NOT NULL,
  UNIQUE (name, filename)
)",
            self.table.quoted(),
            self.table.sequence_name()
        )
    }

    fn select_sql(&self) -> String {
        format!(
            "SELECT
  id,
  name,
  filename,
  created,
  instruction
FROM {}
ORDER BY created ASC, id ASC",
            self.table.quoted()
        )
    }

    fn insert_sql(&self) -> String {
        format!(
            "INSERT INTO {} (
  name,
  filename,
  created,
  instruction
)
VALUES (?, ?, ?, ?)",
            self.table.quoted()
        )
    }
}

/// Rebuild a migration from a `(id, name, filename, created, instruction)` row.
fn migration_from_row(row: Row) -> DbResult<Migration> {
    let unexpected = |what: &str| DbError::UnexpectedRow(format!("ledger row {what}"));

    let [id, name, filename, created, instruction]: [SqlValue; 5] = row
        .try_into()
        .map_err(|row: Row| unexpected(&format!("has {} columns, expected 5", row.len())))?;

    let text = |value: SqlValue, column: &str| match value {
        SqlValue::Text(s) => Ok(s),
        other => Err(unexpected(&format!("column {column} is {other:?}, expected text"))),
    };
    let integer = |value: &SqlValue, column: &str| {
        value
            .as_integer()
            .ok_or_else(|| unexpected(&format!("column {column} is {value:?}, expected integer")))
    };

    Ok(Migration {
        id: Some(integer(&id, "id")?),
        timestamp: Timestamp::from_millis(integer(&created, "created")?),
        name: text(name, "name")?,
        filename: text(filename, "filename")?,
        instruction: text(instruction, "instruction")?,
    })
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
