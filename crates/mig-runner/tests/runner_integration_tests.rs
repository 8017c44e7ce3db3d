//! End-to-end runs against a real DuckDB database file

use mig_core::{Logger, TableName};
use mig_db::{CancellationToken, Database, DuckDbBackend, SqlValue};
use mig_runner::test_utils::MemoryDatabase;
use mig_runner::{Ledger, Manager, ManagerConfig, RunOutcome, RunnerError};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct Fixture {
    _tmp: TempDir,
    dir: std::path::PathBuf,
    db: Arc<dyn Database>,
}

impl Fixture {
    fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("migrations");
        fs::create_dir(&dir).unwrap();
        let db: Arc<dyn Database> =
            Arc::new(DuckDbBackend::from_path(&tmp.path().join("app.duckdb")).unwrap());
        Self { _tmp: tmp, dir, db }
    }

    fn write(&self, filename: &str, sql: &str) {
        fs::write(self.dir.join(filename), sql).unwrap();
    }

    fn manager(&self) -> Manager {
        manager_for(self.db.clone(), &self.dir)
    }

    fn ledger(&self) -> Ledger {
        Ledger::new(self.db.clone(), TableName::default(), &Logger::discard())
    }

    async fn ledger_created(&self) -> Vec<i64> {
        self.ledger()
            .list(&CancellationToken::new())
            .await
            .unwrap()
            .iter()
            .map(|m| m.timestamp.as_millis())
            .collect()
    }

    async fn count(&self, table: &str) -> i64 {
        let rows = self
            .db
            .query(
                &CancellationToken::new(),
                &format!("SELECT COUNT(*) FROM {table}"),
                &[],
            )
            .await
            .unwrap();
        rows[0][0].as_integer().unwrap()
    }
}

fn manager_for(db: Arc<dyn Database>, dir: &Path) -> Manager {
    Manager::new(
        db,
        ManagerConfig {
            dir: dir.to_path_buf(),
            table: TableName::default(),
            verify_instructions: true,
        },
        &Logger::discard(),
    )
}

#[tokio::test]
async fn test_fresh_database_applies_all_in_order() {
    let fx = Fixture::new();
    fx.write(
        "1000.create-users.sql",
        "CREATE TABLE users (id INTEGER, email TEXT);\nINSERT INTO users VALUES (1, 'a@example.com');\n",
    );
    fx.write("2000.add-index.sql", "CREATE INDEX users_email ON users (email);");

    let outcome = fx.manager().run(&CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Applied { ref migrations } if migrations.len() == 2));
    assert_eq!(fx.ledger_created().await, vec![1000, 2000]);
    assert_eq!(fx.count("users").await, 1);
}

#[tokio::test]
async fn test_new_file_applies_only_the_new_migration() {
    let fx = Fixture::new();
    let cancel = CancellationToken::new();
    fx.write("1000.create-users.sql", "CREATE TABLE users (id INTEGER);");
    fx.manager().run(&cancel).await.unwrap();

    fx.write("3000.add-column.sql", "ALTER TABLE users ADD COLUMN email TEXT;");
    let outcome = fx.manager().run(&cancel).await.unwrap();

    let RunOutcome::Applied { migrations } = outcome else {
        panic!("expected the new migration to be applied");
    };
    assert_eq!(migrations.len(), 1);
    assert_eq!(migrations[0].filename, "3000.add-column.sql");
    assert_eq!(fx.ledger_created().await, vec![1000, 3000]);

    let rows = fx
        .db
        .query(
            &cancel,
            "SELECT COUNT(*) FROM information_schema.columns WHERE table_name = 'users' AND column_name = 'email'",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(rows[0][0], SqlValue::Integer(1));
}

#[tokio::test]
async fn test_renamed_file_fails_without_writes() {
    let fx = Fixture::new();
    let cancel = CancellationToken::new();
    fx.write("1000.create-users.sql", "CREATE TABLE users (id INTEGER);");
    fx.manager().run(&cancel).await.unwrap();

    fs::rename(
        fx.dir.join("1000.create-users.sql"),
        fx.dir.join("1000.create-people.sql"),
    )
    .unwrap();
    fx.write("2000.create-teams.sql", "CREATE TABLE teams (id INTEGER);");

    let err = fx.manager().run(&cancel).await.unwrap_err();

    assert!(err.is_consistency());
    assert_eq!(fx.ledger_created().await, vec![1000]);
    let rows = fx
        .db
        .query(
            &cancel,
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = 'teams'",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(rows[0][0], SqlValue::Integer(0));
}

#[tokio::test]
async fn test_deleted_file_means_ledger_ahead() {
    let fx = Fixture::new();
    let cancel = CancellationToken::new();
    fx.write("1000.create-users.sql", "CREATE TABLE users (id INTEGER);");
    fx.write("2000.create-teams.sql", "CREATE TABLE teams (id INTEGER);");
    fx.manager().run(&cancel).await.unwrap();

    fs::remove_file(fx.dir.join("2000.create-teams.sql")).unwrap();
    let err = fx.manager().run(&cancel).await.unwrap_err();

    assert!(matches!(
        err,
        RunnerError::Consistency {
            source: mig_core::CoreError::LedgerAhead { ledger: 2, files: 1 }
        }
    ));
}

#[tokio::test]
async fn test_mid_batch_failure_records_nothing() {
    let fx = Fixture::new();
    let cancel = CancellationToken::new();
    fx.write("1000.create-users.sql", "CREATE TABLE users (id INTEGER);");
    fx.write("2000.seed-users.sql", "INSERT INTO users VALUES (1);");
    fx.write("3000.broken.sql", "INSERT INTO no_such_table VALUES (1);");

    let err = fx.manager().run(&cancel).await.unwrap_err();

    assert!(matches!(err, RunnerError::Statement { ref filename, .. } if filename == "3000.broken.sql"));
    assert!(fx.ledger_created().await.is_empty());

    // Fixing the file lets the whole batch through on the next run.
    fx.write("3000.broken.sql", "UPDATE users SET id = 2;");
    fx.manager().run(&cancel).await.unwrap();
    assert_eq!(fx.ledger_created().await, vec![1000, 2000, 3000]);
    assert_eq!(fx.count("users").await, 1);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    fs::write(
        tmp.path().join("1000.create-users.sql"),
        "CREATE TABLE users (id INTEGER);",
    )
    .unwrap();
    fs::write(
        tmp.path().join("2000.add-index.sql"),
        "CREATE INDEX users_id ON users (id);",
    )
    .unwrap();
    let db = Arc::new(MemoryDatabase::new());
    let manager = manager_for(db.clone(), tmp.path());
    let cancel = CancellationToken::new();

    manager.run(&cancel).await.unwrap();
    let executed = db.executed();
    let migration_statements = |all: &[String]| {
        all.iter()
            .filter(|sql| sql.starts_with("INSERT") || sql.contains("users"))
            .count()
    };
    let first = migration_statements(&executed);

    assert_eq!(manager.run(&cancel).await.unwrap(), RunOutcome::NoOp);
    assert_eq!(migration_statements(&db.executed()), first);
    assert_eq!(db.rows().len(), 2);
}

#[tokio::test]
async fn test_cancelled_run_leaves_database_untouched() {
    let fx = Fixture::new();
    fx.write("1000.create-users.sql", "CREATE TABLE users (id INTEGER);");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = fx.manager().run(&cancel).await.unwrap_err();
    assert!(err.is_cancelled());

    let rows = fx
        .db
        .query(
            &CancellationToken::new(),
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name IN ('users', 'migrations')",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(rows[0][0], SqlValue::Integer(0));
}

#[tokio::test]
async fn test_trailing_comment_after_last_statement() {
    let fx = Fixture::new();
    fx.write(
        "1000.create-users.sql",
        "-- users table\nCREATE TABLE users (id INTEGER);\n-- done\n",
    );
    fx.write("2000.seed.sql", "INSERT INTO users VALUES (1); /* seeded */");

    let outcome = fx.manager().run(&CancellationToken::new()).await.unwrap();

    assert!(matches!(outcome, RunOutcome::Applied { ref migrations } if migrations.len() == 2));
    assert_eq!(fx.ledger_created().await, vec![1000, 2000]);
    assert_eq!(fx.count("users").await, 1);
}

#[tokio::test]
async fn test_cancel_interrupts_long_running_migration() {
    let fx = Fixture::new();
    fx.write("1000.create-users.sql", "CREATE TABLE users (id INTEGER);");
    fx.write(
        "2000.slow.sql",
        "CREATE TABLE totals AS SELECT SUM(a.range * b.range) AS total FROM range(100000000) a, range(100000000) b;",
    );
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    std::thread::spawn(move || {
        std::thread::sleep(std::time::Duration::from_millis(300));
        trigger.cancel();
    });

    let err = fx.manager().run(&cancel).await.unwrap_err();

    assert!(err.is_cancelled(), "{err}");
    assert!(fx.ledger_created().await.is_empty());
    let rows = fx
        .db
        .query(
            &CancellationToken::new(),
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name IN ('users', 'totals')",
            &[],
        )
        .await
        .unwrap();
    assert_eq!(rows[0][0], SqlValue::Integer(0));
}
