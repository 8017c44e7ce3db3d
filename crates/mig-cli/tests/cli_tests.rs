//! CLI integration tests
//!
//! Drive the `migrate` binary against temp directories and DuckDB files.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the compiled migrate binary (resolved at compile time)
fn migrate_bin() -> String {
    env!("CARGO_BIN_EXE_migrate").to_string()
}

/// Run `migrate` inside `cwd` with no `MIGRATE_*` variables leaking in.
fn migrate(cwd: &Path, args: &[&str]) -> Output {
    Command::new(migrate_bin())
        .current_dir(cwd)
        .env_remove("MIGRATE_DIR")
        .env_remove("MIGRATE_TABLE")
        .env_remove("MIGRATE_DB")
        .args(args)
        .output()
        .expect("Failed to run migrate")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn project() -> TempDir {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("migrations")).unwrap();
    tmp
}

fn write_migration(tmp: &TempDir, filename: &str, sql: &str) {
    fs::write(tmp.path().join("migrations").join(filename), sql).unwrap();
}

// ── migrate create ──────────────────────────────────────────────────────

#[test]
fn test_create_normalizes_name() {
    let tmp = project();

    let output = migrate(
        tmp.path(),
        &["create", "--dir", "migrations", "--name", "add users table"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let files: Vec<String> = fs::read_dir(tmp.path().join("migrations"))
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(files.len(), 1);

    let (millis, rest) = files[0].split_once('.').unwrap();
    assert!(millis.parse::<i64>().unwrap() > 0);
    assert_eq!(rest, "add-users-table.sql");
    assert_eq!(
        fs::read_to_string(tmp.path().join("migrations").join(&files[0])).unwrap(),
        ""
    );
    assert!(stdout(&output).trim_end().ends_with("add-users-table.sql"));
}

#[test]
fn test_create_missing_dir_fails() {
    let tmp = TempDir::new().unwrap();

    let output = migrate(tmp.path(), &["create", "--dir", "nope", "--name", "x"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("C005"), "stderr: {}", stderr(&output));
}

#[test]
fn test_create_empty_name_fails() {
    let tmp = project();

    let output = migrate(tmp.path(), &["create", "--dir", "migrations", "--name", "  "]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("C004"), "stderr: {}", stderr(&output));
}

#[test]
fn test_create_without_dir_fails_even_with_config() {
    let tmp = project();
    fs::write(tmp.path().join("migrate.yml"), "dir: migrations\n").unwrap();

    let output = migrate(tmp.path(), &["create", "--name", "add users"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("--dir"), "stderr: {}", stderr(&output));
    assert_eq!(
        fs::read_dir(tmp.path().join("migrations")).unwrap().count(),
        0
    );
}

// ── migrate run ─────────────────────────────────────────────────────────

#[test]
fn test_run_requires_db() {
    let tmp = project();

    let output = migrate(tmp.path(), &["run", "--dir", "migrations"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No database given"));
}

#[test]
fn test_run_applies_then_is_up_to_date() {
    let tmp = project();
    write_migration(&tmp, "1000.create-users.sql", "CREATE TABLE users (id INTEGER);");
    write_migration(&tmp, "2000.add-index.sql", "CREATE INDEX users_id ON users (id);");

    let first = migrate(
        tmp.path(),
        &["run", "--dir", "migrations", "--db", "app.duckdb"],
    );
    assert!(first.status.success(), "stderr: {}", stderr(&first));
    let out = stdout(&first);
    assert!(out.contains("applied  1000.create-users.sql"));
    assert!(out.contains("applied  2000.add-index.sql"));
    assert!(stderr(&first).contains("Migration ran successfully"));

    let second = migrate(
        tmp.path(),
        &["run", "--dir", "migrations", "--db", "app.duckdb"],
    );
    assert!(second.status.success(), "stderr: {}", stderr(&second));
    assert!(stdout(&second).contains("Database is up to date"));
}

#[test]
fn test_run_reads_migrate_yml() {
    let tmp = project();
    fs::write(
        tmp.path().join("migrate.yml"),
        "dir: migrations\ntable: schema_history\ndb: app.duckdb\n",
    )
    .unwrap();
    write_migration(&tmp, "1000.create-users.sql", "CREATE TABLE users (id INTEGER);");

    let output = migrate(tmp.path(), &["run"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let status = migrate(tmp.path(), &["status", "--output", "json"]);
    assert!(status.status.success(), "stderr: {}", stderr(&status));
    let out = stdout(&status);
    assert!(out.contains("\"state\": \"applied\""));
    assert!(out.contains("\"created\": 1000"));
}

#[test]
fn test_run_drift_fails_nonzero() {
    let tmp = project();
    write_migration(&tmp, "1000.create-users.sql", "CREATE TABLE users (id INTEGER);");
    let args = ["run", "--dir", "migrations", "--db", "app.duckdb"];
    assert!(migrate(tmp.path(), &args).status.success());

    fs::rename(
        tmp.path().join("migrations/1000.create-users.sql"),
        tmp.path().join("migrations/1000.create-people.sql"),
    )
    .unwrap();
    let output = migrate(tmp.path(), &args);

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("R004"), "stderr: {err}");
    assert!(err.contains("C011"), "stderr: {err}");
}

#[test]
fn test_suppress_silences_info_logs() {
    let tmp = project();
    write_migration(&tmp, "1000.create-users.sql", "CREATE TABLE users (id INTEGER);");

    let output = migrate(
        tmp.path(),
        &["run", "-v", "-s", "--dir", "migrations", "--db", "app.duckdb"],
    );

    assert!(output.status.success());
    assert!(!stderr(&output).contains("INFO"));
    assert!(!stderr(&output).contains("DEBUG"));
}

#[test]
fn test_verbose_emits_debug_logs() {
    let tmp = project();
    write_migration(&tmp, "1000.create-users.sql", "CREATE TABLE users (id INTEGER);");

    let output = migrate(
        tmp.path(),
        &["run", "-v", "--dir", "migrations", "--db", "app.duckdb"],
    );

    assert!(output.status.success());
    assert!(stderr(&output).contains("DEBUG Executing statement"));
}

// ── migrate status ──────────────────────────────────────────────────────

#[test]
fn test_status_lists_applied_and_pending() {
    let tmp = project();
    write_migration(&tmp, "1000.create-users.sql", "CREATE TABLE users (id INTEGER);");
    let run = migrate(
        tmp.path(),
        &["run", "--dir", "migrations", "--db", "app.duckdb"],
    );
    assert!(run.status.success(), "stderr: {}", stderr(&run));
    write_migration(&tmp, "3000.add-column.sql", "ALTER TABLE users ADD COLUMN email TEXT;");

    let output = migrate(
        tmp.path(),
        &["status", "--dir", "migrations", "--db", "app.duckdb"],
    );

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("applied  1000.create-users.sql"));
    assert!(out.contains("pending  3000.add-column.sql"));
    assert!(out.contains("1 applied, 1 pending"));
}
