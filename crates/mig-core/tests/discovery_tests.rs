//! Integration tests for creating, scanning, and reconciling migration files

use log::LevelFilter;
use mig_core::{
    create_migration, diff, scan_dir, DiffOptions, FixedClock, Logger, MemoryLog, Migration,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

/// Files created through `create_migration` come back from `scan_dir` in clock order
#[test]
fn test_create_then_scan_round_trip() {
    let dir = TempDir::new().unwrap();
    let sink = Arc::new(MemoryLog::new(LevelFilter::Info));
    let logger = Logger::new(sink.clone());

    // Created out of order on purpose
    for (millis, name) in [(3000, "add column"), (1000, "create users"), (2000, "add index")] {
        create_migration(dir.path(), name, &FixedClock::at_millis(millis), &logger).unwrap();
    }

    let migrations = scan_dir(dir.path(), &logger).unwrap();
    let filenames: Vec<&str> = migrations.iter().map(|m| m.filename.as_str()).collect();
    assert_eq!(
        filenames,
        vec![
            "1000.create-users.sql",
            "2000.add-index.sql",
            "3000.add-column.sql"
        ]
    );
    assert_eq!(
        sink.lines()
            .iter()
            .filter(|l| l.starts_with("INFO Created migration file"))
            .count(),
        3
    );
}

/// A ledger taken from an earlier scan stays a valid prefix as files are added
#[test]
fn test_scan_diff_after_new_file() {
    let dir = TempDir::new().unwrap();
    let logger = Logger::discard();
    fs::write(dir.path().join("1000.create-users.sql"), "CREATE TABLE users (id INTEGER);").unwrap();

    let applied: Vec<Migration> = scan_dir(dir.path(), &logger)
        .unwrap()
        .into_iter()
        .enumerate()
        .map(|(i, mut m)| {
            m.id = Some(i as i64 + 1);
            m
        })
        .collect();

    fs::write(dir.path().join("3000.add-column.sql"), "ALTER TABLE users ADD COLUMN email TEXT;").unwrap();
    let files = scan_dir(dir.path(), &logger).unwrap();

    let pending = diff(&applied, &files, DiffOptions::default()).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].filename, "3000.add-column.sql");
}
