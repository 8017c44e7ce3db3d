//! Discovery of migration files on disk.

use crate::error::{CoreError, CoreResult};
use crate::logger::Logger;
use crate::migration::Migration;
use std::fs;
use std::path::Path;

/// Read every migration in `dir`, sorted ascending by timestamp.
///
/// Subdirectories are skipped with a warning. Any file that fails to decode
/// or read aborts the scan: skipping it could silently reorder or omit a
/// migration. Two files sharing a timestamp are rejected because their
/// relative order would be arbitrary.
pub fn scan_dir(dir: &Path, logger: &Logger) -> CoreResult<Vec<Migration>> {
    logger.debug(
        "Inspecting dir for migration files",
        &[("dir", &dir.display())],
    );

    let entries = fs::read_dir(dir).map_err(|source| CoreError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut migrations = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| CoreError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if path.is_dir() {
            logger.warn("Ignoring directory", &[("dir", &path.display())]);
            continue;
        }

        let os_name = entry.file_name();
        let Some(filename) = os_name.to_str() else {
            return Err(CoreError::InvalidFilename {
                filename: os_name.to_string_lossy().into_owned(),
                reason: "filename is not valid UTF-8".to_string(),
            });
        };

        let migration = read_migration(&path, filename, logger)?;
        migrations.push(migration);
    }

    migrations.sort_by_key(|m| m.timestamp);
    reject_duplicate_timestamps(&migrations)?;

    logger.debug(
        "Found migration files",
        &[("dir", &dir.display()), ("count", &migrations.len())],
    );
    Ok(migrations)
}

fn read_migration(path: &Path, filename: &str, logger: &Logger) -> CoreResult<Migration> {
    // Decode before reading so a stray file fails without touching its contents.
    let mut migration = Migration::from_file(filename, String::new())?;
    logger.debug(
        "Parsed migration details from filename",
        &[
            ("timestamp", &migration.timestamp.as_millis()),
            ("name", &migration.name),
        ],
    );

    let contents = fs::read_to_string(path).map_err(|source| CoreError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    logger.debug(
        "Read migration file",
        &[("file", &filename), ("bytes", &contents.len())],
    );

    migration.instruction = contents;
    Ok(migration)
}

fn reject_duplicate_timestamps(sorted: &[Migration]) -> CoreResult<()> {
    for pair in sorted.windows(2) {
        if pair[0].timestamp == pair[1].timestamp {
            return Err(CoreError::DuplicateTimestamp {
                timestamp: pair[0].timestamp.as_millis(),
                first: pair[0].filename.clone(),
                second: pair[1].filename.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "scanner_test.rs"]
mod tests;
