//! Creation of new, empty migration files.

use crate::clock::Clock;
use crate::error::{CoreError, CoreResult};
use crate::filename::encode_filename;
use crate::logger::Logger;
use crate::timestamp::Timestamp;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

/// Turn a human label into a migration name.
///
/// Surrounding whitespace is trimmed and inner spaces become hyphens. Names
/// containing `.` or path separators are rejected because the resulting
/// filename could not be decoded back.
pub fn normalize_name(raw: &str) -> CoreResult<String> {
    let invalid = |reason: &str| CoreError::InvalidName {
        name: raw.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(invalid("name must not be empty"));
    }
    if trimmed.contains(['.', '/', '\\']) {
        return Err(invalid("name must not contain '.', '/' or '\\'"));
    }
    Ok(trimmed.replace(' ', "-"))
}

/// Create an empty migration file in `dir` stamped with the clock's time.
///
/// Returns the path of the new file. Never overwrites an existing file.
pub fn create_migration(
    dir: &Path,
    raw_name: &str,
    clock: &dyn Clock,
    logger: &Logger,
) -> CoreResult<PathBuf> {
    logger.debug("Checking for dir", &[("dir", &dir.display())]);

    let metadata = fs::metadata(dir).map_err(|_| CoreError::DirectoryNotFound {
        path: dir.to_path_buf(),
    })?;
    if !metadata.is_dir() {
        return Err(CoreError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let name = normalize_name(raw_name)?;
    let timestamp = Timestamp::from_datetime(clock.now());
    let path = dir.join(encode_filename(timestamp, &name));

    logger.debug("Creating migration file", &[("path", &path.display())]);

    OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|source| CoreError::FileCreate {
            path: path.clone(),
            source,
        })?;

    logger.info("Created migration file", &[("path", &path.display())]);
    Ok(path)
}

#[cfg(test)]
#[path = "scaffold_test.rs"]
mod tests;
