//! Reconciliation of the applied ledger against the migration files.
//!
//! The ledger must always be a contiguous prefix of the sorted file list.
//! Whatever follows that prefix is pending; any disagreement inside it is
//! drift and fails the run. Nothing here is ever repaired automatically.

use crate::error::{CoreError, CoreResult};
use crate::migration::Migration;

/// Knobs for [`diff`].
#[derive(Debug, Clone, Copy)]
pub struct DiffOptions {
    /// Also require each applied migration's stored SQL to equal the file's.
    pub verify_instructions: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            verify_instructions: true,
        }
    }
}

/// Compute the pending suffix of `files` given the `existing` ledger.
///
/// Both slices must be in ascending timestamp order. Returns an empty slice
/// when every file has already been applied.
pub fn diff<'a>(
    existing: &[Migration],
    files: &'a [Migration],
    options: DiffOptions,
) -> CoreResult<&'a [Migration]> {
    if existing.len() > files.len() {
        return Err(CoreError::LedgerAhead {
            ledger: existing.len(),
            files: files.len(),
        });
    }

    for (position, (applied, file)) in existing.iter().zip(files).enumerate() {
        if !applied.same_identity(file) {
            return Err(CoreError::Drift {
                position,
                ledger: applied.filename.clone(),
                file: file.filename.clone(),
            });
        }

        if options.verify_instructions && applied.instruction != file.instruction {
            return Err(CoreError::InstructionChanged {
                filename: file.filename.clone(),
                applied: applied.checksum(),
                current: file.checksum(),
            });
        }
    }

    Ok(&files[existing.len()..])
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
