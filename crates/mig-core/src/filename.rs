//! Migration filename codec.
//!
//! A migration's identity lives in its filename: `<epoch-millis>.<name>.sql`.
//! Decoding is pure; every input either decodes or fails with
//! [`CoreError::InvalidFileType`] or [`CoreError::InvalidFilename`].

use crate::error::{CoreError, CoreResult};
use crate::timestamp::Timestamp;

/// Required extension of every migration file.
pub const MIGRATION_EXTENSION: &str = ".sql";

/// Identity parsed out of a migration filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFilename {
    pub timestamp: Timestamp,
    pub name: String,
}

/// Build the canonical filename for a migration.
pub fn encode_filename(timestamp: Timestamp, name: &str) -> String {
    format!(
        "{}.{}{}",
        timestamp.as_millis(),
        name,
        MIGRATION_EXTENSION
    )
}

/// Parse a filename of the form `<epoch-millis>.<name>.sql`.
pub fn decode_filename(filename: &str) -> CoreResult<DecodedFilename> {
    let Some(base) = filename.strip_suffix(MIGRATION_EXTENSION) else {
        return Err(CoreError::InvalidFileType {
            filename: filename.to_string(),
        });
    };

    let invalid = |reason: String| CoreError::InvalidFilename {
        filename: filename.to_string(),
        reason,
    };

    let parts: Vec<&str> = base.split('.').collect();
    let [timestamp_part, name_part] = parts.as_slice() else {
        return Err(invalid(format!(
            "expected <timestamp>.<name>.sql, found {} dot-separated parts",
            parts.len()
        )));
    };

    if timestamp_part.is_empty() || !timestamp_part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid(format!(
            "timestamp section '{timestamp_part}' must be unsigned decimal digits"
        )));
    }
    let millis: i64 = timestamp_part
        .parse()
        .map_err(|_| invalid(format!("invalid timestamp section '{timestamp_part}'")))?;

    if name_part.is_empty() {
        return Err(invalid("name section is empty".to_string()));
    }

    Ok(DecodedFilename {
        timestamp: Timestamp::from_millis(millis),
        name: (*name_part).to_string(),
    })
}

#[cfg(test)]
#[path = "filename_test.rs"]
mod tests;
