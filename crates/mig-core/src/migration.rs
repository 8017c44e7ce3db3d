//! The migration model shared by the scanner, the ledger, and the executor.

use crate::checksum::short_checksum;
use crate::error::CoreResult;
use crate::filename::{decode_filename, encode_filename};
use crate::timestamp::Timestamp;
use std::fmt;

/// A named, timestamped, one-way SQL script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    /// Ledger surrogate key; `None` until the migration has been recorded
    pub id: Option<i64>,

    /// Creation instant, the total order key
    pub timestamp: Timestamp,

    /// Hyphen-normalized human label
    pub name: String,

    /// Literal on-disk filename
    pub filename: String,

    /// Full SQL text of the file
    pub instruction: String,
}

impl Migration {
    /// Build an on-disk migration from its filename and contents.
    pub fn from_file(filename: &str, instruction: impl Into<String>) -> CoreResult<Self> {
        let decoded = decode_filename(filename)?;
        Ok(Self {
            id: None,
            timestamp: decoded.timestamp,
            name: decoded.name,
            filename: filename.to_string(),
            instruction: instruction.into(),
        })
    }

    /// Build a migration from its parts, deriving the canonical filename.
    pub fn new(timestamp: Timestamp, name: impl Into<String>, instruction: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: None,
            filename: encode_filename(timestamp, &name),
            timestamp,
            name,
            instruction: instruction.into(),
        }
    }

    /// Whether `other` has the same `(timestamp, name)` identity.
    pub fn same_identity(&self, other: &Migration) -> bool {
        self.timestamp == other.timestamp && self.name == other.name
    }

    /// Abbreviated SHA-256 of the instruction text.
    pub fn checksum(&self) -> String {
        short_checksum(&self.instruction)
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.filename)
    }
}
