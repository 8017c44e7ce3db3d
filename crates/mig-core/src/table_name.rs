//! Validated name of the ledger table.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Deref;

/// Name of the ledger table when none is configured.
pub const DEFAULT_TABLE_NAME: &str = "migrations";

/// Longest identifier accepted (the PostgreSQL limit, the strictest common one).
const MAX_LEN: usize = 63;

/// Strongly-typed wrapper for the ledger table name.
///
/// The name is spliced into DDL, so only plain identifiers are accepted:
/// an ASCII letter or underscore followed by ASCII letters, digits, or
/// underscores.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Validate and wrap a table name.
    pub fn try_new(name: impl Into<String>) -> CoreResult<Self> {
        let name = name.into();
        validate_identifier(&name)?;
        Ok(Self(name))
    }

    /// Return the underlying name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Double-quoted form for use in SQL text.
    pub fn quoted(&self) -> String {
        quote_ident(&self.0)
    }

    /// Name of the sequence that feeds the ledger's `id` column.
    pub fn sequence_name(&self) -> String {
        format!("{}_id_seq", self.0)
    }
}

impl Default for TableName {
    fn default() -> Self {
        Self(DEFAULT_TABLE_NAME.to_string())
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for TableName {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TableName {
    type Error = CoreError;

    fn try_from(s: String) -> CoreResult<Self> {
        Self::try_new(s)
    }
}

impl From<TableName> for String {
    fn from(name: TableName) -> Self {
        name.0
    }
}

impl PartialEq<&str> for TableName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Quote a SQL identifier, doubling embedded double quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn validate_identifier(name: &str) -> CoreResult<()> {
    let invalid = |reason: &str| CoreError::ConfigInvalid {
        message: format!("table name '{name}' {reason}"),
    };

    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Err(invalid("must not be empty"));
    };
    if name.len() > MAX_LEN {
        return Err(invalid("is longer than 63 characters"));
    }
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Err(invalid("must start with a letter or underscore"));
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("may only contain letters, digits, and underscores"));
    }
    Ok(())
}
