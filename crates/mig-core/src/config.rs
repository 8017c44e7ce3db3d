//! Configuration types and parsing for migrate.yml

use crate::error::{CoreError, CoreResult};
use crate::table_name::TableName;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name looked up by [`Config::load_from_dir`].
pub const CONFIG_FILE_NAME: &str = "migrate.yml";

/// Settings shared by every `migrate` command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directory holding the migration files
    #[serde(default = "default_dir")]
    pub dir: PathBuf,

    /// Ledger table recording applied migrations
    #[serde(default)]
    pub table: TableName,

    /// Database file to migrate
    #[serde(default)]
    pub db: Option<String>,

    /// Reject applied migrations whose file text has since changed
    #[serde(default = "default_true")]
    pub verify_instructions: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from("migrations")
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            table: TableName::default(),
            db: None,
            verify_instructions: true,
        }
    }
}

impl Config {
    /// Load configuration from an explicit file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::ConfigParseError {
            message: format!("{}: {e}", path.display()),
        })?;
        Self::from_yaml(&content)
    }

    /// Load `migrate.yml` from `dir`, falling back to defaults when absent
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate YAML text
    pub fn from_yaml(content: &str) -> CoreResult<Self> {
        let config: Config =
            serde_yaml::from_str(content).map_err(|e| CoreError::ConfigParseError {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot
    pub fn validate(&self) -> CoreResult<()> {
        if self.dir.as_os_str().is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "dir must not be empty".to_string(),
            });
        }
        if matches!(self.db.as_deref(), Some("")) {
            return Err(CoreError::ConfigInvalid {
                message: "db must not be empty when set".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
