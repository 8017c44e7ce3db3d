//! Shared utilities for CLI commands

use anyhow::{bail, Context, Result};
use mig_core::{Config, TableName};
use mig_db::{Database, DuckDbBackend};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::{GlobalArgs, TargetArgs};

/// Values given on the command line or through `MIGRATE_*` variables.
#[derive(Debug, Default)]
pub(crate) struct Overrides<'a> {
    pub(crate) dir: Option<&'a Path>,
    pub(crate) table: Option<&'a str>,
    pub(crate) db: Option<&'a str>,
}

impl<'a> From<&'a TargetArgs> for Overrides<'a> {
    fn from(args: &'a TargetArgs) -> Self {
        Self {
            dir: args.dir.as_deref(),
            table: args.table.as_deref(),
            db: args.db.as_deref(),
        }
    }
}

/// Load the config file (`--config`, else `./migrate.yml` if present) and
/// layer `overrides` on top.
pub(crate) fn resolve_config(global: &GlobalArgs, overrides: Overrides<'_>) -> Result<Config> {
    let base = match &global.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => Config::load_from_dir(Path::new("."))
            .context("Failed to load migrate.yml")?,
    };
    apply_overrides(base, overrides)
}

pub(crate) fn apply_overrides(mut config: Config, overrides: Overrides<'_>) -> Result<Config> {
    if let Some(dir) = overrides.dir {
        config.dir = PathBuf::from(dir);
    }
    if let Some(table) = overrides.table {
        config.table =
            TableName::try_new(table).with_context(|| format!("Invalid --table '{table}'"))?;
    }
    if let Some(db) = overrides.db {
        config.db = Some(db.to_string());
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Open the database named by `config.db`.
pub(crate) fn open_database(config: &Config) -> Result<Arc<dyn Database>> {
    let Some(path) = config.db.as_deref() else {
        bail!("No database given: pass --db, set MIGRATE_DB, or set db in migrate.yml");
    };
    let backend =
        DuckDbBackend::new(path).with_context(|| format!("Failed to open database {path}"))?;
    Ok(Arc::new(backend))
}

#[cfg(test)]
#[path = "common_test.rs"]
mod tests;
