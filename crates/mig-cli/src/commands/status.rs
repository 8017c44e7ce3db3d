//! Status command implementation

use anyhow::{Context, Result};
use mig_core::Migration;
use mig_db::CancellationToken;
use mig_runner::{Manager, ManagerConfig, Status};
use serde::Serialize;

use crate::cli::{GlobalArgs, StatusArgs, StatusOutput};
use crate::commands::common::{open_database, resolve_config};
use crate::commands::run::cancel_on_interrupt;
use crate::logging::build_logger;

/// One migration as `status --output json` reports it.
#[derive(Debug, Serialize)]
struct StatusEntry<'a> {
    filename: &'a str,
    name: &'a str,
    created: i64,
    state: &'static str,
}

impl<'a> StatusEntry<'a> {
    fn new(migration: &'a Migration, state: &'static str) -> Self {
        Self {
            filename: &migration.filename,
            name: &migration.name,
            created: migration.timestamp.as_millis(),
            state,
        }
    }
}

fn entries(status: &Status) -> Vec<StatusEntry<'_>> {
    status
        .applied
        .iter()
        .map(|m| StatusEntry::new(m, "applied"))
        .chain(status.pending.iter().map(|m| StatusEntry::new(m, "pending")))
        .collect()
}

/// Execute the status command
pub(crate) async fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let config = resolve_config(global, (&args.target).into())?;
    let logger = build_logger(global);
    let db = open_database(&config)?;

    let manager = Manager::new(db, ManagerConfig::from(&config), &logger);
    let cancel = CancellationToken::new();
    let interrupt = cancel_on_interrupt(cancel.clone(), logger.clone());

    let result = manager.status(&cancel).await;
    interrupt.abort();
    let status = result.context("Failed to read migration status")?;

    match args.output {
        StatusOutput::Text => {
            for entry in entries(&status) {
                println!("{:<8} {}", entry.state, entry.filename);
            }
            println!(
                "{} applied, {} pending",
                status.applied.len(),
                status.pending.len()
            );
        }
        StatusOutput::Json => {
            let json = serde_json::to_string_pretty(&entries(&status))
                .context("Failed to serialize status")?;
            println!("{json}");
        }
    }
    Ok(())
}
