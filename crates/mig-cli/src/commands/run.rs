//! Run command implementation

use anyhow::{Context, Result};
use mig_core::Logger;
use mig_db::CancellationToken;
use mig_runner::{Manager, ManagerConfig, RunOutcome};
use tokio::task::JoinHandle;

use crate::cli::{GlobalArgs, RunArgs};
use crate::commands::common::{open_database, resolve_config};
use crate::logging::build_logger;

/// Execute the run command
pub(crate) async fn execute(args: &RunArgs, global: &GlobalArgs) -> Result<()> {
    let config = resolve_config(global, (&args.target).into())?;
    let logger = build_logger(global);
    let db = open_database(&config)?;

    let manager = Manager::new(db, ManagerConfig::from(&config), &logger);
    let cancel = CancellationToken::new();
    let interrupt = cancel_on_interrupt(cancel.clone(), logger.clone());

    let result = manager.run(&cancel).await;
    interrupt.abort();

    match result.context("Migration run failed")? {
        RunOutcome::NoOp => println!("Database is up to date"),
        RunOutcome::Applied { migrations } => {
            for migration in &migrations {
                println!("applied  {}", migration.filename);
            }
            println!("Applied {} migration(s)", migrations.len());
        }
    }
    Ok(())
}

/// Cancel `cancel` on Ctrl-C. Once the commit has started it runs to completion.
pub(crate) fn cancel_on_interrupt(cancel: CancellationToken, logger: Logger) -> JoinHandle<()> {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            logger.warn("Interrupt received, cancelling migration run", &[]);
            cancel.cancel();
        }
    })
}
