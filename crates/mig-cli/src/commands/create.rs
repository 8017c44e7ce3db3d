//! Create command implementation

use anyhow::{Context, Result};
use mig_core::{create_migration, SystemClock};

use crate::cli::{CreateArgs, GlobalArgs};
use crate::logging::build_logger;

/// Execute the create command
///
/// `--dir` is required here; `migrate.yml` does not supply it.
pub(crate) fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let logger = build_logger(global);

    let path = create_migration(&args.dir, &args.name, &SystemClock, &logger)
        .with_context(|| format!("Failed to create migration '{}'", args.name))?;

    println!("{}", path.display());
    Ok(())
}
