//! mig-runner - Applies pending migrations
//!
//! Records applied migrations in a ledger table, reconciles that ledger with
//! the files on disk, and applies whatever is pending inside one transaction
//! per run.

pub mod error;
pub mod executor;
pub mod ledger;
pub mod manager;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;

pub use error::{RunnerError, RunnerResult};
pub use executor::Executor;
pub use ledger::Ledger;
pub use manager::{Manager, ManagerConfig, RunOutcome, Status};
