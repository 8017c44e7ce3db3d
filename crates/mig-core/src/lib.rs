//! mig-core - Core library for migrate
//!
//! This crate provides the migration model, the `<epoch-millis>.<name>.sql`
//! filename codec, directory scanning, reconciliation of the applied ledger
//! against the files on disk, statement splitting, configuration parsing,
//! and the injected clock and logger handles used by every other crate.

pub mod checksum;
pub mod clock;
pub mod config;
pub mod error;
pub mod filename;
pub mod logger;
pub mod migration;
pub mod scaffold;
pub mod scanner;
pub mod statements;
pub mod sync;
pub mod table_name;
pub mod timestamp;

pub use checksum::{compute_checksum, short_checksum};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use filename::{decode_filename, encode_filename, DecodedFilename};
pub use logger::Logger;
pub use migration::Migration;
pub use scaffold::{create_migration, normalize_name};
pub use scanner::scan_dir;
pub use statements::split_statements;
pub use sync::{diff, DiffOptions};
pub use table_name::TableName;
pub use timestamp::Timestamp;

#[cfg(any(test, feature = "test-support"))]
pub use logger::MemoryLog;
