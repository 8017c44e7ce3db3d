//! Stderr sink for the injected logger

use log::{LevelFilter, Log, Metadata, Record};
use mig_core::Logger;
use std::io::Write;
use std::sync::Arc;

use crate::cli::GlobalArgs;

/// Writes `LEVEL message key=value ...` lines to stderr.
pub(crate) struct StderrLog {
    level: LevelFilter,
}

impl StderrLog {
    pub(crate) fn new(level: LevelFilter) -> Self {
        Self { level }
    }
}

impl Log for StderrLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut stderr = std::io::stderr().lock();
        // Nowhere left to report a failed write to stderr.
        let _ = writeln!(stderr, "{:<5} {}", record.level(), record.args());
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// `-s` wins over `-v`.
pub(crate) fn level_filter(global: &GlobalArgs) -> LevelFilter {
    if global.suppress {
        LevelFilter::Error
    } else if global.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Logger handed to every component for this invocation.
pub(crate) fn build_logger(global: &GlobalArgs) -> Logger {
    Logger::new(Arc::new(StderrLog::new(level_filter(global))))
}
