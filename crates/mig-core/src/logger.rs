//! Injected structured logger.
//!
//! Components never log through the process-wide `log` macros. Each one
//! receives a [`Logger`]: a cheap-to-clone handle around a [`log::Log`] sink
//! that renders `message key=value ...` records under the [`LOG_TARGET`]
//! target. The binary decides where records go; tests capture them.

use log::{Level, Log, Metadata, Record};
use std::fmt::{self, Display, Write as _};
use std::sync::Arc;

/// Target attached to every record.
pub const LOG_TARGET: &str = "migrate";

/// Key/value pairs attached to a single record.
pub type Fields<'a> = &'a [(&'a str, &'a dyn Display)];

/// Leveled, structured logger passed into every component.
#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn Log>,
    fields: Vec<(&'static str, String)>,
}

impl Logger {
    /// Logger writing to `sink`.
    pub fn new(sink: Arc<dyn Log>) -> Self {
        Self {
            sink,
            fields: Vec::new(),
        }
    }

    /// Logger that drops every record.
    pub fn discard() -> Self {
        Self::new(Arc::new(DiscardLog))
    }

    /// Child logger that attaches `key=value` to every record it emits.
    pub fn with(&self, key: &'static str, value: impl Display) -> Self {
        let mut child = self.clone();
        child.fields.push((key, value.to_string()));
        child
    }

    /// Whether a record at `level` would reach the sink.
    pub fn enabled(&self, level: Level) -> bool {
        self.sink.enabled(
            &Metadata::builder()
                .level(level)
                .target(LOG_TARGET)
                .build(),
        )
    }

    pub fn debug(&self, message: &str, fields: Fields<'_>) {
        self.emit(Level::Debug, message, fields);
    }

    pub fn info(&self, message: &str, fields: Fields<'_>) {
        self.emit(Level::Info, message, fields);
    }

    pub fn warn(&self, message: &str, fields: Fields<'_>) {
        self.emit(Level::Warn, message, fields);
    }

    pub fn error(&self, message: &str, fields: Fields<'_>) {
        self.emit(Level::Error, message, fields);
    }

    fn emit(&self, level: Level, message: &str, fields: Fields<'_>) {
        if !self.enabled(level) {
            return;
        }
        let line = render(message, &self.fields, fields);
        self.sink.log(
            &Record::builder()
                .args(format_args!("{line}"))
                .level(level)
                .target(LOG_TARGET)
                .build(),
        );
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Render `message` followed by inherited then per-call fields.
fn render(message: &str, inherited: &[(&'static str, String)], fields: Fields<'_>) -> String {
    let mut line = message.to_string();
    for (key, value) in inherited {
        push_field(&mut line, key, value);
    }
    for (key, value) in fields {
        push_field(&mut line, key, &value.to_string());
    }
    line
}

fn push_field(line: &mut String, key: &str, value: &str) {
    let needs_quotes = value.is_empty() || value.contains(|c: char| c.is_whitespace() || c == '"');
    // Writing into a String cannot fail.
    let _ = if needs_quotes {
        write!(line, " {key}={value:?}")
    } else {
        write!(line, " {key}={value}")
    };
}

struct DiscardLog;

impl Log for DiscardLog {
    fn enabled(&self, _: &Metadata<'_>) -> bool {
        false
    }

    fn log(&self, _: &Record<'_>) {}

    fn flush(&self) {}
}

/// Sink that keeps rendered records in memory for assertions.
#[cfg(any(test, feature = "test-support"))]
pub struct MemoryLog {
    level: log::LevelFilter,
    lines: std::sync::Mutex<Vec<String>>,
}

#[cfg(any(test, feature = "test-support"))]
impl MemoryLog {
    pub fn new(level: log::LevelFilter) -> Self {
        Self {
            level,
            lines: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Captured records as `LEVEL message key=value ...`.
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// Whether any captured record contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Log for MemoryLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(format!("{} {}", record.level(), record.args()));
        }
    }

    fn flush(&self) {}
}

#[cfg(test)]
#[path = "logger_test.rs"]
mod tests;
