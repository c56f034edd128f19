//! Leveled, timestamped reporting for provisioning runs
//!
//! The reporter observes every step transition and keeps an append-only
//! in-memory run log next to the styled terminal output. It has no
//! control-flow role.

use std::cell::{Ref, RefCell};

use chrono::{DateTime, Local};
use console::Style;

/// Severity of a run log message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Warning,
    Error,
    Critical,
}

impl Level {
    fn tag(self) -> &'static str {
        match self {
            Level::Info => "INFO",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
            Level::Critical => "CRITICAL",
        }
    }

    fn style(self) -> Style {
        match self {
            Level::Info => Style::new().green(),
            Level::Warning => Style::new().yellow(),
            Level::Error => Style::new().red(),
            Level::Critical => Style::new().red().bold(),
        }
    }
}

/// One observable event in a run
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub level: Level,
    pub message: String,
}

/// Run log plus terminal echo
///
/// Entries are only appended, never removed; the log lives for the duration
/// of the process.
pub struct Reporter {
    entries: RefCell<Vec<LogEntry>>,
    echo: bool,
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            echo: true,
        }
    }

    /// Reporter that records without printing
    pub fn silent() -> Self {
        Self {
            entries: RefCell::new(Vec::new()),
            echo: false,
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(Level::Info, message.into());
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.log(Level::Warning, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(Level::Error, message.into());
    }

    pub fn critical(&self, message: impl Into<String>) {
        self.log(Level::Critical, message.into());
    }

    fn log(&self, level: Level, message: String) {
        let entry = LogEntry {
            timestamp: Local::now(),
            level,
            message,
        };

        if self.echo {
            let stamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
            let line = format!(
                "{} [{}] {}",
                Style::new().dim().apply_to(stamp),
                level.style().apply_to(level.tag()),
                entry.message
            );
            match level {
                Level::Info => println!("{}", line),
                _ => eprintln!("{}", line),
            }
        }

        self.entries.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Ref<'_, Vec<LogEntry>> {
        self.entries.borrow()
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
