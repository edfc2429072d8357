//! Engine logger
//!
//! The engine reports through a replaceable `Logger`. The default one
//! forwards to `tracing` under the `qoreorm::sql` target.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        };
        f.write_str(s)
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" | "trace" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            "off" | "none" => Ok(LogLevel::Off),
            other => Err(format!("Unknown log level: {}", other)),
        }
    }
}

pub trait Logger: Send + Sync {
    fn level(&self) -> LogLevel;

    fn set_level(&self, level: LogLevel);

    fn show_sql(&self) -> bool;

    fn set_show_sql(&self, show: bool);

    fn log(&self, level: LogLevel, message: &str);

    fn is_enabled(&self, level: LogLevel) -> bool {
        level != LogLevel::Off && level >= self.level()
    }

    /// Logs an executed statement when SQL logging is on
    fn log_sql(&self, sql: &str, elapsed: Option<Duration>) {
        if !self.show_sql() {
            return;
        }
        let message = match elapsed {
            Some(took) => format!("[SQL] {} - took: {:?}", sql, took),
            None => format!("[SQL] {}", sql),
        };
        self.log(LogLevel::Info, &message);
    }
}

/// Logger that emits `tracing` events
pub struct TracingLogger {
    level: RwLock<LogLevel>,
    show_sql: AtomicBool,
}

impl TracingLogger {
    pub fn new(level: LogLevel) -> Self {
        Self {
            level: RwLock::new(level),
            show_sql: AtomicBool::new(false),
        }
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new(LogLevel::Info)
    }
}

impl Logger for TracingLogger {
    fn level(&self) -> LogLevel {
        *self.level.read()
    }

    fn set_level(&self, level: LogLevel) {
        *self.level.write() = level;
    }

    fn show_sql(&self) -> bool {
        self.show_sql.load(Ordering::Relaxed)
    }

    fn set_show_sql(&self, show: bool) {
        self.show_sql.store(show, Ordering::Relaxed);
    }

    fn log(&self, level: LogLevel, message: &str) {
        if !self.is_enabled(level) {
            return;
        }
        match level {
            LogLevel::Debug => tracing::debug!(target: "qoreorm::sql", "{}", message),
            LogLevel::Info => tracing::info!(target: "qoreorm::sql", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "qoreorm::sql", "{}", message),
            LogLevel::Error => tracing::error!(target: "qoreorm::sql", "{}", message),
            LogLevel::Off => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_filtering() {
        let logger = TracingLogger::new(LogLevel::Warn);
        assert!(!logger.is_enabled(LogLevel::Info));
        assert!(logger.is_enabled(LogLevel::Error));

        logger.set_level(LogLevel::Off);
        assert!(!logger.is_enabled(LogLevel::Error));
        assert!(!logger.is_enabled(LogLevel::Off));
    }

    #[test]
    fn parses_levels() {
        assert_eq!("WARNING".parse::<LogLevel>(), Ok(LogLevel::Warn));
        assert!("loud".parse::<LogLevel>().is_err());
    }
}
