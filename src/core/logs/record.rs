use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// log4j level of a record. Unknown levels are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    Other(String),
}

impl LogLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "TRACE" => LogLevel::Trace,
            "DEBUG" => LogLevel::Debug,
            "INFO" => LogLevel::Info,
            "WARN" | "WARNING" => LogLevel::Warn,
            "ERROR" => LogLevel::Error,
            "FATAL" => LogLevel::Fatal,
            _ => LogLevel::Other(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
            LogLevel::Other(raw) => raw,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LogLevel {
    fn from(raw: String) -> Self {
        LogLevel::parse(&raw)
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}

/// One log line or log4j event of the game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogRecord {
    pub level: LogLevel,
    pub logger: String,
    pub thread: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
    /// Raw message text; escaping is left to the display.
    pub message: String,
}

/// Which child stream a record came from. Decides the defaults of records
/// that are not log4j events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Stdout,
    Stderr,
}

impl StreamKind {
    pub fn default_level(self) -> LogLevel {
        match self {
            StreamKind::Stdout => LogLevel::Debug,
            StreamKind::Stderr => LogLevel::Error,
        }
    }

    pub fn default_logger(self) -> &'static str {
        match self {
            StreamKind::Stdout => "STDOUT",
            StreamKind::Stderr => "STDERR",
        }
    }

    /// Synthetic record for text that is not a parseable log4j event.
    pub fn plain_record(self, text: &str) -> LogRecord {
        LogRecord {
            level: self.default_level(),
            logger: self.default_logger().to_string(),
            thread: String::new(),
            timestamp: Utc::now().timestamp_millis(),
            message: text.to_string(),
        }
    }
}
