//! Structured logging capability
//!
//! A [`Logger`] is created once at startup and handed to every component
//! that logs. Entries go to a [`LogSink`]; the default sink forwards to
//! `tracing`. Logging never fails and never blocks the caller.

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::errors::PromptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => f.write_str("INFO"),
            LogLevel::Warn => f.write_str("WARN"),
            LogLevel::Error => f.write_str("ERROR"),
        }
    }
}

/// Error detail attached to an entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDetail {
    pub message: String,
    pub name:    String,
    /// Source chain, outermost first
    pub chain:   Vec<String>,
}

impl ErrorDetail {
    pub fn from_error(err: &PromptError) -> Self {
        let mut chain = Vec::new();
        let mut source = std::error::Error::source(err);
        while let Some(inner) = source {
            chain.push(inner.to_string());
            source = inner.source();
        }

        Self {
            message: err.to_string(),
            name: err.category().to_string(),
            chain,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level:     LogLevel,
    pub message:   String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload:   Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:     Option<ErrorDetail>,
}

/// Destination for log entries
pub trait LogSink: Send + Sync {
    fn write(&self, entry: LogEntry);
}

/// Forwards entries to `tracing`
#[derive(Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn write(&self, entry: LogEntry) {
        let payload = entry.payload.as_ref().map(Value::to_string);
        match (entry.level, &entry.error) {
            (LogLevel::Error, Some(detail)) => tracing::error!(
                error.name = %detail.name,
                error.message = %detail.message,
                error.chain = ?detail.chain,
                payload = payload.as_deref(),
                "{}",
                entry.message
            ),
            (LogLevel::Error, None) => {
                tracing::error!(payload = payload.as_deref(), "{}", entry.message)
            },
            (LogLevel::Warn, _) => tracing::warn!(payload = payload.as_deref(), "{}", entry.message),
            (LogLevel::Info, _) => tracing::info!(payload = payload.as_deref(), "{}", entry.message),
        }
    }
}

/// Keeps entries in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn entries(&self) -> Vec<LogEntry> {
        match self.entries.lock() {
            Ok(entries) => entries.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: LogEntry) {
        // A poisoned lock still accepts writes; logging must not fail.
        match self.entries.lock() {
            Ok(mut entries) => entries.push(entry),
            Err(poisoned) => poisoned.into_inner().push(entry),
        }
    }
}

#[derive(Clone)]
pub struct Logger {
    sink: Arc<dyn LogSink>,
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::tracing()
    }
}

impl Logger {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink }
    }

    pub fn tracing() -> Self {
        Self::new(Arc::new(TracingSink))
    }

    /// Logger backed by a [`MemorySink`], returned alongside it
    pub fn memory() -> (Self, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::default());
        (Self::new(sink.clone()), sink)
    }

    pub fn info(&self, message: impl Into<String>, payload: Option<Value>) {
        self.emit(LogLevel::Info, message.into(), payload, None);
    }

    pub fn warn(&self, message: impl Into<String>, payload: Option<Value>) {
        self.emit(LogLevel::Warn, message.into(), payload, None);
    }

    pub fn error(&self, message: impl Into<String>, err: &PromptError) {
        self.emit(
            LogLevel::Error,
            message.into(),
            None,
            Some(ErrorDetail::from_error(err)),
        );
    }

    fn emit(&self, level: LogLevel, message: String, payload: Option<Value>, error: Option<ErrorDetail>) {
        self.sink.write(LogEntry {
            timestamp: Utc::now(),
            level,
            message,
            payload,
            error,
        });
    }
}
