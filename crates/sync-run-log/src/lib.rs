//! Append-only run log for the tallysync engine.
//!
//! Sync outcomes are user-visible exclusively through this log: every skip,
//! degrade, and per-record failure decision writes one row. Rows are
//! structured JSONL (`{timestamp, level, message}`) appended to a single
//! file, flushed per line so external tools can tail it. Mirrors every row
//! into `tracing` as well so the ambient logs stay complete.

mod jsonl;

pub use jsonl::JsonlRunLog;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity of a run-log row. Serialized in caps (`INFO`/`ERROR`) to
/// match the on-disk log format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Normal progress and skip decisions.
    Info,
    /// Degraded stages and per-record failures.
    Error,
}

/// One appended row of the run log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// RFC 3339 UTC timestamp of the append.
    pub timestamp: String,
    /// Row severity.
    pub level: LogLevel,
    /// Human-readable message.
    pub message: String,
}

/// Sink for run-log rows.
///
/// Implementations must be safe to share across the pipeline; every
/// component that makes a skip/degrade decision holds a reference.
pub trait RunLog: Send + Sync {
    /// Append an INFO row.
    fn info(&self, message: &str);

    /// Append an ERROR row.
    fn error(&self, message: &str);
}

/// In-memory run log for tests.
#[derive(Default)]
pub struct MemoryRunLog {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemoryRunLog {
    /// Create an empty in-memory log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all appended entries.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// Messages only, in append order.
    pub fn messages(&self) -> Vec<String> {
        self.entries.lock().iter().map(|e| e.message.clone()).collect()
    }

    fn push(&self, level: LogLevel, message: &str) {
        self.entries.lock().push(LogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level,
            message: message.to_string(),
        });
    }
}

impl RunLog for MemoryRunLog {
    fn info(&self, message: &str) {
        self.push(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        self.push(LogLevel::Error, message);
    }
}
