//! JSONL-file backed run log.

use crate::{LogEntry, LogLevel, RunLog};
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use tracing::warn;

/// Run log that appends JSONL rows to a single file.
///
/// The file is opened in append mode and flushed after every row, so each
/// line is atomic at the filesystem level and external tools can tail the
/// log while a sync is in flight.
pub struct JsonlRunLog {
    writer: Mutex<BufWriter<File>>,
}

impl JsonlRunLog {
    /// Open (creating if needed) the log file at `path`.
    pub fn new(path: &PathBuf) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            writer: Mutex::new(BufWriter::with_capacity(8192, file)),
        })
    }

    fn append(&self, level: LogLevel, message: &str) {
        let entry = LogEntry {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level,
            message: message.to_string(),
        };

        let line = match serde_json::to_string(&entry) {
            Ok(line) => line,
            Err(e) => {
                warn!(error = %e, "failed to serialize run-log entry");
                return;
            }
        };

        let mut writer = self.writer.lock();
        if let Err(e) = writeln!(writer, "{line}").and_then(|_| writer.flush()) {
            // A broken log file must never abort a sync run.
            warn!(error = %e, "failed to append run-log entry");
        }
    }
}

impl RunLog for JsonlRunLog {
    fn info(&self, message: &str) {
        tracing::info!(target: "run_log", "{message}");
        self.append(LogLevel::Info, message);
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "run_log", "{message}");
        self.append(LogLevel::Error, message);
    }
}
