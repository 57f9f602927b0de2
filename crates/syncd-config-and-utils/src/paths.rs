//! File system paths for the daemon.

use crate::{CoreError, CoreResult};
use std::path::PathBuf;

/// Manages file system paths for the daemon.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Base directory for runtime files (~/.tallysync)
    base_dir: PathBuf,
}

impl Paths {
    /// Create a new Paths instance rooted at `~/.tallysync`.
    pub fn new() -> CoreResult<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| CoreError::Path("Could not determine home directory".to_string()))?;

        Ok(Self {
            base_dir: home.join(".tallysync"),
        })
    }

    /// Create a new Paths instance with a custom base directory.
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory (~/.tallysync).
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the config file path (~/.tallysync/config.json).
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the durable state file path (~/.tallysync/state.json).
    /// Holds the last automatic-sync timestamp slot.
    pub fn state_file(&self) -> PathBuf {
        self.base_dir.join("state.json")
    }

    /// Get the run log path (~/.tallysync/logs/sync.jsonl).
    pub fn run_log_file(&self) -> PathBuf {
        self.base_dir.join("logs").join("sync.jsonl")
    }

    /// Get the default workbook path (~/.tallysync/workbook.json), used
    /// when the config does not name one.
    pub fn workbook_file(&self) -> PathBuf {
        self.base_dir.join("workbook.json")
    }
}
