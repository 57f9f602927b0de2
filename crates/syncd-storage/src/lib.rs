//! Durable key-value storage for the tallysync daemon.
//!
//! The engine keeps exactly one piece of cross-run state outside the run
//! log: the last automatic-sync timestamp. This crate provides the
//! [`KeyValueStore`] seam the rate limiter depends on, plus a JSON-file
//! backed implementation with last-write-wins semantics.

mod file_store;
mod traits;

pub use file_store::JsonFileStore;
pub use traits::KeyValueStore;

use thiserror::Error;

/// Error type for storage operations.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored data could not be parsed
    #[error("Encoding error: {0}")]
    Encoding(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
