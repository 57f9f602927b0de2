//! Storage trait definitions.

use crate::StorageResult;

/// Trait for durable key-value backends.
///
/// Implementations must survive process restarts; within a process the
/// execution model is single-writer, so last-write-wins is acceptable.
pub trait KeyValueStore: Send + Sync {
    /// Store a value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Retrieve a value.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Delete a value. Returns whether the key existed.
    fn delete(&self, key: &str) -> StorageResult<bool>;

    /// Check if a key exists.
    fn has(&self, key: &str) -> StorageResult<bool> {
        Ok(self.get(key)?.is_some())
    }
}
