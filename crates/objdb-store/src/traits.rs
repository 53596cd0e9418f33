use crate::error::StoreResult;

/// Durable named-blob medium.
///
/// All implementations must satisfy these invariants:
/// - `write` is all-or-nothing: after a crash a reader sees either the
///   previous contents or the new contents, never a torn blob.
/// - There is no atomicity across different names.
/// - The store never interprets blob contents.
/// - All I/O errors are propagated, never silently ignored.
pub trait BlobStore: Send + Sync {
    /// Read a blob by name.
    ///
    /// Returns `Ok(None)` if the blob does not exist.
    fn read(&self, name: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Create or replace a blob.
    fn write(&self, name: &str, data: &[u8]) -> StoreResult<()>;

    /// Delete a blob. Returns `true` if the blob existed.
    fn delete(&self, name: &str) -> StoreResult<bool>;

    /// Check whether a blob exists.
    ///
    /// Default implementation reads the blob; backends should override when a
    /// cheaper check exists.
    fn exists(&self, name: &str) -> StoreResult<bool> {
        Ok(self.read(name)?.is_some())
    }
}
