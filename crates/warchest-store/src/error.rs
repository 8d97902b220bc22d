//! Error types for the store layer.

/// Errors that can occur during store operations.
///
/// Ids are carried as strings because the store is generic over its key
/// type; callers format their typed id once at the error site.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document exists under the given id.
    #[error("document {0} not found")]
    NotFound(String),

    /// An insert hit an id that is already taken.
    #[error("document {0} already exists")]
    AlreadyExists(String),

    /// A conditional write observed a newer version than the caller read.
    /// Not fatal — re-read, re-validate, retry.
    #[error("version conflict on document {id}: expected {expected}, found {actual}")]
    VersionConflict {
        id: String,
        expected: u64,
        actual: u64,
    },
}

impl StoreError {
    /// Returns `true` for the retry-after-re-read case.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }
}
