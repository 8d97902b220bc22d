//! The `DocumentStore` trait — the seam between services and persistence.
//!
//! The services never talk to a concrete backend; they hold a
//! `DocumentStore` and rely only on this contract. [`MemoryStore`]
//! (crate::MemoryStore) is the reference implementation; a hosted
//! document database slots in behind the same trait as long as it can do
//! point reads, conditional updates, and change notifications.

use std::fmt::Display;
use std::hash::Hash;

use tokio::sync::watch;

use crate::StoreError;

/// A document together with the version at which it was read.
///
/// The version is the CAS token: pass it back to
/// [`DocumentStore::compare_and_swap`] and the write only lands if nobody
/// else wrote in between.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned<T> {
    /// Monotonically increasing per-document version, starting at 1.
    pub version: u64,
    pub doc: T,
}

/// A keyed document store with optimistic concurrency.
///
/// ## Trait bounds
///
/// - `K: Eq + Hash + Clone + Display` — ids key a map and appear in errors.
/// - `T: Clone` — snapshots are handed out by value; watchers get clones.
/// - `Send + Sync + 'static` on both — the store is shared across Tokio
///   tasks behind an `Arc`.
pub trait DocumentStore<K, T>: Send + Sync
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Creates a document under a fresh id.
    ///
    /// # Errors
    /// [`StoreError::AlreadyExists`] if the id is taken — creation is
    /// conditional too, which is what makes double-start idempotency
    /// checks possible.
    fn insert(&self, id: K, doc: T) -> Result<u64, StoreError>;

    /// Point read of the current document and its version.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the document is absent.
    fn get(&self, id: &K) -> Result<Versioned<T>, StoreError>;

    /// Replaces the document if and only if it is still at
    /// `expected_version`. Returns the new version on success.
    ///
    /// # Errors
    /// - [`StoreError::NotFound`] if the document is absent.
    /// - [`StoreError::VersionConflict`] if somebody wrote first.
    fn compare_and_swap(
        &self,
        id: &K,
        expected_version: u64,
        doc: T,
    ) -> Result<u64, StoreError>;

    /// Removes the document if and only if it is still at
    /// `expected_version`.
    ///
    /// # Errors
    /// Same as [`DocumentStore::compare_and_swap`].
    fn remove_if(&self, id: &K, expected_version: u64) -> Result<(), StoreError>;

    /// Subscribes to changes of one document.
    ///
    /// The receiver is seeded with the current state; every successful
    /// write sends the new [`Versioned`] snapshot, and removal sends
    /// `None`.
    ///
    /// # Errors
    /// [`StoreError::NotFound`] if the document does not exist yet.
    fn watch(&self, id: &K) -> Result<watch::Receiver<Option<Versioned<T>>>, StoreError>;
}
