//! In-memory `DocumentStore` implementation.
//!
//! A plain `HashMap` behind a `std::sync::Mutex`. Every critical section
//! is a handful of map operations, so a blocking lock is fine even under
//! an async runtime — nothing awaits while holding it.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use crate::{DocumentStore, StoreError, Versioned};

/// One stored document plus its change channel.
struct Entry<T> {
    version: u64,
    doc: T,
    /// Broadcasts every accepted write to subscribers. `None` = removed.
    tx: watch::Sender<Option<Versioned<T>>>,
}

/// In-memory reference implementation of [`DocumentStore`].
///
/// Versions start at 1 on insert and bump by 1 per accepted write, so a
/// failed CAS always reports exactly which version won.
pub struct MemoryStore<K, T> {
    entries: Mutex<HashMap<K, Entry<T>>>,
}

impl<K, T> MemoryStore<K, T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K, T> Default for MemoryStore<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> MemoryStore<K, T> {
    /// Locks the map, recovering from poisoning — a panicked writer left
    /// the map itself intact because every mutation is a single statement.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<K, Entry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<K, T> DocumentStore<K, T> for MemoryStore<K, T>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn insert(&self, id: K, doc: T) -> Result<u64, StoreError> {
        let mut entries = self.lock();
        if entries.contains_key(&id) {
            return Err(StoreError::AlreadyExists(id.to_string()));
        }

        let version = 1;
        let (tx, _rx) = watch::channel(Some(Versioned {
            version,
            doc: doc.clone(),
        }));
        tracing::debug!(%id, "document created");
        entries.insert(id, Entry { version, doc, tx });
        Ok(version)
    }

    fn get(&self, id: &K) -> Result<Versioned<T>, StoreError> {
        let entries = self.lock();
        let entry = entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(Versioned {
            version: entry.version,
            doc: entry.doc.clone(),
        })
    }

    fn compare_and_swap(
        &self,
        id: &K,
        expected_version: u64,
        doc: T,
    ) -> Result<u64, StoreError> {
        let mut entries = self.lock();
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if entry.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual: entry.version,
            });
        }

        entry.version += 1;
        entry.doc = doc;
        // Dropped receivers are fine — send_replace never fails.
        entry.tx.send_replace(Some(Versioned {
            version: entry.version,
            doc: entry.doc.clone(),
        }));
        Ok(entry.version)
    }

    fn remove_if(&self, id: &K, expected_version: u64) -> Result<(), StoreError> {
        let mut entries = self.lock();
        let entry = entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        if entry.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: id.to_string(),
                expected: expected_version,
                actual: entry.version,
            });
        }

        // Checked above; remove cannot miss.
        if let Some(entry) = entries.remove(id) {
            entry.tx.send_replace(None);
        }
        tracing::debug!(%id, "document removed");
        Ok(())
    }

    fn watch(&self, id: &K) -> Result<watch::Receiver<Option<Versioned<T>>>, StoreError> {
        let entries = self.lock();
        let entry = entries
            .get(id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        Ok(entry.tx.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn store() -> MemoryStore<u64, String> {
        MemoryStore::new()
    }

    #[test]
    fn test_insert_then_get_returns_version_one() {
        let s = store();
        let v = s.insert(1, "a".into()).unwrap();
        assert_eq!(v, 1);

        let read = s.get(&1).unwrap();
        assert_eq!(read.version, 1);
        assert_eq!(read.doc, "a");
    }

    #[test]
    fn test_insert_duplicate_id_rejected() {
        let s = store();
        s.insert(1, "a".into()).unwrap();
        let result = s.insert(1, "b".into());
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
        // Original untouched.
        assert_eq!(s.get(&1).unwrap().doc, "a");
    }

    #[test]
    fn test_get_missing_returns_not_found() {
        let s = store();
        assert!(matches!(s.get(&9), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_cas_with_current_version_bumps() {
        let s = store();
        s.insert(1, "a".into()).unwrap();

        let v2 = s.compare_and_swap(&1, 1, "b".into()).unwrap();
        assert_eq!(v2, 2);
        assert_eq!(s.get(&1).unwrap().doc, "b");
    }

    #[test]
    fn test_cas_with_stale_version_conflicts_without_writing() {
        let s = store();
        s.insert(1, "a".into()).unwrap();
        s.compare_and_swap(&1, 1, "b".into()).unwrap();

        let result = s.compare_and_swap(&1, 1, "c".into());
        assert!(matches!(
            result,
            Err(StoreError::VersionConflict { expected: 1, actual: 2, .. })
        ));
        assert_eq!(s.get(&1).unwrap().doc, "b", "losing write must not land");
    }

    #[test]
    fn test_remove_if_respects_version() {
        let s = store();
        s.insert(1, "a".into()).unwrap();
        s.compare_and_swap(&1, 1, "b".into()).unwrap();

        assert!(s.remove_if(&1, 1).is_err());
        assert!(s.get(&1).is_ok());

        s.remove_if(&1, 2).unwrap();
        assert!(matches!(s.get(&1), Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_watch_sees_every_accepted_write() {
        let s = store();
        s.insert(1, "a".into()).unwrap();
        let mut rx = s.watch(&1).unwrap();

        // Seeded with current state.
        let seed = rx.borrow_and_update().clone().unwrap();
        assert_eq!(seed.doc, "a");

        s.compare_and_swap(&1, 1, "b".into()).unwrap();
        rx.changed().await.unwrap();
        let next = rx.borrow_and_update().clone().unwrap();
        assert_eq!(next.version, 2);
        assert_eq!(next.doc, "b");
    }

    #[tokio::test]
    async fn test_watch_receives_none_on_removal() {
        let s = store();
        s.insert(1, "a".into()).unwrap();
        let mut rx = s.watch(&1).unwrap();
        let _ = rx.borrow_and_update();

        s.remove_if(&1, 1).unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }

    #[test]
    fn test_watch_missing_returns_not_found() {
        let s = store();
        assert!(matches!(s.watch(&9), Err(StoreError::NotFound(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_cas_exactly_one_wins() {
        // Two writers race from the same snapshot version; the store must
        // admit exactly one.
        let s = Arc::new(store());
        s.insert(1, "base".into()).unwrap();

        let a = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.compare_and_swap(&1, 1, "a".into()) })
        };
        let b = {
            let s = Arc::clone(&s);
            tokio::spawn(async move { s.compare_and_swap(&1, 1, "b".into()) })
        };

        let (ra, rb) = (a.await.unwrap(), b.await.unwrap());
        let wins = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
        assert_eq!(wins, 1, "exactly one concurrent CAS may land");

        let final_doc = s.get(&1).unwrap();
        assert_eq!(final_doc.version, 2);
        assert!(final_doc.doc == "a" || final_doc.doc == "b");
    }
}
