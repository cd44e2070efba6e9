//! In-process advisory locks keyed by store key
//!
//! The store has no compare-and-swap, so create-if-absent and
//! read-modify-write sequences on one key are serialized here. Locks are not
//! reentrant: code holding a key's guard must use the unlocked internals.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OwnedMutexGuard;

type Entry = Arc<tokio::sync::Mutex<()>>;

#[derive(Debug, Default)]
pub struct KeyedLocks {
    entries: Mutex<HashMap<String, Entry>>,
}

/// Held for the duration of one operation on one key
pub struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: &str) -> KeyGuard<'_> {
        let entry = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.entry(key.to_string()).or_default().clone()
        };
        let guard = entry.lock_owned().await;

        KeyGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of keys with a live lock entry
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        // release first so the strong count below only sees waiters
        self.guard.take();

        let mut entries = self
            .locks
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(entry) = entries.get(&self.key) {
            if Arc::strong_count(entry) == 1 {
                entries.remove(&self.key);
            }
        }
    }
}
