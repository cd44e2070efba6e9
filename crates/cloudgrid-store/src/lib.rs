//! CloudGrid Resource Store
//!
//! Namespace-scoped key-value persistence for registry objects.
//!
//! The store offers only `put`, `get`, `delete` and `list_by_prefix`. There are
//! no multi-key transactions: a caller that touches more than one key must not
//! assume the writes land atomically.
//!
//! # Key layout
//!
//! ```text
//! /ns/{namespace}/resources/{kind}/{id}
//! /ns/{namespace}/resources/{kind}/{parentId}/{childKind}/{childId}
//! ```
//!
//! # Backends
//!
//! - [`MemoryStore`]: process-local, used by tests and ephemeral runs
//! - [`FileStore`]: JSON snapshot on disk with a backup of the previous write

pub mod error;
pub mod file;
pub mod key;
pub mod memory;

use async_trait::async_trait;

// Re-exports
pub use error::{Result, StoreError};
pub use file::FileStore;
pub use key::{child_kind_prefix, child_resource_key, kind_prefix, remainder_is_leaf, resource_key};
pub use memory::MemoryStore;

/// A single key-value entry returned by a prefix scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

/// Key-value store abstraction
///
/// Values are opaque serialized payloads; the store performs no schema validation.
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Insert or overwrite a value
    async fn put(&self, key: &str, value: &str) -> Result<()>;

    /// Read a value, `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Remove a key. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// All entries whose key starts with `prefix`, ordered by key
    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<KeyValue>>;
}
