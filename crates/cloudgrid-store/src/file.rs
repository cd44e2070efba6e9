//! File-backed store
//!
//! Persists the whole key space as a single JSON snapshot. Every write goes to
//! `{file}.tmp` and is renamed over the live file; the previous snapshot is
//! kept as `{file}.backup` and read when the live file is missing.

use crate::error::{Result, StoreError};
use crate::{KeyValue, KvStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

const SNAPSHOT_VERSION: u32 = 1;

/// On-disk snapshot format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct Snapshot {
    /// Snapshot format version
    version: u32,

    /// Last modified timestamp
    updated_at: DateTime<Utc>,

    /// Entries indexed by full key
    entries: BTreeMap<String, String>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            updated_at: Utc::now(),
            entries: BTreeMap::new(),
        }
    }
}

/// JSON-file store
///
/// The in-process mutex serializes read-modify-write of the snapshot. Two
/// processes sharing one file are not coordinated.
pub struct FileStore {
    path: PathBuf,
    guard: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            guard: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        self.path.with_file_name(name)
    }

    fn backup_path(&self) -> PathBuf {
        self.sibling_path(".backup")
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling_path(".tmp")
    }

    async fn load(&self) -> Result<Snapshot> {
        let source = if self.path.exists() {
            self.path.clone()
        } else {
            let backup = self.backup_path();
            if !backup.exists() {
                tracing::debug!("Store file not found, starting empty");
                return Ok(Snapshot::default());
            }
            tracing::warn!("Store file missing, recovering from {}", backup.display());
            backup
        };

        let content = fs::read_to_string(&source).await?;
        if content.trim().is_empty() {
            return Ok(Snapshot::default());
        }
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        if snapshot.version > SNAPSHOT_VERSION {
            return Err(StoreError::Corrupted(format!(
                "snapshot version {} is newer than supported version {}",
                snapshot.version, SNAPSHOT_VERSION
            )));
        }

        Ok(snapshot)
    }

    async fn save(&self, snapshot: &mut Snapshot) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                fs::create_dir_all(dir).await?;
                tracing::debug!("Created store directory: {}", dir.display());
            }
        }

        snapshot.updated_at = Utc::now();
        let content = serde_json::to_string_pretty(snapshot)?;

        // the live file is only ever replaced by rename, never truncated
        let temp = self.temp_path();
        fs::write(&temp, content).await?;
        if self.path.exists() {
            fs::copy(&self.path, self.backup_path()).await?;
        }
        fs::rename(&temp, &self.path).await?;

        tracing::debug!("Saved store with {} entries", snapshot.entries.len());
        Ok(())
    }
}

#[async_trait]
impl KvStore for FileStore {
    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.guard.lock().await;
        let mut snapshot = self.load().await?;
        snapshot.entries.insert(key.to_string(), value.to_string());
        self.save(&mut snapshot).await
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        let _guard = self.guard.lock().await;
        let snapshot = self.load().await?;
        Ok(snapshot.entries.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let _guard = self.guard.lock().await;
        let mut snapshot = self.load().await?;
        if snapshot.entries.remove(key).is_some() {
            self.save(&mut snapshot).await?;
        }
        Ok(())
    }

    async fn list_by_prefix(&self, prefix: &str) -> Result<Vec<KeyValue>> {
        let _guard = self.guard.lock().await;
        let snapshot = self.load().await?;
        Ok(snapshot
            .entries
            .into_iter()
            .filter(|(k, _)| k.starts_with(prefix))
            .map(|(key, value)| KeyValue { key, value })
            .collect())
    }
}
