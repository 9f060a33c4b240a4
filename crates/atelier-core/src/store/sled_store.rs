//! Sled-backed collection store with a read cache and optional remote sync.

use super::{KeyValueStore, SyncQueue};
use crate::error::StudioResult;
use dashmap::DashMap;
use sled::{Db, Tree};
use std::path::Path;

/// Directory name for the collections DB under the configured storage path.
pub const DEFAULT_DB_DIR: &str = "atelier_collections";

/// Sled tree holding one entry per collection key.
pub const COLLECTIONS_TREE: &str = "collections";

/// Local persistence for every collection.
///
/// Writes land in the sled tree and the in-memory cache before `put` returns,
/// so reads in the same session see them immediately. When a [`SyncQueue`] is
/// attached, each write is also queued for the remote sink.
pub struct SledStore {
    db: Db,
    tree: Tree,
    cache: DashMap<String, Vec<u8>>,
    sync: Option<SyncQueue>,
}

impl SledStore {
    /// Opens or creates the DB at `path`.
    pub fn open_path<P: AsRef<Path>>(path: P) -> StudioResult<Self> {
        let db = sled::open(path.as_ref())?;
        let tree = db.open_tree(COLLECTIONS_TREE)?;
        tracing::info!(
            target: "atelier::store",
            path = %path.as_ref().display(),
            entries = tree.len(),
            "opened collection store at {}",
            path.as_ref().display()
        );
        Ok(Self {
            db,
            tree,
            cache: DashMap::new(),
            sync: None,
        })
    }

    /// Forwards every subsequent write to the remote sync worker.
    pub fn with_sync(mut self, queue: SyncQueue) -> Self {
        self.sync = Some(queue);
        self
    }

    pub fn is_syncing(&self) -> bool {
        self.sync.is_some()
    }

    /// Number of collection keys on disk.
    pub fn entry_count(&self) -> usize {
        self.tree.len()
    }

    /// Forces pending writes to disk. Returns bytes flushed.
    pub fn flush(&self) -> StudioResult<usize> {
        Ok(self.db.flush()?)
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> StudioResult<Option<Vec<u8>>> {
        if let Some(hit) = self.cache.get(key) {
            return Ok(Some(hit.value().clone()));
        }
        let value = self.tree.get(key.as_bytes())?.map(|iv| iv.to_vec());
        if let Some(ref bytes) = value {
            self.cache.insert(key.to_string(), bytes.clone());
        }
        Ok(value)
    }

    fn put(&self, key: &str, value: &[u8]) -> StudioResult<()> {
        let prev = self.tree.insert(key.as_bytes(), value)?;
        self.cache.insert(key.to_string(), value.to_vec());

        let is_update = prev.is_some();
        tracing::info!(
            target: "atelier::store",
            key = key,
            bytes = value.len(),
            action = if is_update { "UPDATE" } else { "INSERT" },
            "{} '{}' ({} bytes)",
            if is_update { "updated" } else { "inserted" },
            key,
            value.len()
        );

        if let Some(queue) = &self.sync {
            if let Err(e) = queue.enqueue(key, value) {
                tracing::warn!(target: "atelier::sync", key = key, error = %e, "remote sync skipped");
            }
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> StudioResult<bool> {
        let prev = self.tree.remove(key.as_bytes())?;
        self.cache.remove(key);
        if prev.is_some() {
            tracing::info!(
                target: "atelier::store",
                key = key,
                action = "REMOVE",
                "removed '{}'",
                key
            );
            if let Some(queue) = &self.sync {
                if let Err(e) = queue.enqueue_removal(key) {
                    tracing::warn!(target: "atelier::sync", key = key, error = %e, "remote removal skipped");
                }
            }
        }
        Ok(prev.is_some())
    }

    fn keys(&self) -> StudioResult<Vec<String>> {
        let mut keys = Vec::new();
        for k in self.tree.iter().keys() {
            let k = k?;
            if let Ok(s) = String::from_utf8(k.to_vec()) {
                keys.push(s);
            }
        }
        Ok(keys)
    }
}
