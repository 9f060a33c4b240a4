//! Persisted collection store.
//!
//! A key-addressed byte store with JSON helpers on top. Each entity
//! collection is one key holding a JSON array; keys are independent units
//! of persistence with no cross-key transactions.
//!
//! Reads never fail from the caller's point of view: [`load`] falls back to the
//! supplied default on a missing key, a backend error or undecodable bytes.
//! Writers read through [`load_strict`] instead, which refuses to hand back a
//! default for a value it could not decode.

mod memory;
mod sled_store;
mod sync;

pub use memory::MemoryStore;
pub use sled_store::{SledStore, COLLECTIONS_TREE, DEFAULT_DB_DIR};
pub use sync::{MirrorSink, RemoteSink, SyncQueue};

use crate::error::StudioResult;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Byte-level key/value backend.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StudioResult<Option<Vec<u8>>>;

    /// Writes `value`. A `get` issued afterwards in the same process must see it.
    fn put(&self, key: &str, value: &[u8]) -> StudioResult<()>;

    /// Removes the key. Returns true if it existed.
    fn remove(&self, key: &str) -> StudioResult<bool>;

    fn keys(&self) -> StudioResult<Vec<String>>;
}

/// Last persisted value for `key`, or `default`.
pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> T {
    match store.get(key) {
        Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(
                    target: "atelier::store",
                    key = key,
                    error = %e,
                    "stored value for '{}' is not decodable; using default",
                    key
                );
                default
            }
        },
        Ok(None) => default,
        Err(e) => {
            tracing::warn!(
                target: "atelier::store",
                key = key,
                error = %e,
                "load of '{}' failed; using default",
                key
            );
            default
        }
    }
}

/// Like [`load`], but a backend failure or an undecodable value is an error.
/// Callers about to overwrite `key` use this so a bad read never turns into a
/// destructive write.
pub fn load_strict<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str, default: T) -> StudioResult<T> {
    match store.get(key)? {
        Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
        None => Ok(default),
    }
}

/// Serializes `value` to JSON and persists it under `key`.
pub fn save<T: Serialize + ?Sized>(store: &dyn KeyValueStore, key: &str, value: &T) -> StudioResult<()> {
    let bytes = serde_json::to_vec(value)?;
    store.put(key, &bytes)
}
