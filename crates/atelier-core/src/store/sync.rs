//! Fire-and-forget remote sync.
//!
//! Writes and removals are queued on an unbounded channel and applied to a
//! [`RemoteSink`] by a background task. Callers never await a push; failures are logged and
//! dropped. Durability on the remote side is eventual.

use crate::error::{StudioError, StudioResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Remote backing store for collection snapshots.
#[async_trait]
pub trait RemoteSink: Send + Sync {
    fn name(&self) -> &str;

    /// Replaces the remote copy of `key` with `value`.
    async fn push(&self, key: &str, value: &[u8]) -> StudioResult<()>;

    /// Drops the remote copy of `key`. Removing a missing copy succeeds.
    async fn remove(&self, key: &str) -> StudioResult<()>;
}

/// Mirrors every collection as `<key>.json` in a directory.
#[derive(Debug, Clone)]
pub struct MirrorSink {
    dir: PathBuf,
}

impl MirrorSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File the collection under `key` is mirrored to.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let safe: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", safe))
    }
}

#[async_trait]
impl RemoteSink for MirrorSink {
    fn name(&self) -> &str {
        "mirror"
    }

    async fn push(&self, key: &str, value: &[u8]) -> StudioResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, value).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> StudioResult<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[derive(Debug)]
struct SyncJob {
    key: String,
    /// `None` removes the remote copy.
    value: Option<Vec<u8>>,
}

/// Sending half of the sync channel. Cloning shares the same worker.
#[derive(Debug, Clone)]
pub struct SyncQueue {
    tx: mpsc::UnboundedSender<SyncJob>,
}

impl SyncQueue {
    /// Starts the worker on the current tokio runtime. The handle resolves to
    /// the number of jobs applied (pushes and removals) once every queue clone
    /// is dropped.
    pub fn spawn(sink: Arc<dyn RemoteSink>) -> (Self, JoinHandle<usize>) {
        let (tx, mut rx) = mpsc::unbounded_channel::<SyncJob>();
        let handle = tokio::spawn(async move {
            let mut applied = 0usize;
            while let Some(job) = rx.recv().await {
                let result = match &job.value {
                    Some(value) => sink.push(&job.key, value).await,
                    None => sink.remove(&job.key).await,
                };
                match result {
                    Ok(()) => {
                        applied += 1;
                        tracing::debug!(
                            target: "atelier::sync",
                            sink = sink.name(),
                            key = %job.key,
                            action = if job.value.is_some() { "PUSH" } else { "REMOVE" },
                            "synced '{}'",
                            job.key
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            target: "atelier::sync",
                            sink = sink.name(),
                            key = %job.key,
                            error = %e,
                            "sync of '{}' failed; dropped",
                            job.key
                        );
                    }
                }
            }
            applied
        });
        (Self { tx }, handle)
    }

    /// Queues a snapshot without blocking. Returns an error only if the worker is gone.
    pub fn enqueue(&self, key: &str, value: &[u8]) -> StudioResult<()> {
        self.tx
            .send(SyncJob {
                key: key.to_string(),
                value: Some(value.to_vec()),
            })
            .map_err(|_| StudioError::Sync(format!("sync worker stopped; '{}' not queued", key)))
    }

    /// Queues removal of the remote copy of `key`.
    pub fn enqueue_removal(&self, key: &str) -> StudioResult<()> {
        self.tx
            .send(SyncJob {
                key: key.to_string(),
                value: None,
            })
            .map_err(|_| StudioError::Sync(format!("sync worker stopped; removal of '{}' not queued", key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl RemoteSink for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        async fn push(&self, key: &str, _value: &[u8]) -> StudioResult<()> {
            if key == "poison" {
                return Err(StudioError::Sync("remote rejected".into()));
            }
            self.seen.lock().unwrap().push(key.to_string());
            Ok(())
        }

        async fn remove(&self, key: &str) -> StudioResult<()> {
            self.seen.lock().unwrap().push(format!("-{}", key));
            Ok(())
        }
    }

    #[tokio::test]
    async fn failures_are_dropped_and_worker_keeps_going() {
        let recorder = Arc::new(Recorder::default());
        let (queue, handle) = SyncQueue::spawn(recorder.clone());
        queue.enqueue("a", b"[]").unwrap();
        queue.enqueue("poison", b"[]").unwrap();
        queue.enqueue("b", b"[]").unwrap();
        drop(queue);
        assert_eq!(handle.await.unwrap(), 2);
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn mirror_sink_writes_json_files() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(MirrorSink::new(dir.path().join("mirror")));
        let (queue, handle) = SyncQueue::spawn(sink.clone());
        queue.enqueue("bi_signals", b"[1]").unwrap();
        queue.enqueue("bi_signals", b"[1,2]").unwrap();
        drop(queue);
        assert_eq!(handle.await.unwrap(), 2);
        let body = std::fs::read(sink.path_for("bi_signals")).unwrap();
        assert_eq!(body, b"[1,2]");
    }

    #[tokio::test]
    async fn removals_delete_the_mirrored_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = Arc::new(MirrorSink::new(dir.path().join("mirror")));
        let (queue, handle) = SyncQueue::spawn(sink.clone());
        queue.enqueue("fl_designs", b"[]").unwrap();
        queue.enqueue_removal("fl_designs").unwrap();
        queue.enqueue_removal("never_written").unwrap();
        drop(queue);
        assert_eq!(handle.await.unwrap(), 3);
        assert!(!sink.path_for("fl_designs").exists());
    }

    #[tokio::test]
    async fn removals_reach_the_sink_in_order() {
        let recorder = Arc::new(Recorder::default());
        let (queue, handle) = SyncQueue::spawn(recorder.clone());
        queue.enqueue("a", b"[]").unwrap();
        queue.enqueue_removal("a").unwrap();
        drop(queue);
        assert_eq!(handle.await.unwrap(), 2);
        assert_eq!(*recorder.seen.lock().unwrap(), vec!["a", "-a"]);
    }

    #[test]
    fn mirror_paths_are_sanitised() {
        let sink = MirrorSink::new("/tmp/m");
        assert_eq!(sink.path_for("../etc"), PathBuf::from("/tmp/m/___etc.json"));
    }
}
