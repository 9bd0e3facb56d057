//! Per-project key-value storage for layout records.
//!
//! The service only needs two calls: read the bytes stored under a project
//! path, and replace them. Each `write` must be atomic on its own; ordering
//! between writes is handled by the caller.

use std::collections::HashMap;
use std::future::Future;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use uuid::Uuid;

/// Storage backend for layout records, keyed by project path.
pub trait LayoutStore: Send + Sync + 'static {
    /// Returns the bytes stored under `key`, or `None` if nothing was written.
    fn read(&self, key: &str) -> impl Future<Output = io::Result<Option<Vec<u8>>>> + Send;

    /// Replaces whatever is stored under `key`.
    fn write(&self, key: &str, bytes: Vec<u8>) -> impl Future<Output = io::Result<()>> + Send;
}

// ============================================================================
// File store
// ============================================================================

/// Stores one JSON file per project in a single directory.
///
/// Project paths are not usable as file names, so each record is named after
/// a UUID derived from the path. The mapping is stable across runs.
#[derive(Debug, Clone)]
pub struct FileLayoutStore {
    root: PathBuf,
}

impl FileLayoutStore {
    /// Creates a store rooted at `root`. The directory is created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self { Self { root: root.into() } }

    /// Directory holding the records.
    #[must_use]
    pub fn root(&self) -> &Path { &self.root }

    /// File the record of `key` lives in.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name = Uuid::new_v5(&Uuid::NAMESPACE_URL, key.as_bytes());
        self.root.join(format!("{name}.json"))
    }
}

impl LayoutStore for FileLayoutStore {
    async fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        let path = self.path_for(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> io::Result<()> {
        let root = self.root.clone();
        let path = self.path_for(key);

        tokio::task::spawn_blocking(move || write_atomic(&root, &path, &bytes))
            .await
            .map_err(io::Error::other)?
    }
}

/// Writes to a temporary file next to `path` and renames it into place.
fn write_atomic(root: &Path, path: &Path, bytes: &[u8]) -> io::Result<()> {
    std::fs::create_dir_all(root)?;

    let mut file = tempfile::NamedTempFile::new_in(root)?;
    file.write_all(bytes)?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|err| err.error)?;

    tracing::trace!(path = %path.display(), "layout: record written");
    Ok(())
}

// ============================================================================
// Memory store
// ============================================================================

/// In-memory store, used by tests and by `--ephemeral` sessions.
///
/// Failures can be injected to exercise error paths.
#[derive(Debug, Default)]
pub struct MemoryLayoutStore {
    records: Mutex<HashMap<String, Vec<u8>>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryLayoutStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Makes every subsequent read fail.
    pub fn fail_reads(&self, fail: bool) { self.fail_reads.store(fail, Ordering::SeqCst); }

    /// Makes every subsequent write fail.
    pub fn fail_writes(&self, fail: bool) { self.fail_writes.store(fail, Ordering::SeqCst); }

    /// Raw bytes stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Vec<u8>> { self.records.lock().get(key).cloned() }

    /// Stores `bytes` under `key` directly, bypassing failure injection.
    pub fn insert(&self, key: &str, bytes: impl Into<Vec<u8>>) {
        self.records.lock().insert(key.to_string(), bytes.into());
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize { self.records.lock().len() }

    /// Returns `true` if nothing has been stored.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.records.lock().is_empty() }
}

impl LayoutStore for MemoryLayoutStore {
    async fn read(&self, key: &str) -> io::Result<Option<Vec<u8>>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "read refused"));
        }
        Ok(self.get(key))
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> io::Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::StorageFull, "write refused"));
        }
        self.records.lock().insert(key.to_string(), bytes);
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
