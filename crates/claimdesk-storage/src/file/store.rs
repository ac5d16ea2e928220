//! Durable key-value store persisted as a single JSON object on disk.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use claimdesk_core::error::{AppError, ErrorKind};
use claimdesk_core::result::AppResult;
use claimdesk_core::traits::KeyValueStore;

type Entries = BTreeMap<String, String>;

/// Durable store: every write is flushed to disk before it returns.
///
/// The whole map is rewritten through a temporary file and an atomic
/// rename, so a crash leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileStore {
    /// Target file.
    path: PathBuf,
    /// In-memory mirror of the file.
    entries: Mutex<Entries>,
}

impl FileStore {
    /// Open (or lazily create) the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or corrupt file is
    /// logged and replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> AppResult<Self> {
        let path = path.into();
        let entries = match fs::read(&path) {
            Ok(data) => match serde_json::from_slice::<Entries>(&data) {
                Ok(entries) => entries,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Durable store is corrupt, starting empty");
                    Entries::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read durable store '{}'", path.display()),
                    e,
                ));
            }
        };

        debug!(path = %path.display(), keys = entries.len(), "Durable store opened");

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn flush(&self, entries: &Entries) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let payload = serde_json::to_vec_pretty(entries)?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, payload)?;
        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Apply `change` and flush; on flush failure the change is rolled back
    /// so memory never runs ahead of disk.
    fn write_through(&self, change: impl FnOnce(&mut Entries)) -> AppResult<()> {
        let mut entries = self.lock();
        let before = entries.clone();
        change(&mut entries);

        if let Err(e) = self.flush(&entries) {
            *entries = before;
            return Err(e);
        }
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> AppResult<Option<String>> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AppResult<()> {
        self.write_through(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> AppResult<()> {
        if !self.lock().contains_key(key) {
            return Ok(());
        }
        self.write_through(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> AppResult<()> {
        self.write_through(|entries| entries.clear())
    }

    fn backend(&self) -> &'static str {
        "file"
    }
}
