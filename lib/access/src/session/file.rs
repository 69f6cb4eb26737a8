//! Session storage backed by a JSON file.

use super::TokenStorage;
use crate::error::StorageError;
use rootcause::prelude::Report;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

type Entries = BTreeMap<String, String>;

/// Keeps entries as a flat JSON object in a single file.
///
/// A missing file is an empty store. Writes go to a sibling temporary file
/// that is then renamed over the original, so a crash never leaves a
/// truncated session behind. Removing the last entry deletes the file.
///
/// A file that cannot be parsed reads as an error, but the next write
/// replaces it, so a damaged session never blocks signing in again.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStorage {
    /// Creates storage at `path`. Nothing is touched until the first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn display_path(&self) -> String {
        self.path.display().to_string()
    }

    fn io_error(&self, e: &std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.display_path(),
            reason: e.to_string(),
        }
    }

    fn read_entries(&self) -> Result<Entries, StorageError> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(self.io_error(&e)),
        };
        if raw.trim().is_empty() {
            return Ok(Entries::new());
        }
        serde_json::from_str(&raw).map_err(|e| StorageError::Corrupt {
            path: self.display_path(),
            reason: e.to_string(),
        })
    }

    fn load(&self) -> Result<Entries, Report<StorageError>> {
        Ok(self.read_entries()?)
    }

    /// Loads entries ahead of a write. Corrupt contents are discarded; the
    /// flag tells the caller the file must be rewritten.
    fn load_for_write(&self) -> Result<(Entries, bool), Report<StorageError>> {
        match self.read_entries() {
            Ok(entries) => Ok((entries, false)),
            Err(StorageError::Corrupt { path, reason }) => {
                warn!(%path, %reason, "discarding corrupt session file");
                Ok((Entries::new(), true))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, entries: &Entries) -> Result<(), Report<StorageError>> {
        if entries.is_empty() {
            return match std::fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(self.io_error(&e).into()),
            };
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_error(&e))?;
        }

        let contents = serde_json::to_string_pretty(entries).map_err(|e| StorageError::Io {
            path: self.display_path(),
            reason: e.to_string(),
        })?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, contents).map_err(|e| self.io_error(&e))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| self.io_error(&e))?;
        Ok(())
    }

    fn locked<R>(
        &self,
        op: impl FnOnce() -> Result<R, Report<StorageError>>,
    ) -> Result<R, Report<StorageError>> {
        let _guard = self.lock.lock().map_err(|_| StorageError::Unavailable {
            reason: "session file lock poisoned".to_string(),
        })?;
        op()
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, Report<StorageError>> {
        self.locked(|| Ok(self.load()?.remove(key)))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), Report<StorageError>> {
        self.locked(|| {
            let (mut entries, _) = self.load_for_write()?;
            entries.insert(key.to_string(), value.to_string());
            self.store(&entries)
        })
    }

    fn remove(&self, key: &str) -> Result<(), Report<StorageError>> {
        self.locked(|| {
            let (mut entries, discarded) = self.load_for_write()?;
            if entries.remove(key).is_none() && !discarded {
                return Ok(());
            }
            self.store(&entries)
        })
    }
}
