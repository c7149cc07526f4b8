//! Durable request cache
//!
//! Provides a `CacheStore` that keeps every upstream response in memory, keyed
//! by its canonical request key, and rewrites the whole mapping to a single
//! JSON file whenever a new entry arrives.

use directories::ProjectDirs;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the cache inside the default cache directory
const CACHE_FILE_NAME: &str = "request_cache.json";

/// Suffix of the staging file written next to the cache
const STAGING_SUFFIX: &str = ".tmp";

/// Errors that can occur when reading the cache file at startup
///
/// These are recoverable: [`CacheStore::load`] treats them as an empty cache.
#[derive(Debug, Error)]
pub enum CacheLoadError {
    /// The cache file could not be read
    #[error("Failed to read cache file: {0}")]
    Io(#[from] io::Error),

    /// The cache file is not a JSON object of entries
    #[error("Malformed cache file: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Errors that can occur when persisting the cache to disk
#[derive(Debug, Error)]
pub enum StoreWriteError {
    /// Directory creation, file writing, or syncing failed
    #[error("Failed to write cache file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The in-memory mapping could not be serialized
    #[error("Failed to serialize cache: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory cache of upstream payloads with a write-through JSON snapshot
///
/// Entries are never updated or evicted. Single-writer only: two processes
/// sharing one cache file will overwrite each other's entries.
#[derive(Debug)]
pub struct CacheStore {
    /// File the mapping is persisted to
    path: PathBuf,
    /// Canonical key to raw decoded response body
    entries: BTreeMap<String, Value>,
}

impl CacheStore {
    /// Returns the default cache file path
    ///
    /// Uses `~/.cache/restaurant-scout/request_cache.json` on Linux, or the
    /// equivalent XDG path on other platforms. Returns `None` if no home
    /// directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "restaurant-scout")?;
        Some(project_dirs.cache_dir().join(CACHE_FILE_NAME))
    }

    /// Loads the cache from `path`, starting empty if it cannot be read
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match Self::try_load(&path) {
            Ok(entries) => {
                tracing::debug!(path = %path.display(), entries = entries.len(), "loaded request cache");
                entries
            }
            Err(CacheLoadError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no request cache yet, starting empty");
                BTreeMap::new()
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "ignoring unreadable request cache");
                BTreeMap::new()
            }
        };
        Self { path, entries }
    }

    /// Reads and parses the cache file without falling back
    pub fn try_load(path: &Path) -> Result<BTreeMap<String, Value>, CacheLoadError> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Returns the stored payload for `key`, if any
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Inserts a new entry and synchronously rewrites the cache file
    ///
    /// An existing key keeps its original payload and nothing is written. If
    /// the write fails the entry stays in memory for the rest of the process.
    pub fn put(&mut self, key: impl Into<String>, entry: Value) -> Result<(), StoreWriteError> {
        let key = key.into();
        if self.contains(&key) {
            tracing::debug!(%key, "cache entry already present, keeping original");
            return Ok(());
        }
        self.entries.insert(key, entry);
        self.persist()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling file the next snapshot is written to before it replaces the cache
    fn staging_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(STAGING_SUFFIX);
        PathBuf::from(name)
    }

    /// Writes the full mapping to disk and syncs it before returning
    ///
    /// The snapshot goes to a staging file that is renamed over the cache, so a
    /// failed write leaves the previous snapshot intact.
    fn persist(&self) -> Result<(), StoreWriteError> {
        let json = serde_json::to_string(&self.entries)?;
        let io_err = |source| StoreWriteError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let staging = self.staging_path();
        let written = File::create(&staging).and_then(|mut file| {
            file.write_all(json.as_bytes())?;
            file.sync_all()
        });
        if let Err(err) = written.and_then(|()| fs::rename(&staging, &self.path)) {
            let _ = fs::remove_file(&staging);
            return Err(io_err(err));
        }

        tracing::info!(path = %self.path.display(), entries = self.entries.len(), "persisted request cache");
        Ok(())
    }
}
