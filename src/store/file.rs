//! File-backed observation log.
//!
//! # Responsibilities
//! - Own the log file exclusively
//! - Recover from a missing or corrupt file by starting an empty log
//! - Replace the file atomically on every append
//!
//! # Design Decisions
//! - Stores opened on the same file share one process-wide lock, keyed by the
//!   canonical path, so their read-modify-write cycles never interleave
//! - Each write goes through a uniquely named temporary sibling, then a rename

use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::StorageConfig;
use crate::observability::metrics;
use crate::store::{JsonCodec, ObservationLog, ObservationRecord, RecordCodec, StoreError};

/// Default log file name inside the data directory.
pub const DEFAULT_FILE_NAME: &str = "net_watch_logs";

/// Canonical log path → lock shared by every store on that file.
static FILE_LOCKS: Lazy<DashMap<PathBuf, Arc<Mutex<()>>>> = Lazy::new(DashMap::new);

/// Append-only log persisted as a single encoded blob.
pub struct FileLogStore {
    path: PathBuf,
    codec: Box<dyn RecordCodec>,
    /// Serializes read-modify-write cycles and reads across all stores on `path`.
    lock: Arc<Mutex<()>>,
}

impl FileLogStore {
    /// Create a JSON-encoded store at `path`. Nothing is touched on disk yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_codec(path, JsonCodec::new())
    }

    pub fn with_codec(path: impl Into<PathBuf>, codec: impl RecordCodec + 'static) -> Self {
        let path = path.into();
        let lock = FILE_LOCKS.entry(lock_key(&path)).or_default().clone();
        Self {
            path,
            codec: Box::new(codec),
            lock,
        }
    }

    /// Store at `<user data dir>/net_watch_logs`.
    pub fn in_data_dir() -> Result<Self, StoreError> {
        Ok(Self::new(default_log_path()?))
    }

    /// Build a store from the `[storage]` configuration section.
    pub fn from_config(config: &StorageConfig) -> Result<Self, StoreError> {
        let path = resolve_log_path(config)?;
        let store = if config.pretty {
            Self::with_codec(path, JsonCodec::pretty())
        } else {
            Self::new(path)
        };
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory holding the log file if it is missing.
    pub fn ensure_directory(&self) -> Result<(), StoreError> {
        match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => fs::create_dir_all(parent).map_err(|source| StoreError::Write {
                path: self.path.clone(),
                source,
            }),
            None => Ok(()),
        }
    }

    /// Read the current sequence, treating any read or decode failure as empty.
    fn load(&self) -> Vec<ObservationRecord> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                let err = StoreError::Read { path: self.path.clone(), source: e };
                tracing::warn!(error = %err, "Log file unreadable, treating as empty");
                metrics::record_store_failure("read");
                return Vec::new();
            }
        };

        if bytes.is_empty() {
            return Vec::new();
        }

        match self.codec.decode(&bytes) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Log file corrupt, starting a new log");
                metrics::record_store_failure("decode");
                Vec::new()
            }
        }
    }

    /// Write the whole sequence to a temporary sibling, then rename it over the log.
    fn persist(&self, records: &[ObservationRecord]) -> Result<(), StoreError> {
        let bytes = self.codec.encode(records)?;
        let write_err = |source: std::io::Error| StoreError::Write { path: self.path.clone(), source };

        self.ensure_directory()?;

        let mut tmp = temp_file(&self.path).map_err(write_err)?;
        tmp.write_all(&bytes).map_err(write_err)?;
        tmp.as_file().sync_all().map_err(write_err)?;

        // A failed persist hands the temp file back; dropping it removes it.
        tmp.persist(&self.path).map_err(|e| write_err(e.error))?;
        Ok(())
    }
}

impl ObservationLog for FileLogStore {
    fn append(&self, record: ObservationRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut records = self.load();
        records.push(record);
        self.persist(&records)?;

        tracing::trace!(path = ?self.path, count = records.len(), "Appended observation");
        Ok(())
    }

    fn get_all(&self) -> Result<Vec<ObservationRecord>, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load())
    }
}

impl std::fmt::Debug for FileLogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLogStore").field("path", &self.path).finish()
    }
}

/// `<user data dir>/net_watch_logs`.
pub fn default_log_path() -> Result<PathBuf, StoreError> {
    dirs::data_dir()
        .map(|dir| dir.join(DEFAULT_FILE_NAME))
        .ok_or(StoreError::NoDataDirectory)
}

/// Log file location for a storage configuration.
pub fn resolve_log_path(config: &StorageConfig) -> Result<PathBuf, StoreError> {
    let directory = match &config.directory {
        Some(dir) => dir.clone(),
        None => dirs::data_dir().ok_or(StoreError::NoDataDirectory)?,
    };
    Ok(directory.join(&config.file_name))
}

/// Key identifying the log file regardless of how its path was spelled.
///
/// The file itself may not exist yet, so the parent directory is resolved
/// when possible and the file name joined back on.
fn lock_key(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(dir), Some(name)) => dir.join(name),
        _ => std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf()),
    }
}

/// Fresh `<name>.<random>.tmp` next to the log file.
fn temp_file(path: &Path) -> std::io::Result<tempfile::NamedTempFile> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let mut prefix = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    prefix.push(".");
    tempfile::Builder::new().prefix(&prefix).suffix(".tmp").tempfile_in(parent)
}
