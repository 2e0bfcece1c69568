//! Durable key-value storage.
//!
//! Layout inside the store directory:
//! ```text
//! storage.json   - schema version and the string-to-string entry map
//! ```
//!
//! Writes go to `storage.json.tmp` first and are renamed into place, so a
//! crash mid-write leaves the previous file intact.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Current schema version of `storage.json`.
const STORAGE_SCHEMA_VERSION: u32 = 1;

const STORAGE_FILE: &str = "storage.json";

/// Key under which the high score lives.
pub const HIGH_SCORE_KEY: &str = "high-score";

/// Value written when the high score is absent.
pub const HIGH_SCORE_DEFAULT: &str = "0";

/// Errors from key-value storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("schema version mismatch: file has v{file_version}, expected v{expected_version}")]
    SchemaMismatch {
        file_version: u32,
        expected_version: u32,
    },
    #[error("value for {key:?} is not an integer: {value:?}")]
    NotAnInteger { key: String, value: String },
}

/// String-keyed, string-valued durable storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write `default` under `key` only if the key is absent.
    ///
    /// Returns `true` when the default was written. Existing values, including
    /// non-default ones, are never touched.
    fn ensure_default(&mut self, key: &str, default: &str) -> Result<bool, StoreError> {
        if self.get(key)?.is_some() {
            return Ok(false);
        }
        self.set(key, default)?;
        Ok(true)
    }
}

/// Make sure the high score exists, defaulting it to `"0"`.
pub fn ensure_high_score(store: &mut impl KeyValueStore) -> Result<bool, StoreError> {
    let written = store.ensure_default(HIGH_SCORE_KEY, HIGH_SCORE_DEFAULT)?;
    if written {
        tracing::info!(key = HIGH_SCORE_KEY, "initialized high score");
    }
    Ok(written)
}

/// Read and parse the high score. `None` if it was never initialized.
pub fn high_score(store: &impl KeyValueStore) -> Result<Option<i64>, StoreError> {
    match store.get(HIGH_SCORE_KEY)? {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| StoreError::NotAnInteger {
                key: HIGH_SCORE_KEY.into(),
                value,
            }),
    }
}

/// On-disk shape of `storage.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageFile {
    pub schema_version: u32,
    pub entries: BTreeMap<String, String>,
}

impl Default for StorageFile {
    fn default() -> Self {
        Self {
            schema_version: STORAGE_SCHEMA_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// File-backed store. Every `set` is flushed to disk immediately.
pub struct FileStore {
    root: PathBuf,
    data: StorageFile,
}

impl FileStore {
    /// Open or create a store at the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let root = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)?;

        let file_path = root.join(STORAGE_FILE);
        let data = if file_path.exists() {
            let data: StorageFile = serde_json::from_reader(std::fs::File::open(&file_path)?)?;
            if data.schema_version != STORAGE_SCHEMA_VERSION {
                return Err(StoreError::SchemaMismatch {
                    file_version: data.schema_version,
                    expected_version: STORAGE_SCHEMA_VERSION,
                });
            }
            data
        } else {
            let data = StorageFile::default();
            write_atomic(&file_path, &data)?;
            data
        };

        tracing::debug!(path = %root.display(), entries = data.entries.len(), "storage opened");
        Ok(Self { root, data })
    }

    /// Get the path to the store root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.data.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.entries.is_empty()
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.data.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.data.entries.insert(key.to_string(), value.to_string());
        write_atomic(&self.root.join(STORAGE_FILE), &self.data)
    }
}

/// Volatile store for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn write_atomic(path: &Path, data: &StorageFile) -> Result<(), StoreError> {
    let tmp = path.with_extension("json.tmp");
    serde_json::to_writer_pretty(std::fs::File::create(&tmp)?, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_open_creates_file() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path().join("data")).unwrap();
        assert!(store.is_empty());
        assert!(store.root().join(STORAGE_FILE).is_file());
        assert!(!store.root().join("storage.json.tmp").exists());
    }

    #[test]
    fn set_then_reopen_preserves_value() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data");
        {
            let mut store = FileStore::open(&path).unwrap();
            store.set("volume", "11").unwrap();
        }
        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("volume").unwrap().as_deref(), Some("11"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ensure_high_score_writes_zero_once() {
        let mut store = MemoryStore::new();
        assert!(ensure_high_score(&mut store).unwrap());
        assert_eq!(store.get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("0"));
        assert!(!ensure_high_score(&mut store).unwrap());
        assert_eq!(high_score(&store).unwrap(), Some(0));
    }

    #[test]
    fn ensure_high_score_never_resets_existing_value() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data");
        {
            let mut store = FileStore::open(&path).unwrap();
            ensure_high_score(&mut store).unwrap();
            store.set(HIGH_SCORE_KEY, "1234").unwrap();
        }
        let mut store = FileStore::open(&path).unwrap();
        assert!(!ensure_high_score(&mut store).unwrap());
        assert!(!ensure_high_score(&mut store).unwrap());
        assert_eq!(high_score(&store).unwrap(), Some(1234));
    }

    #[test]
    fn high_score_absent_is_none() {
        let store = MemoryStore::new();
        assert_eq!(high_score(&store).unwrap(), None);
    }

    #[test]
    fn high_score_rejects_garbage() {
        let mut store = MemoryStore::new();
        store.set(HIGH_SCORE_KEY, "lots").unwrap();
        match high_score(&store) {
            Err(StoreError::NotAnInteger { key, value }) => {
                assert_eq!(key, HIGH_SCORE_KEY);
                assert_eq!(value, "lots");
            }
            other => panic!("expected NotAnInteger, got: {other:?}"),
        }
    }

    #[test]
    fn schema_mismatch_fail_closed() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data");
        let _store = FileStore::open(&path).unwrap();

        let file_path = path.join(STORAGE_FILE);
        let mut data: StorageFile =
            serde_json::from_reader(std::fs::File::open(&file_path).unwrap()).unwrap();
        data.schema_version = 999;
        serde_json::to_writer_pretty(std::fs::File::create(&file_path).unwrap(), &data).unwrap();

        match FileStore::open(&path) {
            Err(StoreError::SchemaMismatch {
                file_version,
                expected_version,
            }) => {
                assert_eq!(file_version, 999);
                assert_eq!(expected_version, STORAGE_SCHEMA_VERSION);
            }
            Err(e) => panic!("expected SchemaMismatch, got: {e}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("data");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join(STORAGE_FILE), b"{ not json").unwrap();
        assert!(matches!(FileStore::open(&path), Err(StoreError::Json(_))));
    }
}
