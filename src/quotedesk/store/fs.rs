use super::DocumentStore;
use crate::error::{QuoteDeskError, Result};
use crate::model::DocumentKind;
use crate::paths::{rolling_backup_path, DataPaths};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub struct FileStore {
    paths: DataPaths,
    /// One lock per document path; held across the backup copy and the replace.
    write_locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FileStore {
    pub fn new(paths: DataPaths) -> Self {
        Self {
            paths,
            write_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    fn lock_for(&self, path: &Path) -> Arc<Mutex<()>> {
        let mut locks = self
            .write_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        locks.entry(path.to_path_buf()).or_default().clone()
    }

    fn ensure_dir(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path).map_err(QuoteDeskError::Io)?;
        }
        Ok(())
    }

    /// Copy the current file aside. Never fails the caller.
    fn roll_backup(&self, path: &Path) {
        let backup = rolling_backup_path(path);
        match fs::copy(path, &backup) {
            Ok(_) => debug!(backup = %backup.display(), "rolled previous document"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => warn!(
                path = %path.display(),
                error = %e,
                "could not roll backup, writing anyway"
            ),
        }
    }
}

impl DocumentStore for FileStore {
    fn ensure_directories(&self) -> Result<()> {
        self.ensure_dir(self.paths.root())?;
        self.ensure_dir(&self.paths.reports_dir())?;
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, kind: DocumentKind) -> Result<Option<T>> {
        let path = self.paths.document(kind);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(document = %kind, "no file yet");
                return Ok(None);
            }
            Err(e) => return Err(QuoteDeskError::Io(e)),
        };

        let value = serde_json::from_str(&content)
            .map_err(|source| QuoteDeskError::CorruptData { path, source })?;
        debug!(document = %kind, bytes = content.len(), "loaded");
        Ok(Some(value))
    }

    fn write<T: Serialize>(&self, kind: DocumentKind, value: &T) -> Result<()> {
        let path = self.paths.document(kind);
        let root = self.paths.root();

        // Serialize first so a bad value never touches the disk.
        let content = serde_json::to_string_pretty(value).map_err(QuoteDeskError::Serialization)?;

        let lock = self.lock_for(&path);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        self.ensure_dir(root)?;
        self.roll_backup(&path);

        let tmp_file = root.join(format!(".{}-{}.tmp", kind.name(), Uuid::new_v4()));
        fs::write(&tmp_file, content).map_err(QuoteDeskError::Io)?;
        if let Err(e) = fs::rename(&tmp_file, &path) {
            let _ = fs::remove_file(&tmp_file);
            return Err(QuoteDeskError::Io(e));
        }

        info!(document = %kind, path = %path.display(), "saved");
        Ok(())
    }

    fn document_path(&self, kind: DocumentKind) -> PathBuf {
        self.paths.document(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Settings;
    use serde_json::{json, Value};
    use std::thread;
    use tempfile::TempDir;

    fn setup() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(DataPaths::new(dir.path().join("data")));
        (dir, store)
    }

    #[test]
    fn ensure_directories_is_idempotent() {
        let (_dir, store) = setup();
        store.ensure_directories().unwrap();
        store.ensure_directories().unwrap();
        assert!(store.paths().root().is_dir());
        assert!(store.paths().reports_dir().is_dir());
    }

    #[test]
    fn read_missing_document_is_none() {
        let (_dir, store) = setup();
        let quotes: Option<Vec<Value>> = store.read(DocumentKind::Quotes).unwrap();
        assert!(quotes.is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let (_dir, store) = setup();
        let doc = json!([{"id": "p1", "code": "A-1", "unitPrice": 12.5}]);
        store.write(DocumentKind::Products, &doc).unwrap();

        let loaded: Value = store.read(DocumentKind::Products).unwrap().unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn write_creates_missing_root() {
        let (_dir, store) = setup();
        assert!(!store.paths().root().exists());
        store.write(DocumentKind::Settings, &Settings::default()).unwrap();
        assert!(store.document_path(DocumentKind::Settings).is_file());
    }

    #[test]
    fn second_write_rolls_first_into_backup() {
        let (_dir, store) = setup();
        store.write(DocumentKind::Quotes, &json!([])).unwrap();
        store
            .write(DocumentKind::Quotes, &json!([{"id": "q1", "total": 100}]))
            .unwrap();

        let current: Value = store.read(DocumentKind::Quotes).unwrap().unwrap();
        assert_eq!(current, json!([{"id": "q1", "total": 100}]));

        let backup_path = rolling_backup_path(&store.document_path(DocumentKind::Quotes));
        let backup: Value = serde_json::from_str(&fs::read_to_string(backup_path).unwrap()).unwrap();
        assert_eq!(backup, json!([]));
    }

    #[test]
    fn first_write_leaves_no_backup() {
        let (_dir, store) = setup();
        store.write(DocumentKind::Clients, &json!([])).unwrap();
        let backup_path = rolling_backup_path(&store.document_path(DocumentKind::Clients));
        assert!(!backup_path.exists());
    }

    #[test]
    fn output_is_two_space_pretty_json() {
        let (_dir, store) = setup();
        store.write(DocumentKind::Analytics, &json!({"a": 1})).unwrap();
        let raw = fs::read_to_string(store.document_path(DocumentKind::Analytics)).unwrap();
        assert_eq!(raw, "{\n  \"a\": 1\n}");
    }

    #[test]
    fn corrupt_file_is_reported_as_corrupt() {
        let (_dir, store) = setup();
        store.ensure_directories().unwrap();
        fs::write(store.document_path(DocumentKind::Clients), "{not json").unwrap();

        let err = store.read::<Vec<Value>>(DocumentKind::Clients).unwrap_err();
        assert!(matches!(err, QuoteDeskError::CorruptData { .. }));
    }

    #[test]
    fn no_temp_files_left_behind() {
        let (_dir, store) = setup();
        store.write(DocumentKind::Quotes, &json!([1, 2, 3])).unwrap();
        for entry in fs::read_dir(store.paths().root()).unwrap() {
            let name = entry.unwrap().file_name().to_string_lossy().to_string();
            assert!(!name.ends_with(".tmp"), "leftover tmp file: {}", name);
        }
    }

    #[test]
    fn concurrent_writers_leave_a_valid_document_and_backup() {
        let (_dir, store) = setup();
        let store = Arc::new(store);
        store.write(DocumentKind::Quotes, &json!([])).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    store
                        .write(DocumentKind::Quotes, &json!([{"id": format!("q{}", i)}]))
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let current: Value = store.read(DocumentKind::Quotes).unwrap().unwrap();
        assert_eq!(current.as_array().unwrap().len(), 1);
        let backup_path = rolling_backup_path(&store.document_path(DocumentKind::Quotes));
        let backup: Value = serde_json::from_str(&fs::read_to_string(backup_path).unwrap()).unwrap();
        assert!(backup.is_array());
    }
}
