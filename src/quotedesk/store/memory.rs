use super::DocumentStore;
use crate::error::{QuoteDeskError, Result};
use crate::model::DocumentKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

/// In-memory document storage for testing.
///
/// Documents are kept serialized, so reads go through the same JSON parsing
/// as the file store and corrupt content can be injected with [`Self::insert_raw`].
#[derive(Default)]
pub struct InMemoryStore {
    documents: RefCell<HashMap<DocumentKind, String>>,
    backups: RefCell<HashMap<DocumentKind, String>>,
    simulate_write_error: RefCell<bool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write fail, as a full disk would.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        *self.simulate_write_error.borrow_mut() = simulate;
    }

    /// Store raw text as a document, bypassing serialization.
    pub fn insert_raw(&self, kind: DocumentKind, raw: &str) {
        self.documents.borrow_mut().insert(kind, raw.to_string());
    }

    pub fn raw(&self, kind: DocumentKind) -> Option<String> {
        self.documents.borrow().get(&kind).cloned()
    }

    pub fn rolling_backup(&self, kind: DocumentKind) -> Option<String> {
        self.backups.borrow().get(&kind).cloned()
    }
}

impl DocumentStore for InMemoryStore {
    fn ensure_directories(&self) -> Result<()> {
        Ok(())
    }

    fn read<T: DeserializeOwned>(&self, kind: DocumentKind) -> Result<Option<T>> {
        match self.documents.borrow().get(&kind) {
            Some(raw) => serde_json::from_str(raw)
                .map(Some)
                .map_err(|source| QuoteDeskError::CorruptData {
                    path: self.document_path(kind),
                    source,
                }),
            None => Ok(None),
        }
    }

    fn write<T: Serialize>(&self, kind: DocumentKind, value: &T) -> Result<()> {
        if *self.simulate_write_error.borrow() {
            return Err(QuoteDeskError::Io(io::Error::other("simulated write failure")));
        }
        let content = serde_json::to_string_pretty(value)?;
        let previous = self.documents.borrow_mut().insert(kind, content);
        if let Some(previous) = previous {
            self.backups.borrow_mut().insert(kind, previous);
        }
        Ok(())
    }

    fn document_path(&self, kind: DocumentKind) -> PathBuf {
        PathBuf::from("memory").join(kind.file_name())
    }
}
