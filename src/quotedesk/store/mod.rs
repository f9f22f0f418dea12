//! # Storage Layer
//!
//! This module defines the storage abstraction for quotedesk. The
//! [`DocumentStore`] trait lets the command layer work with different backends.
//!
//! ## Documents, Not Records
//!
//! The store deals in whole documents: one JSON file per [`DocumentKind`].
//! It never merges, diffs or inspects contents. Every save is a full
//! overwrite and every load parses the whole file.
//!
//! ## Read Semantics
//!
//! `read` distinguishes three outcomes so callers can decide what to show:
//! - `Ok(Some(value))`: the document parsed.
//! - `Ok(None)`: the file does not exist yet. Callers substitute a default.
//! - `Err(CorruptData)`: the file exists but is not valid JSON for the type.
//!
//! Any other I/O failure surfaces as `Err(Io)`.
//!
//! ## Write Semantics
//!
//! Before a document is replaced, the current file is copied to
//! `<file>.backup`. That copy is best-effort: a missing file (the first save)
//! or a failed copy never blocks the write. The replacement itself goes
//! through a temp file and a rename, so readers see either the old or the new
//! document, never half of one.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: Production storage under a data root.
//! - [`memory::InMemoryStore`]: For testing command logic without a filesystem.
//!
//! ## Storage Layout
//!
//! ```text
//! <root>/
//! ├── quotes.json
//! ├── quotes.json.backup      # previous generation, rolled on every save
//! ├── products.json
//! ├── clients.json
//! ├── settings.json
//! ├── analytics.json
//! ├── reports/                # exported quote documents
//! └── backups/<timestamp>/    # snapshots, see crate::backup
//! ```

use crate::error::Result;
use crate::model::DocumentKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::PathBuf;

pub mod fs;
pub mod memory;

/// Abstract interface for document storage.
pub trait DocumentStore {
    /// Create the data root and the reports directory if missing.
    fn ensure_directories(&self) -> Result<()>;

    /// Load a document. `Ok(None)` means it was never written.
    fn read<T: DeserializeOwned>(&self, kind: DocumentKind) -> Result<Option<T>>;

    /// Replace a document, rolling the previous content into `<file>.backup`.
    fn write<T: Serialize>(&self, kind: DocumentKind, value: &T) -> Result<()>;

    /// Where the document lives (virtual for in-memory stores).
    fn document_path(&self, kind: DocumentKind) -> PathBuf;
}
