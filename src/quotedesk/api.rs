//! # API Facade
//!
//! The single entry point for every quotedesk operation, whatever the UI.
//! It dispatches to `commands/*.rs` and hands back `Result<CmdResult>`; it
//! holds no business logic and never prints.
//!
//! `QuoteDeskApi<S: DocumentStore>` is generic over storage:
//! - Production: `QuoteDeskApi<FileStore>`
//! - Testing: `QuoteDeskApi<InMemoryStore>`
//!
//! Snapshot operations work on the data root's files directly, so they need
//! a real directory behind [`DataPaths`] even when the store is in memory.

use crate::assistant;
use crate::commands;
use crate::error::Result;
use crate::model::DocumentKind;
use crate::paths::DataPaths;
use crate::schedule::BackupPolicy;
use crate::store::DocumentStore;
use chrono::Utc;
use std::path::{Path, PathBuf};

pub struct QuoteDeskApi<S: DocumentStore> {
    store: S,
    paths: DataPaths,
    config_dir: PathBuf,
}

impl<S: DocumentStore> QuoteDeskApi<S> {
    pub fn new(store: S, paths: DataPaths, config_dir: PathBuf) -> Self {
        Self {
            store,
            paths,
            config_dir,
        }
    }

    pub fn paths(&self) -> &DataPaths {
        &self.paths
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn ensure_directories(&self) -> Result<()> {
        self.store.ensure_directories()
    }

    // --- documents ---

    pub fn load_document(&self, kind: DocumentKind) -> Result<commands::CmdResult> {
        commands::documents::load(&self.store, kind)
    }

    pub fn save_document(&self, kind: DocumentKind, raw: &str) -> Result<commands::CmdResult> {
        commands::documents::save(&self.store, kind, raw)
    }

    // --- snapshots ---

    pub fn create_backup(&self, retention: usize) -> Result<commands::CmdResult> {
        commands::backups::create(&self.paths, retention)
    }

    pub fn auto_backup(&self, policy: &BackupPolicy, retention: usize) -> Result<commands::CmdResult> {
        commands::backups::auto(&self.paths, policy, retention, Utc::now())
    }

    pub fn list_backups(&self) -> Result<commands::CmdResult> {
        commands::backups::list(&self.paths)
    }

    pub fn prune_backups(&self, keep: usize) -> Result<commands::CmdResult> {
        commands::backups::prune(&self.paths, keep)
    }

    pub fn archive_backup(&self, name: &str, out: Option<PathBuf>) -> Result<commands::CmdResult> {
        commands::backups::archive(&self.paths, name, out)
    }

    pub fn restore_backup(&self, name: &str) -> Result<commands::CmdResult> {
        commands::backups::restore(&self.store, &self.paths, name)
    }

    // --- settings and config ---

    pub fn show_settings(&self) -> Result<commands::CmdResult> {
        commands::settings::show(&self.store)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<commands::CmdResult> {
        commands::settings::set(&self.store, key, value)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.config_dir, action)
    }

    pub fn init(&self) -> Result<commands::CmdResult> {
        commands::init::run(&self.store)
    }

    // --- catalogs ---

    pub fn list_clients(&self) -> Result<commands::CmdResult> {
        commands::clients::list(&self.store)
    }

    pub fn add_client(&self, input: ClientInput) -> Result<commands::CmdResult> {
        commands::clients::add(&self.store, input)
    }

    pub fn update_client(&self, id: &str, update: ClientUpdate) -> Result<commands::CmdResult> {
        commands::clients::update(&self.store, id, update)
    }

    pub fn remove_client(&self, id: &str) -> Result<commands::CmdResult> {
        commands::clients::remove(&self.store, id)
    }

    pub fn list_products(&self) -> Result<commands::CmdResult> {
        commands::products::list(&self.store)
    }

    pub fn add_product(&self, input: ProductInput) -> Result<commands::CmdResult> {
        commands::products::add(&self.store, input)
    }

    pub fn update_product(&self, id: &str, update: ProductUpdate) -> Result<commands::CmdResult> {
        commands::products::update(&self.store, id, update)
    }

    pub fn remove_product(&self, id: &str) -> Result<commands::CmdResult> {
        commands::products::remove(&self.store, id)
    }

    // --- quotes ---

    pub fn list_quotes(&self) -> Result<commands::CmdResult> {
        commands::quotes::list(&self.store)
    }

    pub fn show_quote(&self, id: &str) -> Result<commands::CmdResult> {
        commands::quotes::show(&self.store, id)
    }

    pub fn create_quote(&self, draft: QuoteDraft) -> Result<commands::CmdResult> {
        commands::quotes::create(&self.store, draft)
    }

    pub fn remove_quote(&self, id: &str) -> Result<commands::CmdResult> {
        commands::quotes::remove(&self.store, id)
    }

    pub fn export_quote(&self, id: &str) -> Result<commands::CmdResult> {
        commands::export::run(&self.store, &self.paths, id)
    }

    // --- insight ---

    pub fn dashboard(&self) -> Result<commands::CmdResult> {
        commands::dashboard::run(&self.store)
    }

    pub fn ask(&self, prompt: &str) -> commands::CmdResult {
        let (intent, text) = assistant::ask(prompt);
        commands::CmdResult {
            answer: Some(commands::Answer { intent, text }),
            ..commands::CmdResult::default()
        }
    }
}

pub use crate::commands::clients::{ClientInput, ClientUpdate};
pub use crate::commands::config::ConfigAction;
pub use crate::commands::dashboard::Dashboard;
pub use crate::commands::products::{ProductInput, ProductUpdate};
pub use crate::commands::quotes::{LineInput, QuoteDraft};
pub use commands::{Answer, CmdMessage, CmdResult, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::Intent;
    use crate::store::memory::InMemoryStore;

    fn api() -> QuoteDeskApi<InMemoryStore> {
        QuoteDeskApi::new(
            InMemoryStore::new(),
            DataPaths::new("unused"),
            PathBuf::from("unused-config"),
        )
    }

    #[test]
    fn document_round_trip_goes_through_store() {
        let api = api();
        assert_eq!(api.save_document(DocumentKind::Clients, "[]").unwrap().saved, Some(true));
        assert!(api.load_document(DocumentKind::Clients).unwrap().document.is_some());
    }

    #[test]
    fn ask_returns_classified_answer() {
        let answer = api().ask("quale sconto applicare?").answer.unwrap();
        assert_eq!(answer.intent, Intent::Discount);
        assert!(!answer.text.is_empty());
    }
}
