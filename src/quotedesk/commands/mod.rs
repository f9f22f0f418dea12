use crate::assistant::Intent;
use crate::backup::{SnapshotInfo, SnapshotReport};
use crate::config::AppConfig;
use crate::model::{Client, Product, Quote, Settings};
use serde_json::Value;
use std::path::PathBuf;

pub mod backups;
pub mod clients;
pub mod config;
pub mod dashboard;
pub mod documents;
pub mod export;
pub mod helpers;
pub mod init;
pub mod products;
pub mod quotes;
pub mod settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct CmdMessage {
    pub level: MessageLevel,
    pub content: String,
}

impl CmdMessage {
    pub fn info(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Info,
            content: content.into(),
        }
    }

    pub fn success(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Success,
            content: content.into(),
        }
    }

    pub fn warning(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Warning,
            content: content.into(),
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            level: MessageLevel::Error,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answer {
    pub intent: Intent,
    pub text: &'static str,
}

#[derive(Debug, Default)]
pub struct CmdResult {
    /// A whole document as loaded, defaults applied.
    pub document: Option<Value>,
    /// `Some(false)` when a save was attempted and did not reach the disk.
    pub saved: Option<bool>,
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
    pub quotes: Vec<Quote>,
    pub settings: Option<Settings>,
    pub snapshot: Option<SnapshotReport>,
    pub snapshots: Vec<SnapshotInfo>,
    pub dashboard: Option<dashboard::Dashboard>,
    pub answer: Option<Answer>,
    pub config: Option<AppConfig>,
    pub paths: Vec<PathBuf>,
    pub messages: Vec<CmdMessage>,
}

impl CmdResult {
    pub fn add_message(&mut self, message: CmdMessage) {
        self.messages.push(message);
    }

    pub fn with_document(mut self, document: Value) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_clients(mut self, clients: Vec<Client>) -> Self {
        self.clients = clients;
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn with_quotes(mut self, quotes: Vec<Quote>) -> Self {
        self.quotes = quotes;
        self
    }

    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn with_snapshots(mut self, snapshots: Vec<SnapshotInfo>) -> Self {
        self.snapshots = snapshots;
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = paths;
        self
    }

    pub fn has_errors(&self) -> bool {
        self.messages.iter().any(|m| m.level == MessageLevel::Error)
    }
}
