use crate::error::{QuoteDeskError, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_ROOT_DIRNAME: &str = "Quotedesk";
const DEFAULT_RETENTION: usize = 30;
const DEFAULT_STARTUP_DELAY_SECS: u64 = 2;

/// Overrides the directory `config.json` is read from.
pub const CONFIG_DIR_ENV: &str = "QUOTEDESK_CONFIG_DIR";
/// Overrides the data root (beaten only by `--root`).
pub const DATA_ROOT_ENV: &str = "QUOTEDESK_HOME";

pub const KEYS: [&str; 3] = ["data-root", "snapshot-retention", "startup-delay"];

/// Application configuration, stored as config.json in the OS config dir.
///
/// This is about where and how quotedesk runs. What the user sees in the
/// quoting UI (currency, company profile) lives in the settings document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Where documents live; `None` means `~/Quotedesk`
    #[serde(default)]
    pub data_root: Option<PathBuf>,

    /// Snapshots to keep after each automatic snapshot (0 keeps all)
    #[serde(default = "default_retention")]
    pub snapshot_retention: usize,

    /// Seconds `watch` waits before its first snapshot
    #[serde(default = "default_startup_delay")]
    pub startup_delay_secs: u64,
}

fn default_retention() -> usize {
    DEFAULT_RETENTION
}

fn default_startup_delay() -> u64 {
    DEFAULT_STARTUP_DELAY_SECS
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_root: None,
            snapshot_retention: DEFAULT_RETENTION,
            startup_delay_secs: DEFAULT_STARTUP_DELAY_SECS,
        }
    }
}

impl AppConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(QuoteDeskError::Io)?;
        let config: AppConfig =
            serde_json::from_str(&content).map_err(|source| QuoteDeskError::CorruptData {
                path: config_path,
                source,
            })?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(QuoteDeskError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(QuoteDeskError::Serialization)?;
        fs::write(config_path, content).map_err(QuoteDeskError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "data-root" => Some(
                self.data_root
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| "(default)".to_string()),
            ),
            "snapshot-retention" => Some(self.snapshot_retention.to_string()),
            "startup-delay" => Some(self.startup_delay_secs.to_string()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "data-root" => {
                let value = value.trim();
                self.data_root = if value.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }
            "snapshot-retention" => {
                self.snapshot_retention = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("snapshot-retention must be a whole number, got '{}'", value))?;
            }
            "startup-delay" => {
                self.startup_delay_secs = value
                    .trim()
                    .parse()
                    .map_err(|_| format!("startup-delay must be whole seconds, got '{}'", value))?;
            }
            other => {
                return Err(format!(
                    "Unknown config key: {} (known: {})",
                    other,
                    KEYS.join(", ")
                ))
            }
        }
        Ok(())
    }
}

/// `$QUOTEDESK_CONFIG_DIR`, else the platform config dir.
pub fn config_dir(env_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = env_override {
        return Ok(dir);
    }
    ProjectDirs::from("com", "quotedesk", "quotedesk")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| QuoteDeskError::Store("Could not determine config dir".to_string()))
}

/// Data root precedence: `--root`, `$QUOTEDESK_HOME`, config, `~/Quotedesk`.
pub fn resolve_data_root(
    flag: Option<PathBuf>,
    env_home: Option<PathBuf>,
    config: &AppConfig,
) -> Result<PathBuf> {
    if let Some(root) = flag.or(env_home).or_else(|| config.data_root.clone()) {
        return Ok(root);
    }
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(DEFAULT_ROOT_DIRNAME))
        .ok_or_else(|| QuoteDeskError::Store("Could not determine home directory".to_string()))
}
