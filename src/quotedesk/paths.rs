use crate::model::DocumentKind;
use std::path::{Path, PathBuf};

const REPORTS_DIR: &str = "reports";
const BACKUPS_DIR: &str = "backups";
const ROLLING_SUFFIX: &str = ".backup";

/// Fixed file locations under a single data root.
///
/// ```text
/// <root>/quotes.json
/// <root>/products.json
/// <root>/clients.json
/// <root>/settings.json
/// <root>/analytics.json
/// <root>/reports/
/// <root>/backups/<timestamp>/<kind>.json
/// <root>/<kind>.json.backup
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    root: PathBuf,
}

impl DataPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.join(REPORTS_DIR)
    }

    pub fn backups_dir(&self) -> PathBuf {
        self.root.join(BACKUPS_DIR)
    }

    pub fn document(&self, kind: DocumentKind) -> PathBuf {
        self.root.join(kind.file_name())
    }

    pub fn snapshot_dir(&self, name: &str) -> PathBuf {
        self.backups_dir().join(name)
    }
}

/// `<file>.backup`, next to the document it shadows.
pub fn rolling_backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(ROLLING_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_rooted() {
        let paths = DataPaths::new("/data");
        assert_eq!(
            paths.document(DocumentKind::Quotes),
            PathBuf::from("/data/quotes.json")
        );
        assert_eq!(paths.reports_dir(), PathBuf::from("/data/reports"));
        assert_eq!(
            paths.snapshot_dir("2025-01-01T00-00-00-000Z"),
            PathBuf::from("/data/backups/2025-01-01T00-00-00-000Z")
        );
    }

    #[test]
    fn rolling_backup_appends_suffix() {
        assert_eq!(
            rolling_backup_path(Path::new("/data/clients.json")),
            PathBuf::from("/data/clients.json.backup")
        );
    }
}
