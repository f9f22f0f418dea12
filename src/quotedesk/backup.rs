//! # Snapshots
//!
//! A snapshot is a directory under `<root>/backups/` named after the moment it
//! was taken (`2025-03-01T09-30-12-042Z`), holding a copy of every managed
//! document that existed at that moment. Documents that do not exist yet are
//! skipped, so a snapshot may be partial; that is not an error.
//!
//! Snapshots only depend on file locations ([`DataPaths`]), never on the store's
//! logic, with one exception: [`restore_snapshot`] writes back through a
//! [`DocumentStore`] so the rolling `.backup` captures what was overwritten.
//!
//! Nothing here keeps timers. When to snapshot is decided by
//! [`crate::schedule`] and the commands that call in.

use crate::error::{QuoteDeskError, Result};
use crate::model::DocumentKind;
use crate::paths::DataPaths;
use crate::store::DocumentStore;
use crate::validation::{parse_document, DocumentPayload};
use chrono::{DateTime, Utc};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Attempts at `<name>-1`, `<name>-2`, ... when two snapshots share a millisecond.
const MAX_NAME_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotReport {
    pub name: String,
    pub path: PathBuf,
    pub copied: Vec<DocumentKind>,
    pub skipped: Vec<DocumentKind>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnapshotInfo {
    pub name: String,
    pub path: PathBuf,
    /// Modification time of the snapshot directory.
    pub date: DateTime<Utc>,
    /// Total bytes of the documents inside.
    pub size: u64,
}

pub fn snapshot_name(now: DateTime<Utc>) -> String {
    now.format("%Y-%m-%dT%H-%M-%S-%3fZ").to_string()
}

pub fn create_snapshot(paths: &DataPaths) -> Result<SnapshotReport> {
    create_snapshot_at(paths, Utc::now())
}

pub fn create_snapshot_at(paths: &DataPaths, now: DateTime<Utc>) -> Result<SnapshotReport> {
    let backups = paths.backups_dir();
    fs::create_dir_all(&backups).map_err(|source| QuoteDeskError::SnapshotFailed {
        path: backups.clone(),
        source,
    })?;

    let (name, dir) = reserve_snapshot_dir(paths, &snapshot_name(now))?;

    let mut copied = Vec::new();
    let mut skipped = Vec::new();
    for kind in DocumentKind::ALL {
        let source = paths.document(kind);
        match fs::copy(&source, dir.join(kind.file_name())) {
            Ok(_) => copied.push(kind),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(document = %kind, "not present, skipped in snapshot");
                skipped.push(kind);
            }
            Err(e) => {
                warn!(document = %kind, error = %e, "could not copy into snapshot");
                skipped.push(kind);
            }
        }
    }

    info!(snapshot = %dir.display(), copied = copied.len(), "snapshot created");
    Ok(SnapshotReport {
        name,
        path: dir,
        copied,
        skipped,
    })
}

fn reserve_snapshot_dir(paths: &DataPaths, base: &str) -> Result<(String, PathBuf)> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            base.to_string()
        } else {
            format!("{}-{}", base, attempt)
        };
        let dir = paths.snapshot_dir(&name);
        match fs::create_dir(&dir) {
            Ok(()) => return Ok((name, dir)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(QuoteDeskError::SnapshotFailed { path: dir, source }),
        }
    }
    Err(QuoteDeskError::SnapshotFailed {
        path: paths.snapshot_dir(base),
        source: io::Error::new(ErrorKind::AlreadyExists, "no free snapshot name"),
    })
}

/// Newest first. A missing backups directory means no snapshots.
pub fn list_snapshots(paths: &DataPaths) -> Result<Vec<SnapshotInfo>> {
    let entries = match fs::read_dir(paths.backups_dir()) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(QuoteDeskError::Io(e)),
    };

    let mut snapshots = Vec::new();
    for entry in entries {
        let entry = entry.map_err(QuoteDeskError::Io)?;
        let meta = entry.metadata().map_err(QuoteDeskError::Io)?;
        if !meta.is_dir() {
            continue;
        }
        let path = entry.path();
        let date: DateTime<Utc> = meta.modified().map_err(QuoteDeskError::Io)?.into();
        snapshots.push(SnapshotInfo {
            name: entry.file_name().to_string_lossy().to_string(),
            size: dir_size(&path)?,
            path,
            date,
        });
    }

    snapshots.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.name.cmp(&a.name)));
    Ok(snapshots)
}

pub fn latest_snapshot(paths: &DataPaths) -> Result<Option<SnapshotInfo>> {
    Ok(list_snapshots(paths)?.into_iter().next())
}

fn dir_size(dir: &Path) -> Result<u64> {
    let mut total = 0;
    for entry in fs::read_dir(dir).map_err(QuoteDeskError::Io)? {
        let meta = entry.map_err(QuoteDeskError::Io)?.metadata().map_err(QuoteDeskError::Io)?;
        if meta.is_file() {
            total += meta.len();
        }
    }
    Ok(total)
}

/// Directory of the snapshot called `name`.
pub fn find_snapshot(paths: &DataPaths, name: &str) -> Result<PathBuf> {
    // Names come from users; keep them to a single path component.
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(QuoteDeskError::Api(format!("Invalid snapshot name: {}", name)));
    }
    let dir = paths.snapshot_dir(name);
    if !dir.is_dir() {
        return Err(QuoteDeskError::NotFound(format!("snapshot {}", name)));
    }
    Ok(dir)
}

/// Delete all but the `keep` newest snapshots. Returns what was removed.
pub fn prune_snapshots(paths: &DataPaths, keep: usize) -> Result<Vec<SnapshotInfo>> {
    let mut removed = Vec::new();
    for snapshot in list_snapshots(paths)?.into_iter().skip(keep) {
        fs::remove_dir_all(&snapshot.path).map_err(QuoteDeskError::Io)?;
        info!(snapshot = %snapshot.name, "pruned");
        removed.push(snapshot);
    }
    Ok(removed)
}

/// Write a snapshot as `<out>`, a gzipped tarball rooted at `<name>/`.
pub fn archive_snapshot(paths: &DataPaths, name: &str, out: &Path) -> Result<PathBuf> {
    let dir = find_snapshot(paths, name)?;
    let file = File::create(out).map_err(QuoteDeskError::Io)?;
    let enc = GzEncoder::new(file, Compression::default());
    let mut tar = tar::Builder::new(enc);

    let mut files: Vec<PathBuf> = fs::read_dir(&dir)
        .map_err(QuoteDeskError::Io)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    for path in files {
        let Some(file_name) = path.file_name() else {
            continue;
        };
        let entry_name = Path::new(name).join(file_name);
        tar.append_path_with_name(&path, entry_name)
            .map_err(QuoteDeskError::Io)?;
    }

    tar.into_inner()
        .and_then(|enc| enc.finish())
        .map_err(QuoteDeskError::Io)?;
    info!(snapshot = %name, archive = %out.display(), "archived");
    Ok(out.to_path_buf())
}

/// Copy every document found in the snapshot back into the data root.
///
/// Content is validated like any other untrusted input, and nothing is written
/// unless every document in the snapshot parses.
pub fn restore_snapshot<S: DocumentStore>(
    store: &S,
    paths: &DataPaths,
    name: &str,
) -> Result<Vec<DocumentKind>> {
    let dir = find_snapshot(paths, name)?;

    let mut payloads = Vec::new();
    for kind in DocumentKind::ALL {
        let source = dir.join(kind.file_name());
        let raw = match fs::read_to_string(&source) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(QuoteDeskError::Io(e)),
        };
        payloads.push((kind, parse_document(kind, &raw)?));
    }

    let mut restored = Vec::with_capacity(payloads.len());
    for (kind, payload) in payloads {
        match payload {
            DocumentPayload::Quotes(quotes) => store.write(kind, &quotes)?,
            DocumentPayload::Products(products) => store.write(kind, &products)?,
            DocumentPayload::Clients(clients) => store.write(kind, &clients)?,
            DocumentPayload::Settings(settings) => store.write(kind, &settings)?,
            DocumentPayload::Analytics(map) => store.write(kind, &map)?,
        }
        restored.push(kind);
    }

    info!(snapshot = %name, documents = restored.len(), "restored");
    Ok(restored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Settings;
    use crate::store::fs::FileStore;
    use chrono::TimeZone;
    use flate2::read::GzDecoder;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn setup() -> (TempDir, DataPaths) {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path().join("data"));
        fs::create_dir_all(paths.root()).unwrap();
        (dir, paths)
    }

    #[test]
    fn name_is_sortable_timestamp() {
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 12).unwrap();
        assert_eq!(snapshot_name(at), "2025-03-01T09-30-12-000Z");
    }

    #[test]
    fn empty_root_still_produces_snapshot() {
        let (_dir, paths) = setup();
        let report = create_snapshot(&paths).unwrap();

        assert!(report.path.is_dir());
        assert!(report.copied.is_empty());
        assert_eq!(report.skipped.len(), DocumentKind::ALL.len());

        let listed = list_snapshots(&paths).unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].name, report.name);
        assert_eq!(listed[0].size, 0);
    }

    #[test]
    fn partial_snapshot_copies_only_existing_documents() {
        let (_dir, paths) = setup();
        let clients = "[\n  {\"id\": \"c1\"}\n]";
        fs::write(paths.document(DocumentKind::Clients), clients).unwrap();

        let report = create_snapshot(&paths).unwrap();
        assert_eq!(report.copied, vec![DocumentKind::Clients]);

        let files: Vec<_> = fs::read_dir(&report.path)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(files, vec!["clients.json".to_string()]);
        assert_eq!(
            fs::read_to_string(report.path.join("clients.json")).unwrap(),
            clients
        );

        let listed = list_snapshots(&paths).unwrap();
        assert!(listed[0].size > 0);
    }

    #[test]
    fn same_instant_gets_distinct_names() {
        let (_dir, paths) = setup();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 12).unwrap();
        let first = create_snapshot_at(&paths, at).unwrap();
        let second = create_snapshot_at(&paths, at).unwrap();
        assert_ne!(first.path, second.path);
        assert_eq!(second.name, format!("{}-1", first.name));
    }

    #[test]
    fn missing_backups_dir_lists_nothing() {
        let (_dir, paths) = setup();
        assert!(list_snapshots(&paths).unwrap().is_empty());
        assert!(latest_snapshot(&paths).unwrap().is_none());
    }

    #[test]
    fn listing_orders_by_modification_time_not_name() {
        let (_dir, paths) = setup();
        fs::create_dir_all(paths.snapshot_dir("b-older")).unwrap();
        sleep(Duration::from_millis(50));
        fs::create_dir_all(paths.snapshot_dir("a-newer")).unwrap();

        let names: Vec<_> = list_snapshots(&paths)
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["a-newer", "b-older"]);
    }

    #[test]
    fn stray_files_in_backups_are_ignored() {
        let (_dir, paths) = setup();
        create_snapshot(&paths).unwrap();
        fs::write(paths.backups_dir().join("notes.txt"), "hi").unwrap();
        assert_eq!(list_snapshots(&paths).unwrap().len(), 1);
    }

    #[test]
    fn prune_keeps_newest() {
        let (_dir, paths) = setup();
        for name in ["one", "two", "three"] {
            fs::create_dir_all(paths.snapshot_dir(name)).unwrap();
            sleep(Duration::from_millis(20));
        }

        let removed = prune_snapshots(&paths, 2).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].name, "one");
        assert!(!paths.snapshot_dir("one").exists());
        assert!(paths.snapshot_dir("three").exists());
    }

    #[test]
    fn archive_contains_snapshot_documents() {
        let (dir, paths) = setup();
        fs::write(paths.document(DocumentKind::Quotes), "[]").unwrap();
        let report = create_snapshot(&paths).unwrap();

        let out = dir.path().join("snap.tar.gz");
        archive_snapshot(&paths, &report.name, &out).unwrap();

        let mut archive = tar::Archive::new(GzDecoder::new(File::open(&out).unwrap()));
        let names: Vec<String> = archive
            .entries()
            .unwrap()
            .map(|e| e.unwrap().path().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec![format!("{}/quotes.json", report.name)]);
    }

    #[test]
    fn unknown_or_unsafe_names_are_rejected() {
        let (dir, paths) = setup();
        let out = dir.path().join("x.tar.gz");
        assert!(matches!(
            archive_snapshot(&paths, "nope", &out),
            Err(QuoteDeskError::NotFound(_))
        ));
        assert!(matches!(
            archive_snapshot(&paths, "../data", &out),
            Err(QuoteDeskError::Api(_))
        ));
    }

    #[test]
    fn restore_writes_back_through_store() {
        let (_dir, paths) = setup();
        let store = FileStore::new(paths.clone());
        let original = Settings::default();
        store.write(DocumentKind::Settings, &original).unwrap();
        let report = create_snapshot(&paths).unwrap();

        let mut changed = original.clone();
        changed.theme = "dark".into();
        store.write(DocumentKind::Settings, &changed).unwrap();

        let restored = restore_snapshot(&store, &paths, &report.name).unwrap();
        assert_eq!(restored, vec![DocumentKind::Settings]);

        let current: Settings = store.read(DocumentKind::Settings).unwrap().unwrap();
        assert_eq!(current, original);
    }

    #[test]
    fn snapshot_with_a_bad_document_restores_nothing() {
        let (_dir, paths) = setup();
        let store = FileStore::new(paths.clone());
        let name = create_snapshot(&paths).unwrap().name;
        let snapshot = paths.snapshot_dir(&name);
        fs::write(
            snapshot.join(DocumentKind::Clients.file_name()),
            r#"[{"id":"c1","name":"Rossi"}]"#,
        )
        .unwrap();
        fs::write(snapshot.join(DocumentKind::Settings.file_name()), "{broken").unwrap();

        let current = r#"[{"id":"c2","name":"Bianchi"}]"#;
        fs::write(paths.document(DocumentKind::Clients), current).unwrap();

        assert!(restore_snapshot(&store, &paths, &name).is_err());
        assert_eq!(
            fs::read_to_string(paths.document(DocumentKind::Clients)).unwrap(),
            current
        );
    }

    #[test]
    fn backups_path_taken_by_a_file_fails_the_snapshot() {
        let (_dir, paths) = setup();
        fs::write(paths.backups_dir(), "").unwrap();

        match create_snapshot(&paths) {
            Err(QuoteDeskError::SnapshotFailed { path, .. }) => assert_eq!(path, paths.backups_dir()),
            other => panic!("expected SnapshotFailed, got {:?}", other),
        }
    }
}
