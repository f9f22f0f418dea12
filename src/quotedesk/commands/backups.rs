use super::{CmdMessage, CmdResult};
use crate::backup::{self, SnapshotInfo};
use crate::error::{QuoteDeskError, Result};
use crate::paths::DataPaths;
use crate::schedule::{is_due, BackupPolicy};
use crate::store::DocumentStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Scripted reply for `backup create --json`.
#[derive(Debug, Serialize)]
pub struct CreateReply {
    pub success: bool,
    pub path: Option<PathBuf>,
}

impl CreateReply {
    pub fn from_outcome(outcome: &Result<CmdResult>) -> Self {
        let path = match outcome {
            Ok(result) => result.snapshot.as_ref().map(|report| report.path.clone()),
            Err(_) => None,
        };
        CreateReply {
            success: path.is_some(),
            path,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListReply {
    pub success: bool,
    pub backups: Vec<SnapshotInfo>,
}

impl ListReply {
    pub fn from_outcome(outcome: &Result<CmdResult>) -> Self {
        match outcome {
            Ok(result) => ListReply {
                success: true,
                backups: result.snapshots.clone(),
            },
            Err(_) => ListReply {
                success: false,
                backups: Vec::new(),
            },
        }
    }
}

fn kind_list(kinds: &[crate::model::DocumentKind]) -> String {
    kinds.iter().map(|k| k.name()).collect::<Vec<_>>().join(", ")
}

fn prune_into(paths: &DataPaths, retention: usize, result: &mut CmdResult) -> Result<()> {
    if retention == 0 {
        return Ok(());
    }
    let removed = backup::prune_snapshots(paths, retention)?;
    if !removed.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Pruned {} old snapshot(s), keeping {}",
            removed.len(),
            retention
        )));
    }
    Ok(())
}

/// Take a snapshot now. `retention` of 0 keeps every snapshot.
pub fn create(paths: &DataPaths, retention: usize) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let report = backup::create_snapshot(paths)?;

    result.add_message(CmdMessage::success(format!(
        "Snapshot created: {}",
        report.path.display()
    )));
    if !report.skipped.is_empty() {
        result.add_message(CmdMessage::info(format!(
            "Not present yet, skipped: {}",
            kind_list(&report.skipped)
        )));
    }
    result.snapshot = Some(report);
    prune_into(paths, retention, &mut result)?;
    Ok(result)
}

/// Snapshot only if the newest one is older than the policy interval.
pub fn auto(
    paths: &DataPaths,
    policy: &BackupPolicy,
    retention: usize,
    now: DateTime<Utc>,
) -> Result<CmdResult> {
    let last = backup::latest_snapshot(paths)?.map(|s| s.date);
    if !is_due(policy, last, now) {
        return Ok(CmdResult::default());
    }
    let mut result = CmdResult::default();
    let report = backup::create_snapshot(paths)?;
    result.add_message(CmdMessage::info(format!(
        "Automatic snapshot: {}",
        report.name
    )));
    result.snapshot = Some(report);
    prune_into(paths, retention, &mut result)?;
    Ok(result)
}

pub fn list(paths: &DataPaths) -> Result<CmdResult> {
    let snapshots = backup::list_snapshots(paths)?;
    let mut result = CmdResult::default();
    if snapshots.is_empty() {
        result.add_message(CmdMessage::info("No snapshots yet."));
    }
    Ok(result.with_snapshots(snapshots))
}

pub fn prune(paths: &DataPaths, keep: usize) -> Result<CmdResult> {
    if keep == 0 {
        return Err(QuoteDeskError::Api("Refusing to prune every snapshot; keep at least one".into()));
    }
    let removed = backup::prune_snapshots(paths, keep)?;
    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Removed {} snapshot(s), {} kept",
        removed.len(),
        keep
    )));
    Ok(result.with_snapshots(removed))
}

/// Archive to `out`, or to `reports/<name>.tar.gz`.
pub fn archive(paths: &DataPaths, name: &str, out: Option<PathBuf>) -> Result<CmdResult> {
    let out = match out {
        Some(out) => out,
        None => {
            let reports = paths.reports_dir();
            fs::create_dir_all(&reports)?;
            reports.join(format!("{}.tar.gz", name))
        }
    };
    let written = backup::archive_snapshot(paths, name, &out)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!("Archived to {}", written.display())));
    Ok(result.with_paths(vec![written]))
}

/// Restore a snapshot, taking a fresh one of the current state first.
pub fn restore<S: DocumentStore>(store: &S, paths: &DataPaths, name: &str) -> Result<CmdResult> {
    // Fail on a bad name before snapshotting anything.
    backup::find_snapshot(paths, name)?;
    let safety = backup::create_snapshot(paths)?;
    let restored = backup::restore_snapshot(store, paths, name)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::info(format!(
        "Current data saved first as snapshot {}",
        safety.name
    )));
    result.add_message(CmdMessage::success(format!(
        "Restored {} from {}",
        kind_list(&restored),
        name
    )));
    result.snapshot = Some(safety);
    Ok(result)
}
