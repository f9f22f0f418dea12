//! When to take snapshots.
//!
//! [`is_due`] is the pure trigger rule shared by the `watch` loop and by the
//! CLI, which checks it after every mutating command. [`Watcher`] is the
//! blocking loop: a snapshot after a short startup delay, one per interval
//! while running, and a last one on shutdown.

use crate::backup;
use crate::model::BackupSettings;
use crate::paths::DataPaths;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{error, info};

const SECS_PER_HOUR: u64 = 60 * 60;
const DEFAULT_TICK: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackupPolicy {
    pub enabled: bool,
    pub interval: Duration,
    pub startup_delay: Duration,
}

impl BackupPolicy {
    pub fn from_settings(settings: &BackupSettings, startup_delay: Duration) -> Self {
        Self {
            enabled: settings.auto_backup,
            interval: Duration::from_secs(u64::from(settings.interval.max(1)) * SECS_PER_HOUR),
            startup_delay,
        }
    }
}

/// True when automatic snapshots are on and the newest one (if any) is at
/// least one interval old.
pub fn is_due(policy: &BackupPolicy, last_snapshot: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    if !policy.enabled {
        return false;
    }
    let Some(last) = last_snapshot else {
        return true;
    };
    match chrono::Duration::from_std(policy.interval) {
        Ok(interval) => now.signed_duration_since(last) >= interval,
        Err(_) => false,
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WatchSummary {
    pub taken: Vec<String>,
    pub failed: usize,
    pub pruned: usize,
}

pub struct Watcher {
    paths: DataPaths,
    policy: BackupPolicy,
    retention: usize,
    tick: Duration,
}

impl Watcher {
    /// `retention` of 0 keeps every snapshot.
    pub fn new(paths: DataPaths, policy: BackupPolicy, retention: usize) -> Self {
        Self {
            paths,
            policy,
            retention,
            tick: DEFAULT_TICK,
        }
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Block until `stop` is set. Snapshot failures are logged and counted,
    /// they never end the loop.
    pub fn run(&self, stop: &AtomicBool) -> WatchSummary {
        let mut summary = WatchSummary::default();
        info!(
            root = %self.paths.root().display(),
            interval_secs = self.policy.interval.as_secs(),
            enabled = self.policy.enabled,
            "watching"
        );

        if self.sleep_unless_stopped(self.policy.startup_delay, stop) {
            self.snapshot(&mut summary);
        }

        let mut last = Instant::now();
        while !stop.load(Ordering::SeqCst) {
            if self.policy.enabled && last.elapsed() >= self.policy.interval {
                self.snapshot(&mut summary);
                last = Instant::now();
            }
            thread::sleep(self.tick);
        }

        info!("stopping, taking final snapshot");
        self.snapshot(&mut summary);
        summary
    }

    /// Returns false if `stop` was raised before `delay` elapsed.
    fn sleep_unless_stopped(&self, delay: Duration, stop: &AtomicBool) -> bool {
        let started = Instant::now();
        while started.elapsed() < delay {
            if stop.load(Ordering::SeqCst) {
                return false;
            }
            thread::sleep(self.tick.min(delay.saturating_sub(started.elapsed())));
        }
        !stop.load(Ordering::SeqCst)
    }

    fn snapshot(&self, summary: &mut WatchSummary) {
        match backup::create_snapshot(&self.paths) {
            Ok(report) => summary.taken.push(report.name),
            Err(e) => {
                error!(error = %e, "automatic snapshot failed");
                summary.failed += 1;
                return;
            }
        }
        if self.retention > 0 {
            match backup::prune_snapshots(&self.paths, self.retention) {
                Ok(removed) => summary.pruned += removed.len(),
                Err(e) => error!(error = %e, "pruning snapshots failed"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn policy(hours: u32) -> BackupPolicy {
        BackupPolicy::from_settings(
            &BackupSettings {
                auto_backup: true,
                interval: hours,
            },
            Duration::ZERO,
        )
    }

    #[test]
    fn due_when_no_snapshot_exists() {
        assert!(is_due(&policy(24), None, Utc::now()));
    }

    #[test]
    fn due_only_after_interval() {
        let last = Utc.with_ymd_and_hms(2025, 3, 1, 8, 0, 0).unwrap();
        let p = policy(24);
        assert!(!is_due(&p, Some(last), last + chrono::Duration::hours(23)));
        assert!(is_due(&p, Some(last), last + chrono::Duration::hours(24)));
    }

    #[test]
    fn never_due_when_disabled() {
        let mut p = policy(1);
        p.enabled = false;
        assert!(!is_due(&p, None, Utc::now()));
    }

    #[test]
    fn zero_hour_interval_is_treated_as_one() {
        assert_eq!(policy(0).interval, Duration::from_secs(3600));
    }

    #[test]
    fn watcher_takes_startup_and_final_snapshots() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let watcher = Watcher::new(paths.clone(), policy(24), 0).with_tick(Duration::from_millis(5));

        let stop = Arc::new(AtomicBool::new(false));
        let stopper = {
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(50));
                stop.store(true, Ordering::SeqCst);
            })
        };

        let summary = watcher.run(&stop);
        stopper.join().unwrap();

        assert_eq!(summary.taken.len(), 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(backup::list_snapshots(&paths).unwrap().len(), 2);
    }

    #[test]
    fn stop_during_startup_delay_still_takes_final_snapshot() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        let mut p = policy(24);
        p.startup_delay = Duration::from_secs(60);
        let watcher = Watcher::new(paths, p, 0).with_tick(Duration::from_millis(5));

        let stop = AtomicBool::new(true);
        let summary = watcher.run(&stop);
        assert_eq!(summary.taken.len(), 1);
    }

    #[test]
    fn retention_prunes_after_each_snapshot() {
        let dir = TempDir::new().unwrap();
        let paths = DataPaths::new(dir.path());
        for name in ["old-1", "old-2"] {
            std::fs::create_dir_all(paths.snapshot_dir(name)).unwrap();
        }
        thread::sleep(Duration::from_millis(20));
        let watcher = Watcher::new(paths.clone(), policy(24), 1).with_tick(Duration::from_millis(5));

        let summary = watcher.run(&AtomicBool::new(true));
        assert_eq!(summary.taken.len(), 1);
        assert_eq!(backup::list_snapshots(&paths).unwrap().len(), 1);
        assert_eq!(summary.pruned, 2);
    }
}
