//! Hour-partitioned activity log.
//!
//! Each clock hour gets its own file, `latest_csv_log_YYYY-MM-DD_HH.txt`, in
//! the log directory. Lines read `YYYY-MM-DD HH:MM:SS - <message>`. Whenever
//! a new partition is opened, files older than the retention window are
//! deleted from the directory.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use tempfile::NamedTempFile;
use thiserror::Error;
use transfer_logging::{transfer_debug, transfer_info, transfer_warn};

pub const DEFAULT_RETENTION: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const PARTITION_PREFIX: &str = "latest_csv_log_";
const PARTITION_SUFFIX: &str = ".txt";
const LINE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of "now" for partitioning and pruning.
pub type Clock = Arc<dyn Fn() -> DateTime<Local> + Send + Sync>;

#[derive(Debug, Error)]
pub enum LogStoreError {
    #[error("log directory {} is unusable: {source}", path.display())]
    Directory { path: PathBuf, source: io::Error },
    #[error("invalid log partition name: {0:?}")]
    InvalidPartition(String),
    #[error("log io error: {0}")]
    Io(#[from] io::Error),
}

/// Hourly partition key, `YYYY-MM-DD_HH`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartitionId(String);

impl PartitionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn file_name(&self) -> String {
        format!("{PARTITION_PREFIX}{}{PARTITION_SUFFIX}", self.0)
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn partition_for(now: &DateTime<Local>) -> PartitionId {
    PartitionId(now.format("%Y-%m-%d_%H").to_string())
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PruneReport {
    pub deleted: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

pub struct LogStore {
    dir: PathBuf,
    retention: Duration,
    clock: Clock,
    active: Option<PartitionId>,
}

impl fmt::Debug for LogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogStore")
            .field("dir", &self.dir)
            .field("retention", &self.retention)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl LogStore {
    /// Opens the store, creating `dir` if needed and checking it is writable.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LogStoreError> {
        let dir = dir.into();
        ensure_log_dir(&dir)?;
        Ok(Self {
            dir,
            retention: DEFAULT_RETENTION,
            clock: Arc::new(Local::now),
            active: None,
        })
    }

    pub fn with_retention(mut self, retention: Duration) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn active_partition(&self) -> Option<&PartitionId> {
        self.active.as_ref()
    }

    /// Appends a timestamped line to the current partition.
    ///
    /// Failures are reported through the diagnostic logger and otherwise
    /// swallowed.
    pub fn append(&mut self, message: &str) {
        if let Err(err) = self.try_append(message) {
            transfer_warn!("Failed to write to log: {}", err);
        }
    }

    fn try_append(&mut self, message: &str) -> Result<(), LogStoreError> {
        let now = (self.clock)();
        let partition = partition_for(&now);
        if self.active.as_ref() != Some(&partition) {
            self.roll_over(partition, &now)?;
        }
        self.write_line(&now, message)
    }

    fn roll_over(&mut self, partition: PartitionId, now: &DateTime<Local>) -> Result<(), LogStoreError> {
        let path = self.dir.join(partition.file_name());
        let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
        writeln!(file, "Log generated at {}", now.format(LINE_TIME_FORMAT))?;
        writeln!(file, "{}", "=".repeat(50))?;
        transfer_info!("Log partition {} opened at {:?}", partition, path);
        self.active = Some(partition);

        let report = self.prune();
        self.record_prune(now, &report)
    }

    /// Writes the outcome of a prune into the active partition.
    fn record_prune(&self, now: &DateTime<Local>, report: &PruneReport) -> Result<(), LogStoreError> {
        for deleted in &report.deleted {
            self.write_line(now, &format!("Deleted {}", file_label(deleted)))?;
        }
        for (failed, reason) in &report.failed {
            self.write_line(
                now,
                &format!("Error deleting file {}: {reason}", file_label(failed)),
            )?;
        }
        Ok(())
    }

    fn write_line(&self, now: &DateTime<Local>, message: &str) -> Result<(), LogStoreError> {
        let Some(partition) = &self.active else {
            return Ok(());
        };
        let path = self.dir.join(partition.file_name());
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        writeln!(file, "{} - {}", now.format(LINE_TIME_FORMAT), message)?;
        Ok(())
    }

    /// Deletes files older than the retention window, measured from the clock.
    pub fn prune(&self) -> PruneReport {
        self.prune_at(SystemTime::from((self.clock)()))
    }

    /// Deletes regular files in the log directory modified before `now - retention`.
    pub fn prune_at(&self, now: SystemTime) -> PruneReport {
        let mut report = PruneReport::default();
        let Some(cutoff) = now.checked_sub(self.retention) else {
            return report;
        };

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                transfer_warn!("Cannot list log directory {:?}: {}", self.dir, err);
                return report;
            }
        };

        for entry in entries.filter_map(|entry| entry.ok()) {
            let path = entry.path();
            let Ok(meta) = fs::metadata(&path) else {
                continue;
            };
            if !meta.is_file() {
                continue;
            }
            let Ok(modified) = meta.modified() else {
                continue;
            };
            if modified >= cutoff {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => {
                    transfer_info!("Deleted expired log file {:?}", path);
                    report.deleted.push(path);
                }
                Err(err) => {
                    transfer_warn!("Error deleting file {:?}: {}", path, err);
                    report.failed.push((path, err.to_string()));
                }
            }
        }
        report
    }

    /// Log file names, newest first by modification time.
    pub fn list_partitions(&self) -> Result<Vec<String>, LogStoreError> {
        let mut files: Vec<(SystemTime, String)> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let name = entry.file_name().into_string().ok()?;
                if !name.ends_with(PARTITION_SUFFIX) {
                    return None;
                }
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                Some((meta.modified().ok()?, name))
            })
            .collect();
        files.sort_by(|a, b| b.cmp(a));
        transfer_debug!("Found {} log file(s) in {:?}", files.len(), self.dir);
        Ok(files.into_iter().map(|(_, name)| name).collect())
    }

    /// Raw content of a log file returned by [`LogStore::list_partitions`].
    pub fn read_partition(&self, name: &str) -> Result<String, LogStoreError> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => {}
            _ => return Err(LogStoreError::InvalidPartition(name.to_string())),
        }
        Ok(fs::read_to_string(self.dir.join(name))?)
    }
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Creates `dir` if missing and probes that files can be created in it.
fn ensure_log_dir(dir: &Path) -> Result<(), LogStoreError> {
    let unusable = |source: io::Error| LogStoreError::Directory {
        path: dir.to_path_buf(),
        source,
    };
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(unusable)?;
        if !meta.is_dir() {
            return Err(unusable(io::Error::other("path is not a directory")));
        }
    } else {
        fs::create_dir_all(dir).map_err(unusable)?;
    }
    NamedTempFile::new_in(dir).map_err(unusable)?;
    Ok(())
}
