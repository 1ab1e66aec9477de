/// Run tally and the JSON run report.
///
/// The tally is the only state shared between files during a run. When
/// asked to, the finished report is written as pretty-printed JSON; it is
/// never read back.
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One file that reached the `Placed` state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: String,
    pub color: String,
}

/// One file that reached the `Failed` state, or a skipped subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureEntry {
    pub path: PathBuf,
    pub reason: String,
}

/// Counters and outcomes of a single invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RunTally {
    /// Files moved (or, in a dry run, planned).
    pub moved: usize,
    pub by_category: BTreeMap<String, usize>,
    pub placed: Vec<PlacedEntry>,
    pub failures: Vec<FailureEntry>,
    pub skipped_dirs: Vec<FailureEntry>,
}

impl RunTally {
    pub fn record_placed(&mut self, entry: PlacedEntry) {
        self.moved += 1;
        *self.by_category.entry(entry.category.clone()).or_insert(0) += 1;
        self.placed.push(entry);
    }

    pub fn record_failure(&mut self, path: &Path, reason: String) {
        self.failures.push(FailureEntry {
            path: path.to_path_buf(),
            reason,
        });
    }

    pub fn record_skipped_dir(&mut self, path: &Path, reason: String) {
        self.skipped_dirs.push(FailureEntry {
            path: path.to_path_buf(),
            reason,
        });
    }
}

/// Summary of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub dry_run: bool,
    #[serde(flatten)]
    pub tally: RunTally,
}

impl RunReport {
    pub fn moved(&self) -> usize {
        self.tally.moved
    }

    /// Saves the report as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)
    }
}
