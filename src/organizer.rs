//! The organize pipeline.
//!
//! Each discovered file goes through `Discovered -> Normalized -> Classified`
//! and ends in either `Placed` or `Failed`. A failed file never stops the
//! run; only an unusable source or destination root does.

use crate::classifier::Classifier;
use crate::config::{ConfigError, Settings};
use crate::normalizer::NameNormalizer;
use crate::placer::{PlaceError, Placement, Placer};
use crate::report::{PlacedEntry, RunReport, RunTally};
use crate::walker::{DiscoveredFile, TreeWalker, WalkError, WalkResult, check_root};
use chrono::Utc;
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Whether files are moved or only planned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Execute,
    DryRun,
}

/// Position of a file in the per-file state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileState {
    Discovered,
    Normalized,
    Classified,
    Placed,
    Failed,
}

impl FileState {
    pub fn is_terminal(self) -> bool {
        matches!(self, FileState::Placed | FileState::Failed)
    }
}

/// Everything known about one file during its iteration.
#[derive(Debug, Clone)]
pub struct FileRecord {
    pub source: PathBuf,
    pub raw_name: String,
    pub normalized_name: String,
    pub category: String,
    pub color: String,
    pub destination: Option<PathBuf>,
    /// `category/color/name` below the destination root.
    pub relative_destination: Option<PathBuf>,
    pub state: FileState,
}

impl FileRecord {
    pub fn discovered(file: DiscoveredFile) -> Self {
        Self {
            source: file.path,
            raw_name: file.file_name,
            normalized_name: String::new(),
            category: String::new(),
            color: String::new(),
            destination: None,
            relative_destination: None,
            state: FileState::Discovered,
        }
    }

    fn normalize(&mut self, normalizer: &NameNormalizer) {
        self.normalized_name = normalizer.normalize(&self.raw_name);
        self.state = FileState::Normalized;
    }

    fn classify(&mut self, classifier: &Classifier) {
        let classification = classifier.classify(&self.normalized_name);
        self.category = classification.category;
        self.color = classification.color;
        self.state = FileState::Classified;
    }

    fn mark_placed(&mut self, placement: Placement) {
        self.destination = Some(placement.destination);
        self.relative_destination = Some(placement.relative);
        self.state = FileState::Placed;
    }

    fn mark_failed(&mut self) {
        self.state = FileState::Failed;
    }
}

/// Progress notifications emitted while a run is in flight.
#[derive(Debug)]
pub enum RunEvent<'a> {
    /// The file was moved (or, in a dry run, planned).
    Placed(&'a FileRecord),
    /// The file could not be placed and stays where it was.
    Failed {
        record: &'a FileRecord,
        error: &'a PlaceError,
    },
    /// A directory could not be read and was skipped.
    SubtreeSkipped(&'a WalkError),
}

/// Errors that abort a whole run.
#[derive(Debug, Error)]
pub enum OrganizeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Walk(#[from] WalkError),

    #[error("Cannot create destination directory {}: {source}", path.display())]
    DestinationUnavailable { path: PathBuf, source: io::Error },

    #[error("Source and destination are the same directory: {}", path.display())]
    SameRoots { path: PathBuf },
}

pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Runs the pipeline over one source root.
#[derive(Debug, Clone)]
pub struct Organizer {
    settings: Settings,
}

impl Organizer {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Organizes every icon under the source root.
    ///
    /// `on_event` is called once per placed or failed file and once per
    /// skipped directory, in walk order.
    ///
    /// # Errors
    ///
    /// Fails before touching any file if the source root is missing or
    /// unreadable, if the destination root cannot be created, or if both
    /// roots are the same directory. Per-file failures are reported through
    /// `on_event` and the returned tally instead.
    pub fn run(
        &self,
        mode: RunMode,
        mut on_event: impl FnMut(RunEvent<'_>),
    ) -> OrganizeResult<RunReport> {
        let started_at = Utc::now();
        let settings = &self.settings;
        let dry_run = mode == RunMode::DryRun;

        check_root(&settings.source_root)?;
        let source_root = fs::canonicalize(&settings.source_root)
            .unwrap_or_else(|_| settings.source_root.clone());

        if !dry_run {
            fs::create_dir_all(&settings.destination_root).map_err(|e| {
                OrganizeError::DestinationUnavailable {
                    path: settings.destination_root.clone(),
                    source: e,
                }
            })?;
        }

        let mut walker = TreeWalker::new(&source_root, &settings.extensions, &settings.filters);
        if let Ok(destination) = fs::canonicalize(&settings.destination_root) {
            if destination == source_root {
                return Err(OrganizeError::SameRoots { path: destination });
            }
            walker = walker.exclude_dir(destination);
        }

        tracing::info!(
            source = %settings.source_root.display(),
            destination = %settings.destination_root.display(),
            dry_run,
            "organizing icons"
        );

        let tally = self.organize_items(walker.walk()?, mode, &mut on_event);

        tracing::info!(
            moved = tally.moved,
            failed = tally.failures.len(),
            skipped_dirs = tally.skipped_dirs.len(),
            "run finished"
        );

        Ok(RunReport {
            started_at,
            finished_at: Utc::now(),
            source_root: settings.source_root.clone(),
            destination_root: settings.destination_root.clone(),
            dry_run,
            tally,
        })
    }

    /// Drives every walk item to a terminal state. Error items are skipped
    /// subtrees; they are recorded and the remaining items still run.
    fn organize_items(
        &self,
        items: impl IntoIterator<Item = WalkResult<DiscoveredFile>>,
        mode: RunMode,
        on_event: &mut impl FnMut(RunEvent<'_>),
    ) -> RunTally {
        let settings = &self.settings;
        let dry_run = mode == RunMode::DryRun;
        let placer = Placer::new(&settings.destination_root, settings.max_collision_attempts);
        let mut tally = RunTally::default();
        let mut planned: HashSet<PathBuf> = HashSet::new();

        for item in items {
            let file = match item {
                Ok(file) => file,
                Err(e) => {
                    tally.record_skipped_dir(e.path(), e.to_string());
                    on_event(RunEvent::SubtreeSkipped(&e));
                    continue;
                }
            };

            let mut record = FileRecord::discovered(file);
            record.normalize(&settings.normalizer);
            record.classify(&settings.classifier);
            tracing::debug!(
                file = %record.raw_name,
                normalized = %record.normalized_name,
                category = %record.category,
                color = %record.color,
                "classified"
            );

            let outcome = if dry_run {
                placer.plan(
                    &record.source,
                    &record.category,
                    &record.color,
                    &record.normalized_name,
                    &planned,
                )
            } else {
                placer.place(
                    &record.source,
                    &record.category,
                    &record.color,
                    &record.normalized_name,
                )
            };

            match outcome {
                Ok(placement) => {
                    if dry_run {
                        planned.insert(placement.destination.clone());
                    }
                    record.mark_placed(placement);
                    tally.record_placed(PlacedEntry {
                        source: record.source.clone(),
                        destination: record.destination.clone().unwrap_or_default(),
                        category: record.category.clone(),
                        color: record.color.clone(),
                    });
                    on_event(RunEvent::Placed(&record));
                }
                Err(error) => {
                    record.mark_failed();
                    tracing::warn!(file = %record.source.display(), %error, "failed to place file");
                    tally.record_failure(&record.source, error.to_string());
                    on_event(RunEvent::Failed {
                        record: &record,
                        error: &error,
                    });
                }
            }
        }

        tally
    }
}
