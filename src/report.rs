//! Per-step and whole-run reports.
//!
//! Every step returns a report instead of failing on the first bad entry;
//! the run collects them into a [`RunReport`] for the summary table or the
//! JSON output.

use chrono::NaiveDate;
use serde::Serialize;
use std::path::PathBuf;

/// An entry that could not be processed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub path: PathBuf,
    pub reason: String,
}

impl EntryFailure {
    pub fn new(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result of the age-based archival step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ArchiveReport {
    /// Entries moved (or, in a dry run, that would be moved) into the archive.
    pub archived: Vec<PathBuf>,
    /// Entries that were due but could not be archived.
    pub failed: Vec<EntryFailure>,
}

/// Result of the empty-directory removal step.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReapReport {
    /// Directories removed because they were empty.
    pub removed: Vec<PathBuf>,
    /// Removals refused for reasons other than "not empty".
    pub skipped: Vec<EntryFailure>,
}

/// What happened to the convenience link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum LinkOutcome {
    Disabled,
    Linked(PathBuf),
    Planned(PathBuf),
    Failed(String),
}

/// Result of sweeping one source directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SweepReport {
    pub source: PathBuf,
    /// Final locations of the moved items.
    pub moved: Vec<PathBuf>,
    /// Number of items left in place by the exclusion policy.
    pub excluded: usize,
    pub failed: Vec<EntryFailure>,
}

impl SweepReport {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            ..Default::default()
        }
    }
}

/// Everything one run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub date: NaiveDate,
    pub dry_run: bool,
    pub today_dir: PathBuf,
    pub created_today: bool,
    pub archive: ArchiveReport,
    pub reap: ReapReport,
    pub link: LinkOutcome,
    pub sweeps: Vec<SweepReport>,
}

impl RunReport {
    pub fn moved_count(&self) -> usize {
        self.sweeps.iter().map(|s| s.moved.len()).sum()
    }

    /// Number of per-entry problems across all steps, including a failed link.
    pub fn warning_count(&self) -> usize {
        let link = usize::from(matches!(self.link, LinkOutcome::Failed(_)));
        self.archive.failed.len()
            + self.reap.skipped.len()
            + self.sweeps.iter().map(|s| s.failed.len()).sum::<usize>()
            + link
    }
}
