/// Removal of empty directories left at the top of the working root.
use crate::error::{CleanerError, CleanerResult};
use crate::logging::dry_run_tag;
use crate::path_classifier::{is_symlink, same_entry};
use crate::report::{EntryFailure, ReapReport};
use log::{debug, info};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::Path;

/// Removes empty immediate children of a directory.
pub struct Reaper;

impl Reaper {
    /// Attempts a non-recursive removal of every child of `working_root`
    /// that is not one of `protected`.
    ///
    /// Failing to remove a non-empty directory or a plain file is the normal
    /// case and is not reported. Other refusals (permissions, busy mounts) are
    /// logged at debug level and listed as skipped; they never abort the run.
    pub fn remove_empty_directories(
        working_root: &Path,
        protected: &[&Path],
        dry_run: bool,
    ) -> CleanerResult<ReapReport> {
        let entries = fs::read_dir(working_root).map_err(|source| CleanerError::ListDirectory {
            path: working_root.to_path_buf(),
            source,
        })?;

        let mut report = ReapReport::default();

        for entry in entries.flatten() {
            let path = entry.path();
            if is_symlink(&path) || protected.iter().any(|p| same_entry(&path, p)) {
                continue;
            }

            let outcome = if dry_run {
                check_empty(&path)
            } else {
                fs::remove_dir(&path)
            };

            match outcome {
                Ok(()) => {
                    info!(
                        "event=removed_empty path={}{}",
                        path.display(),
                        dry_run_tag(dry_run)
                    );
                    report.removed.push(path);
                }
                Err(e) if is_expected_refusal(&e) => {}
                Err(e) => {
                    debug!(
                        "event=reap_skipped path={} reason=\"{}\"",
                        path.display(),
                        e
                    );
                    report.skipped.push(EntryFailure::new(&path, e));
                }
            }
        }

        Ok(report)
    }
}

/// Outcomes of `remove_dir` that simply mean "this is not an empty directory".
fn is_expected_refusal(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::DirectoryNotEmpty | ErrorKind::NotADirectory | ErrorKind::NotFound
    )
}

/// Dry-run stand-in for `remove_dir`: fails the same way a removal would.
fn check_empty(path: &Path) -> io::Result<()> {
    if !fs::symlink_metadata(path)?.is_dir() {
        return Err(io::Error::from(ErrorKind::NotADirectory));
    }
    if fs::read_dir(path)?.next().is_some() {
        return Err(io::Error::from(ErrorKind::DirectoryNotEmpty));
    }
    Ok(())
}
