/// Age-based archival of stale working-root entries.
///
/// Every immediate child of the working root whose modification date is
/// older than the cutoff is moved into the archive directory under its own
/// name. Symlinks and protected entries (today's directory, the archive
/// itself) are never touched.
use crate::error::{CleanerError, CleanerResult};
use crate::logging::dry_run_tag;
use crate::path_classifier::{is_older_than, is_symlink, same_entry};
use crate::relocate::{Relocation, relocate};
use crate::report::{ArchiveReport, EntryFailure};
use chrono::NaiveDate;
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// Moves stale entries of a working root into its archive directory.
pub struct Archiver;

impl Archiver {
    /// Archives every entry of `working_root` older than `cutoff_days`.
    ///
    /// The archive directory is created (with parents) first; it is always
    /// protected in addition to the entries in `protected`. Protected entries
    /// are matched by resolved location, so `./ARCHIVE` and `/abs/ARCHIVE`
    /// are the same thing.
    ///
    /// # Errors
    ///
    /// Fails only if the archive directory cannot be created or the working
    /// root cannot be listed. Problems with individual entries (metadata,
    /// name collisions in the archive, rename failures) are recorded in the
    /// report and processing continues.
    pub fn archive_old_entries(
        working_root: &Path,
        archive_dir: &Path,
        protected: &[&Path],
        cutoff_days: i64,
        today: NaiveDate,
        dry_run: bool,
    ) -> CleanerResult<ArchiveReport> {
        if dry_run {
            if !archive_dir.is_dir() {
                info!(
                    "event=created path={}{}",
                    archive_dir.display(),
                    dry_run_tag(dry_run)
                );
            }
        } else {
            fs::create_dir_all(archive_dir).map_err(|source| CleanerError::ArchiveSetup {
                path: archive_dir.to_path_buf(),
                source,
            })?;
        }

        let entries = fs::read_dir(working_root).map_err(|source| CleanerError::ListDirectory {
            path: working_root.to_path_buf(),
            source,
        })?;

        let mut report = ArchiveReport::default();

        for entry in entries.flatten() {
            let path = entry.path();

            if is_symlink(&path) {
                continue;
            }
            if same_entry(&path, archive_dir) || protected.iter().any(|p| same_entry(&path, p)) {
                continue;
            }

            match is_older_than(&path, cutoff_days, today) {
                Ok(true) => {}
                Ok(false) => continue,
                Err(e) => {
                    warn!(
                        "event=archive_failed path={} reason=\"{}\"",
                        path.display(),
                        e
                    );
                    report.failed.push(EntryFailure::new(&path, e));
                    continue;
                }
            }

            match relocate(&path, archive_dir, dry_run) {
                Ok(Relocation::Moved(dest)) | Ok(Relocation::Planned(dest)) => {
                    info!(
                        "event=archived path={} dest={}{}",
                        path.display(),
                        dest.display(),
                        dry_run_tag(dry_run)
                    );
                    report.archived.push(dest);
                }
                Ok(Relocation::AlreadyInPlace) => {
                    debug!("event=archive_noop path={}", path.display());
                }
                Err(e) => {
                    warn!(
                        "event=archive_failed path={} reason=\"{}\"",
                        path.display(),
                        e
                    );
                    report.failed.push(EntryFailure::new(&path, e));
                }
            }
        }

        Ok(report)
    }
}
