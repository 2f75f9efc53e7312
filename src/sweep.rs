/// Consolidation of loose items into today's directory.
///
/// A sweep moves every immediate child of a source directory into a
/// destination directory, minus whatever the exclusion policy protects.
/// Two policies exist: one for the working root itself (never move dated
/// directories, the archive or the today link) and one for external sources
/// such as the desktop (never move named exceptions).
use crate::config::ExceptionSet;
use crate::logging::dry_run_tag;
use crate::path_classifier::{is_dated_name, same_entry};
use crate::relocate::{Relocation, relocate};
use crate::report::{EntryFailure, SweepReport};
use log::{debug, info, warn};
use std::fs;
use std::path::Path;

/// Switches that apply to every sweep of a run.
#[derive(Debug, Clone, Copy, Default)]
pub struct SweepOptions {
    /// Also move entries whose name starts with a dot.
    pub include_hidden: bool,
    pub dry_run: bool,
}

/// Moves items from a source directory into a destination directory.
pub struct Sweeper;

impl Sweeper {
    /// Sweeps `source_dir` into `destination_dir`.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - Directory whose immediate children are moved
    /// * `destination_dir` - Directory receiving them, usually today's directory
    /// * `exclude` - Returns true for children that must stay where they are
    /// * `options` - Hidden-file handling and dry-run switch
    ///
    /// A source that cannot be read and items that fail to move are recorded
    /// in the report; the sweep never aborts on a single item.
    pub fn sweep(
        source_dir: &Path,
        destination_dir: &Path,
        exclude: &dyn Fn(&Path) -> bool,
        options: SweepOptions,
    ) -> SweepReport {
        let mut report = SweepReport::new(source_dir);

        let entries = match fs::read_dir(source_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "event=source_unreadable path={} reason=\"{}\"",
                    source_dir.display(),
                    e
                );
                report.failed.push(EntryFailure::new(source_dir, e));
                return report;
            }
        };

        let mut items: Vec<_> = entries.flatten().map(|entry| entry.path()).collect();
        items.sort();

        for item in items {
            if !options.include_hidden && is_hidden(&item) {
                continue;
            }
            if exclude(&item) {
                debug!("event=sweep_excluded path={}", item.display());
                report.excluded += 1;
                continue;
            }

            match relocate(&item, destination_dir, options.dry_run) {
                Ok(Relocation::Moved(dest)) | Ok(Relocation::Planned(dest)) => {
                    info!(
                        "event=moved path={} dest={}{}",
                        item.display(),
                        dest.display(),
                        dry_run_tag(options.dry_run)
                    );
                    report.moved.push(dest);
                }
                Ok(Relocation::AlreadyInPlace) => {}
                Err(e) => {
                    warn!(
                        "event=move_failed path={} reason=\"{}\"",
                        item.display(),
                        e
                    );
                    report.failed.push(EntryFailure::new(&item, e));
                }
            }
        }

        info!(
            "event=swept source={} moved={} excluded={} failed={}{}",
            source_dir.display(),
            report.moved.len(),
            report.excluded,
            report.failed.len(),
            dry_run_tag(options.dry_run)
        );
        report
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

/// Exclusion policy for sweeping the working root into today's directory.
///
/// Keeps the today link, the archive directory and anything whose name is a
/// date in `date_format`, which covers today's directory and every earlier
/// one.
pub fn working_root_policy<'a>(
    link_path: &'a Path,
    archive_dir: &'a Path,
    date_format: &'a str,
) -> impl Fn(&Path) -> bool + 'a {
    move |item| {
        same_entry(item, link_path)
            || same_entry(item, archive_dir)
            || item
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| is_dated_name(name, date_format))
    }
}

/// Exclusion policy for external sources: keep the named exceptions.
///
/// With no exceptions configured every item is swept.
pub fn source_policy(exceptions: &ExceptionSet) -> impl Fn(&Path) -> bool + '_ {
    move |item| {
        !exceptions.is_empty()
            && item
                .file_name()
                .is_some_and(|name| exceptions.contains(&name.to_string_lossy()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp = TempDir::new().unwrap();
        let source = temp.path().join("Desktop");
        let dest = temp.path().join("work").join("2024-03-10");
        fs::create_dir_all(&source).unwrap();
        fs::create_dir_all(&dest).unwrap();
        (temp, source, dest)
    }

    #[test]
    fn test_sweep_respects_exceptions() {
        let (_temp, source, dest) = setup();
        fs::write(source.join("report.txt"), "r").unwrap();
        fs::write(source.join("archive.zip"), "z").unwrap();
        let exceptions = ExceptionSet::from_names(["archive.zip"]);

        let report = Sweeper::sweep(
            &source,
            &dest,
            &source_policy(&exceptions),
            SweepOptions::default(),
        );

        assert_eq!(report.moved, vec![dest.join("report.txt")]);
        assert_eq!(report.excluded, 1);
        assert!(dest.join("report.txt").is_file());
        assert!(!dest.join("archive.zip").exists());
        assert!(source.join("archive.zip").is_file());
    }

    #[test]
    fn test_source_policy_without_exceptions_keeps_nothing() {
        let (_temp, source, dest) = setup();
        fs::write(source.join("desktop.ini"), "ini").unwrap();
        fs::write(source.join("photo.jpg"), "p").unwrap();
        let exceptions = ExceptionSet::default();
        let policy = source_policy(&exceptions);

        assert!(!policy(source.join("desktop.ini").as_path()));

        let report = Sweeper::sweep(&source, &dest, &policy, SweepOptions::default());

        assert_eq!(report.excluded, 0);
        assert_eq!(
            report.moved,
            vec![dest.join("desktop.ini"), dest.join("photo.jpg")]
        );
    }

    #[test]
    fn test_sweep_moves_directories_whole() {
        let (_temp, source, dest) = setup();
        fs::create_dir_all(source.join("project").join("src")).unwrap();
        fs::write(source.join("project").join("src").join("main.rs"), "fn main() {}").unwrap();

        Sweeper::sweep(&source, &dest, &|_: &Path| false, SweepOptions::default());

        assert!(dest.join("project").join("src").join("main.rs").is_file());
        assert!(!source.join("project").exists());
    }

    #[test]
    fn test_sweep_skips_hidden_unless_asked() {
        let (_temp, source, dest) = setup();
        fs::write(source.join(".DS_Store"), "").unwrap();
        fs::write(source.join("notes.md"), "").unwrap();

        Sweeper::sweep(&source, &dest, &|_: &Path| false, SweepOptions::default());
        assert!(source.join(".DS_Store").exists());
        assert!(dest.join("notes.md").exists());

        let options = SweepOptions {
            include_hidden: true,
            dry_run: false,
        };
        Sweeper::sweep(&source, &dest, &|_: &Path| false, options);
        assert!(dest.join(".DS_Store").exists());
    }

    #[test]
    fn test_sweep_continues_after_collision() {
        let (_temp, source, dest) = setup();
        fs::write(dest.join("a.txt"), "already here").unwrap();
        fs::write(source.join("a.txt"), "incoming").unwrap();
        fs::write(source.join("b.txt"), "b").unwrap();

        let report = Sweeper::sweep(&source, &dest, &|_: &Path| false, SweepOptions::default());

        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].path, source.join("a.txt"));
        assert_eq!(report.moved, vec![dest.join("b.txt")]);
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), "already here");
        assert_eq!(fs::read_to_string(source.join("a.txt")).unwrap(), "incoming");
    }

    #[test]
    fn test_sweep_missing_source_is_reported() {
        let (temp, _source, dest) = setup();
        let missing = temp.path().join("Inbox");

        let report = Sweeper::sweep(&missing, &dest, &|_: &Path| false, SweepOptions::default());

        assert_eq!(report.failed.len(), 1);
        assert!(report.moved.is_empty());
    }

    #[test]
    fn test_working_root_policy_keeps_dated_link_and_archive() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let today = root.join("2024-03-10");
        let archive = root.join("ARCHIVE");
        fs::create_dir(&today).unwrap();
        fs::create_dir(&archive).unwrap();
        fs::create_dir(root.join("2023-12-24")).unwrap();
        fs::create_dir(root.join("stray-folder")).unwrap();
        fs::write(root.join("loose.pdf"), "pdf").unwrap();
        let link = root.join("today");
        #[cfg(unix)]
        std::os::unix::fs::symlink(&today, &link).unwrap();

        let policy = working_root_policy(&link, &archive, "%Y-%m-%d");
        let report = Sweeper::sweep(root, &today, &policy, SweepOptions::default());

        assert!(root.join("2023-12-24").is_dir());
        assert!(archive.is_dir());
        assert!(today.join("stray-folder").is_dir());
        assert!(today.join("loose.pdf").is_file());
        assert!(!today.join("2024-03-10").exists());
        #[cfg(unix)]
        assert!(crate::path_classifier::is_symlink(&link));
        assert_eq!(report.moved.len(), 2);
        assert!(report.failed.is_empty());
    }

    #[test]
    fn test_dry_run_sweep_moves_nothing() {
        let (_temp, source, dest) = setup();
        fs::write(source.join("report.txt"), "r").unwrap();

        let options = SweepOptions {
            include_hidden: false,
            dry_run: true,
        };
        let report = Sweeper::sweep(&source, &dest, &|_: &Path| false, options);

        assert_eq!(report.moved, vec![dest.join("report.txt")]);
        assert!(source.join("report.txt").is_file());
        assert!(!dest.join("report.txt").exists());
    }
}
