/// Today's dated directory and the convenience link pointing at it.
use crate::logging::dry_run_tag;
use crate::report::LinkOutcome;
use log::{info, warn};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Creates the dated directory for the current run and refreshes its link.
pub struct Provisioner;

impl Provisioner {
    /// Ensures `working_root/today_name` exists and returns its path along
    /// with whether this call created it.
    ///
    /// An existing directory is fine; an existing file of the same name is
    /// an `AlreadyExists` error.
    pub fn provision_today(
        working_root: &Path,
        today_name: &str,
        dry_run: bool,
    ) -> io::Result<(PathBuf, bool)> {
        let today_dir = working_root.join(today_name);

        if dry_run {
            let created = !today_dir.is_dir();
            if created {
                info!(
                    "event=created path={}{}",
                    today_dir.display(),
                    dry_run_tag(dry_run)
                );
            }
            return Ok((today_dir, created));
        }

        match fs::create_dir(&today_dir) {
            Ok(()) => {
                info!("event=created path={}", today_dir.display());
                Ok((today_dir, true))
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists && today_dir.is_dir() => {
                Ok((today_dir, false))
            }
            Err(e) => Err(e),
        }
    }

    /// Replaces whatever sits at `link_path` with a symlink to `target`.
    ///
    /// Only symlinks and plain files are replaced; a real directory at that
    /// path is left alone. Nothing here is fatal: failures come back as
    /// [`LinkOutcome::Failed`] and are logged as warnings.
    pub fn refresh_link(link_path: &Path, target: &Path, enabled: bool, dry_run: bool) -> LinkOutcome {
        if !enabled {
            return LinkOutcome::Disabled;
        }

        if let Ok(meta) = fs::symlink_metadata(link_path)
            && meta.is_dir()
        {
            let reason = format!("{} is a directory, not a link", link_path.display());
            warn!(
                "event=link_failed path={} reason=\"{}\"",
                link_path.display(),
                reason
            );
            return LinkOutcome::Failed(reason);
        }

        if dry_run {
            info!(
                "event=linked path={} target={}{}",
                link_path.display(),
                target.display(),
                dry_run_tag(dry_run)
            );
            return LinkOutcome::Planned(link_path.to_path_buf());
        }

        let result = remove_existing(link_path).and_then(|()| create_dir_link(target, link_path));
        match result {
            Ok(()) => {
                info!(
                    "event=linked path={} target={}",
                    link_path.display(),
                    target.display()
                );
                LinkOutcome::Linked(link_path.to_path_buf())
            }
            Err(e) => {
                warn!(
                    "event=link_failed path={} reason=\"{}\"",
                    link_path.display(),
                    e
                );
                LinkOutcome::Failed(e.to_string())
            }
        }
    }
}

/// Removes a link or file, treating "nothing there" as success.
fn remove_existing(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

#[cfg(unix)]
fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn create_dir_link(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_classifier::is_symlink;
    use tempfile::TempDir;

    #[test]
    fn test_provision_today_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let (first, created) = Provisioner::provision_today(root, "2024-03-10", false).unwrap();
        assert!(created);
        assert!(first.is_dir());
        fs::write(first.join("work.txt"), "keep me").unwrap();

        let (second, created) = Provisioner::provision_today(root, "2024-03-10", false).unwrap();
        assert!(!created);
        assert_eq!(first, second);
        assert!(second.join("work.txt").is_file());
    }

    #[test]
    fn test_provision_today_fails_on_file_in_the_way() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("2024-03-10"), "not a dir").unwrap();

        let result = Provisioner::provision_today(temp.path(), "2024-03-10", false);

        assert!(result.is_err());
    }

    #[test]
    fn test_provision_today_dry_run() {
        let temp = TempDir::new().unwrap();

        let (dir, created) = Provisioner::provision_today(temp.path(), "2024-03-10", true).unwrap();

        assert!(created);
        assert!(!dir.exists());
    }

    #[test]
    fn test_refresh_link_disabled() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("today");

        let outcome = Provisioner::refresh_link(&link, temp.path(), false, false);

        assert_eq!(outcome, LinkOutcome::Disabled);
        assert!(fs::symlink_metadata(&link).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_refresh_link_replaces_previous_link() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let yesterday = root.join("2024-03-09");
        let today = root.join("2024-03-10");
        fs::create_dir(&yesterday).unwrap();
        fs::create_dir(&today).unwrap();
        let link = root.join("today");

        Provisioner::refresh_link(&link, &yesterday, true, false);
        let outcome = Provisioner::refresh_link(&link, &today, true, false);

        assert_eq!(outcome, LinkOutcome::Linked(link.clone()));
        assert!(is_symlink(&link));
        assert_eq!(fs::read_link(&link).unwrap(), today);
    }

    #[cfg(unix)]
    #[test]
    fn test_refresh_link_replaces_stale_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let today = root.join("2024-03-10");
        fs::create_dir(&today).unwrap();
        let link = root.join("today");
        fs::write(&link, "stale").unwrap();

        let outcome = Provisioner::refresh_link(&link, &today, true, false);

        assert_eq!(outcome, LinkOutcome::Linked(link.clone()));
        assert_eq!(fs::read_link(&link).unwrap(), today);
    }

    #[test]
    fn test_refresh_link_leaves_real_directory() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let link = root.join("today");
        fs::create_dir(&link).unwrap();
        fs::write(link.join("important.txt"), "data").unwrap();

        let outcome = Provisioner::refresh_link(&link, &root.join("2024-03-10"), true, false);

        assert!(matches!(outcome, LinkOutcome::Failed(_)));
        assert!(link.join("important.txt").is_file());
    }

    #[cfg(unix)]
    #[test]
    fn test_refresh_link_failure_is_not_fatal() {
        let temp = TempDir::new().unwrap();
        let link = temp.path().join("missing-parent").join("today");

        let outcome = Provisioner::refresh_link(&link, temp.path(), true, false);

        assert!(matches!(outcome, LinkOutcome::Failed(_)));
    }
}
