/// Moving a single entry into a destination directory.
///
/// This is the only place that mutates entry locations. It never
/// overwrites: if the target name is taken the move is refused. A rename
/// across filesystems falls back to copy-then-remove, without any
/// transactional guarantee.
use crate::error::MoveError;
use crate::path_classifier::same_entry;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// What happened to an entry handed to [`relocate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relocation {
    /// The entry now lives at this path.
    Moved(PathBuf),
    /// Dry run: the entry would have been moved to this path.
    Planned(PathBuf),
    /// Source and target are the same entry; nothing to do.
    AlreadyInPlace,
}

/// Moves `item` into `destination_dir`, keeping its base name.
///
/// # Arguments
///
/// * `item` - The file, directory or symlink to move
/// * `destination_dir` - The directory that will contain the entry afterwards
/// * `dry_run` - If true, only compute the target path
///
/// # Errors
///
/// Returns [`MoveError::DestinationExists`] if the target name is taken and
/// [`MoveError::Io`] if the rename (or the copy fallback) fails.
pub fn relocate(item: &Path, destination_dir: &Path, dry_run: bool) -> Result<Relocation, MoveError> {
    let name = item.file_name().ok_or_else(|| MoveError::NoFileName {
        path: item.to_path_buf(),
    })?;
    let target = destination_dir.join(name);

    if same_entry(item, destination_dir) || same_entry(item, &target) {
        return Ok(Relocation::AlreadyInPlace);
    }

    if fs::symlink_metadata(&target).is_ok() {
        return Err(MoveError::DestinationExists {
            destination: target,
        });
    }

    if dry_run {
        return Ok(Relocation::Planned(target));
    }

    let renamed = fs::rename(item, &target);
    complete_rename(item, &target, renamed).map_err(|error| MoveError::Io {
        from: item.to_path_buf(),
        to: target.clone(),
        error,
    })?;
    Ok(Relocation::Moved(target))
}

/// Finishes a move given the outcome of `fs::rename(from, to)`. A
/// cross-device refusal is retried as copy-then-remove; any other error is
/// returned unchanged.
fn complete_rename(from: &Path, to: &Path, renamed: io::Result<()>) -> io::Result<()> {
    match renamed {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            copy_entry(from, to)?;
            remove_entry(from)
        }
        other => other,
    }
}

/// Copies a file, symlink or directory tree to `to`.
fn copy_entry(from: &Path, to: &Path) -> io::Result<()> {
    let file_type = fs::symlink_metadata(from)?.file_type();
    if file_type.is_symlink() {
        copy_symlink(from, to)
    } else if file_type.is_dir() {
        fs::create_dir(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copy_entry(&entry.path(), &to.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(from, to).map(|_| ())
    }
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(from)?, to)
}

#[cfg(windows)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let target = fs::read_link(from)?;
    if fs::metadata(from).map(|m| m.is_dir()).unwrap_or(false) {
        std::os::windows::fs::symlink_dir(target, to)
    } else {
        std::os::windows::fs::symlink_file(target, to)
    }
}

/// Removes the source after a successful copy.
fn remove_entry(path: &Path) -> io::Result<()> {
    let file_type = fs::symlink_metadata(path)?.file_type();
    if file_type.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
