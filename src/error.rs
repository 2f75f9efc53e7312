//! Error types for workclean.
//!
//! Fatal problems (bad configuration, a working root that cannot be set up)
//! surface as [`CleanerError`] and abort the run before or during setup.
//! Per-entry problems surface as [`MoveError`] and are collected into the
//! step reports instead of aborting.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while building the run configuration.
///
/// All of these are detected before the first filesystem mutation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A directory name contains characters outside the safe set.
    #[error("{what} cannot be named {name:?}: only letters, digits and . , + - _ space are allowed")]
    UnsafeName { what: &'static str, name: String },

    /// The date format contains an unknown specifier or yields an unusable name.
    #[error("invalid date format {format:?}: {reason}")]
    InvalidDateFormat { format: String, reason: String },

    /// Neither the command line nor the config file named a working root.
    #[error("no working root given (use --working-root or set working_root in the config file)")]
    MissingWorkingRoot,

    /// The working root does not exist or is not a directory.
    #[error("working root {} is not a directory", path.display())]
    WorkingRootNotDirectory { path: PathBuf },

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// The configuration file is not valid TOML for our schema.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),

    /// An exception glob pattern failed to compile.
    #[error("invalid glob pattern {0:?}")]
    InvalidGlobPattern(String),

    /// An exception regex failed to compile.
    #[error("invalid regex pattern {pattern:?}: {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },

    /// IO error while reading configuration or resolving paths.
    #[error("IO error reading configuration: {0}")]
    Io(#[from] io::Error),
}

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum CleanerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The archive directory could not be created.
    #[error("failed to create archive directory {}: {source}", path.display())]
    ArchiveSetup { path: PathBuf, source: io::Error },

    /// The working root could not be listed.
    #[error("failed to read directory {}: {source}", path.display())]
    ListDirectory { path: PathBuf, source: io::Error },

    /// Today's directory could not be created.
    #[error("failed to create today's directory {}: {source}", path.display())]
    TodaySetup { path: PathBuf, source: io::Error },
}

/// Failure to relocate a single entry.
#[derive(Debug, Error)]
pub enum MoveError {
    /// Something already occupies the target path; nothing is overwritten.
    #[error("{} already exists", destination.display())]
    DestinationExists { destination: PathBuf },

    /// The source path has no final component to preserve.
    #[error("{} has no file name component", path.display())]
    NoFileName { path: PathBuf },

    /// The underlying rename or copy failed.
    #[error("failed to move {} to {}: {error}", from.display(), to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        error: io::Error,
    },
}

/// Result type for whole-run operations.
pub type CleanerResult<T> = Result<T, CleanerError>;
