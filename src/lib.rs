//! workclean - A workfolder and desktop housekeeping utility
//!
//! This library archives stale dated workfolders, keeps one workfolder per
//! day (plus a `today` link to it), and consolidates loose files from the
//! desktop and other inbox folders into that day's workfolder.

pub mod archiver;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod path_classifier;
pub mod provisioner;
pub mod reaper;
pub mod relocate;
pub mod report;
pub mod sweep;

pub use archiver::Archiver;
pub use config::{CleanerConfig, ExceptionSet, FileConfig, Overrides};
pub use error::{CleanerError, ConfigError, MoveError};
pub use provisioner::Provisioner;
pub use reaper::Reaper;
pub use report::{LinkOutcome, RunReport};
pub use sweep::{SweepOptions, Sweeper};

pub use cli::{Cli, run, run_cli};
