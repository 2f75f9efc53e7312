//! Command-line interface module for workclean.
//!
//! This module handles:
//! - Argument parsing
//! - Turning arguments and the config file into a [`CleanerConfig`]
//! - Running the four housekeeping steps in order

use crate::archiver::Archiver;
use crate::config::{CleanerConfig, FileConfig, Overrides};
use crate::error::{CleanerError, CleanerResult};
use crate::path_classifier::same_entry;
use crate::provisioner::Provisioner;
use crate::reaper::Reaper;
use crate::report::RunReport;
use crate::sweep::{SweepOptions, Sweeper, source_policy, working_root_policy};
use chrono::{Local, NaiveDate};
use clap::{ArgAction, Parser};
use log::info;
use std::path::{Path, PathBuf};

/// Workfolder & desktop cleaner.
///
/// Archives old dated workfolders, creates today's workfolder and moves
/// the contents of the desktop and other clean folders into it.
#[derive(Debug, Parser)]
#[command(name = "workclean", version, about, long_about = None)]
pub struct Cli {
    /// Main workfolder. One dated subdirectory is created in it per day.
    #[arg(short = 'w', long, value_name = "DIR")]
    pub working_root: Option<PathBuf>,

    /// Archive directory name, created inside the working root [default: ARCHIVE]
    #[arg(short = 'a', long, value_name = "NAME")]
    pub archive_name: Option<String>,

    /// Directories whose contents are moved into today's workfolder.
    #[arg(short = 'c', long, value_name = "DIR", num_args = 1..)]
    pub clean_folders: Vec<PathBuf>,

    /// Desktop directory, cleaned before the other folders.
    #[arg(short = 'd', long, value_name = "DIR")]
    pub desktop: Option<PathBuf>,

    /// Entries not modified for more than this many days are archived [default: 30]
    #[arg(long, value_name = "DAYS")]
    pub cutoff_days: Option<u32>,

    /// strftime format of the dated directories [default: %Y-%m-%d]
    #[arg(short = 'f', long, value_name = "FMT")]
    pub date_format: Option<String>,

    /// Create or refresh the link to today's workfolder [default: true]
    #[arg(long, value_name = "BOOL", action = ArgAction::Set)]
    pub create_link: Option<bool>,

    /// Name of the link to today's workfolder [default: today]
    #[arg(long, value_name = "NAME")]
    pub link_name: Option<String>,

    /// Comma-separated names never moved out of the desktop or clean folders.
    #[arg(short = 'e', long, value_name = "NAMES", value_delimiter = ',')]
    pub exceptions: Vec<String>,

    /// Also move entries whose name starts with a dot.
    #[arg(long)]
    pub include_hidden: bool,

    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log what would be done without changing anything.
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Print the run report as JSON instead of the summary table.
    #[arg(long)]
    pub json: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (-q warnings only, -qq errors only).
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "verbose")]
    pub quiet: u8,
}

impl Cli {
    /// The command-line half of the configuration.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            working_root: self.working_root.clone(),
            archive_name: self.archive_name.clone(),
            cutoff_days: self.cutoff_days,
            date_format: self.date_format.clone(),
            create_link: self.create_link,
            link_name: self.link_name.clone(),
            desktop: self.desktop.clone(),
            clean_folders: self.clean_folders.clone(),
            exceptions: self.exceptions.clone(),
            include_hidden: self.include_hidden,
            dry_run: self.dry_run,
        }
    }
}

/// Builds the configuration for `cli` and runs it with the local date.
///
/// # Errors
///
/// Configuration problems are reported before anything on disk changes.
pub fn run_cli(cli: &Cli) -> CleanerResult<RunReport> {
    let today = Local::now().date_naive();
    let config = load_config(cli, today)?;
    run(&config)
}

/// Loads the config file named by `cli` (or the default one) and merges it
/// with the command-line values.
pub fn load_config(cli: &Cli, today: NaiveDate) -> CleanerResult<CleanerConfig> {
    let file = FileConfig::load(cli.config.as_deref())?;
    Ok(CleanerConfig::resolve(file, cli.overrides(), today)?)
}

/// Runs one complete housekeeping pass.
///
/// The steps run in a fixed order:
/// 1. Archive entries older than the cutoff
/// 2. Remove empty directories at the top of the working root
/// 3. Create today's directory and refresh the link to it
/// 4. Sweep stray items of the working root, then every source directory,
///    into today's directory
///
/// # Errors
///
/// Fails only when the working root cannot be listed, or the archive or
/// today's directory cannot be created. Everything else is recorded in the
/// returned report.
pub fn run(config: &CleanerConfig) -> CleanerResult<RunReport> {
    let root = config.working_root();
    let archive_dir = config.archive_dir();
    let today_dir = config.today_dir();
    let link_path = config.link_path();
    let dry_run = config.dry_run();

    info!(
        "event=run_start root={} date={} cutoff_days={} dry_run={}",
        root.display(),
        config.today(),
        config.cutoff_days(),
        dry_run
    );

    let archive = Archiver::archive_old_entries(
        root,
        &archive_dir,
        &[today_dir.as_path()],
        config.cutoff_days(),
        config.today(),
        dry_run,
    )?;

    // A dry run leaves the tree as it is, so later steps must skip entries
    // that earlier steps only planned to archive or remove.
    let mut planned_away: Vec<PathBuf> = Vec::new();
    if dry_run {
        planned_away.extend(
            archive
                .archived
                .iter()
                .filter_map(|dest| dest.file_name())
                .map(|name| root.join(name)),
        );
    }

    let mut reap_protected = vec![today_dir.as_path(), archive_dir.as_path()];
    reap_protected.extend(planned_away.iter().map(PathBuf::as_path));
    let reap = Reaper::remove_empty_directories(root, &reap_protected, dry_run)?;
    if dry_run {
        planned_away.extend(reap.removed.iter().cloned());
    }

    let (today_dir, created_today) =
        Provisioner::provision_today(root, config.today_name(), dry_run).map_err(|source| {
            CleanerError::TodaySetup {
                path: today_dir.clone(),
                source,
            }
        })?;

    let link = Provisioner::refresh_link(&link_path, &today_dir, config.create_link(), dry_run);

    let options = SweepOptions {
        include_hidden: config.include_hidden(),
        dry_run,
    };
    let mut sweeps = Vec::new();

    let own_policy = working_root_policy(&link_path, &archive_dir, config.date_format());
    let root_exclude =
        |item: &Path| own_policy(item) || planned_away.iter().any(|p| same_entry(item, p));
    sweeps.push(Sweeper::sweep(root, &today_dir, &root_exclude, options));

    let exceptions = source_policy(config.exceptions());
    for source in config.sources() {
        sweeps.push(Sweeper::sweep(source, &today_dir, &exceptions, options));
    }

    let report = RunReport {
        date: config.today(),
        dry_run,
        today_dir,
        created_today,
        archive,
        reap,
        link,
        sweeps,
    };

    info!(
        "event=run_complete archived={} removed={} moved={} warnings={}",
        report.archive.archived.len(),
        report.reap.removed.len(),
        report.moved_count(),
        report.warning_count()
    );

    Ok(report)
}
