//! Run configuration.
//!
//! A run is driven by one immutable [`CleanerConfig`], built once from the
//! command line layered over an optional TOML file:
//! 1. If `--config <FILE>` is given, load that file (it must exist)
//! 2. Otherwise look for `workclean/config.toml` in the platform config
//!    directory (`~/.config` on Linux)
//! 3. Fall back to built-in defaults
//!
//! Command-line values win over file values.
//!
//! # Configuration File Format
//!
//! ```toml
//! working_root = "~/Work"
//! archive_name = "ARCHIVE"
//! cutoff_days = 30
//! date_format = "%Y-%m-%d"
//! create_link = true
//! link_name = "today"
//! desktop = "~/Desktop"
//! clean_folders = ["~/Downloads"]
//! include_hidden = false
//!
//! [exceptions]
//! names = ["desktop.ini"]
//! patterns = ["*.lnk"]
//! regex = []
//! ```

use crate::error::ConfigError;
use crate::path_classifier::{is_dated_name, is_safe_name};
use chrono::NaiveDate;
use chrono::format::{Item, StrftimeItems};
use glob::Pattern;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_ARCHIVE_NAME: &str = "ARCHIVE";
pub const DEFAULT_CUTOFF_DAYS: u32 = 30;
pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";
pub const DEFAULT_LINK_NAME: &str = "today";

/// Settings as read from the TOML file. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub working_root: Option<PathBuf>,
    pub archive_name: Option<String>,
    pub cutoff_days: Option<u32>,
    pub date_format: Option<String>,
    pub create_link: Option<bool>,
    pub link_name: Option<String>,
    pub desktop: Option<PathBuf>,
    pub clean_folders: Vec<PathBuf>,
    pub include_hidden: Option<bool>,
    pub exceptions: ExceptionRules,
}

/// Items that external-source sweeps must leave in place.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExceptionRules {
    /// Exact names (e.g. "desktop.ini").
    pub names: Vec<String>,
    /// Glob patterns matched against the name (e.g. "*.lnk").
    pub patterns: Vec<String>,
    /// Regular expressions matched against the name.
    pub regex: Vec<String>,
}

impl FileConfig {
    /// Loads the configuration file, falling back to defaults when none exists.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicitly given file is missing, or if any
    /// file that is found cannot be read or parsed.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        if let Some(path) = Self::default_path()
            && path.is_file()
        {
            return Self::load_from_file(&path);
        }

        Ok(Self::default())
    }

    /// `<config dir>/workclean/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("workclean").join("config.toml"))
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }
}

/// Compiled exception rules.
#[derive(Debug, Clone, Default)]
pub struct ExceptionSet {
    names: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl ExceptionSet {
    /// Compiles exception rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex pattern is invalid.
    pub fn compile(rules: ExceptionRules) -> Result<Self, ConfigError> {
        let patterns = rules
            .patterns
            .iter()
            .map(|p| Pattern::new(p).map_err(|_| ConfigError::InvalidGlobPattern(p.clone())))
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = rules
            .regex
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            names: rules.names.into_iter().collect(),
            patterns,
            regexes,
        })
    }

    /// Builds a set of exact names only.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Returns true if `name` is exempt from sweeping.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
            || self.patterns.iter().any(|p| p.matches(name))
            || self.regexes.iter().any(|r| r.is_match(name))
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.patterns.is_empty() && self.regexes.is_empty()
    }
}

/// Command-line values. `None` (or empty) means "not given".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub working_root: Option<PathBuf>,
    pub archive_name: Option<String>,
    pub cutoff_days: Option<u32>,
    pub date_format: Option<String>,
    pub create_link: Option<bool>,
    pub link_name: Option<String>,
    pub desktop: Option<PathBuf>,
    pub clean_folders: Vec<PathBuf>,
    pub exceptions: Vec<String>,
    pub include_hidden: bool,
    pub dry_run: bool,
}

/// Immutable configuration for one run.
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    working_root: PathBuf,
    archive_name: String,
    cutoff_days: i64,
    date_format: String,
    today: NaiveDate,
    today_name: String,
    create_link: bool,
    link_name: String,
    desktop: Option<PathBuf>,
    clean_folders: Vec<PathBuf>,
    exceptions: ExceptionSet,
    include_hidden: bool,
    dry_run: bool,
}

impl CleanerConfig {
    /// Merges file and command-line settings and validates the result.
    ///
    /// Nothing on disk is modified. The working root must already exist.
    ///
    /// # Errors
    ///
    /// Returns an error for unsafe archive or link names, an unusable date
    /// format, invalid exception patterns, or a missing working root.
    pub fn resolve(
        file: FileConfig,
        overrides: Overrides,
        today: NaiveDate,
    ) -> Result<Self, ConfigError> {
        let archive_name = overrides
            .archive_name
            .or(file.archive_name)
            .unwrap_or_else(|| DEFAULT_ARCHIVE_NAME.to_string());
        if !is_safe_name(&archive_name) {
            return Err(ConfigError::UnsafeName {
                what: "archive directory",
                name: archive_name,
            });
        }

        let link_name = overrides
            .link_name
            .or(file.link_name)
            .unwrap_or_else(|| DEFAULT_LINK_NAME.to_string());
        if !is_safe_name(&link_name) {
            return Err(ConfigError::UnsafeName {
                what: "today link",
                name: link_name,
            });
        }

        let date_format = overrides
            .date_format
            .or(file.date_format)
            .unwrap_or_else(|| DEFAULT_DATE_FORMAT.to_string());
        let today_name = dated_name(today, &date_format)?;

        let mut rules = file.exceptions;
        rules.names.extend(
            overrides
                .exceptions
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
        );
        let exceptions = ExceptionSet::compile(rules)?;

        let working_root = overrides
            .working_root
            .or(file.working_root)
            .ok_or(ConfigError::MissingWorkingRoot)?;
        let working_root = expand_home(&working_root);
        if !working_root.is_dir() {
            return Err(ConfigError::WorkingRootNotDirectory { path: working_root });
        }
        let working_root = fs::canonicalize(&working_root)?;

        let clean_folders = if overrides.clean_folders.is_empty() {
            file.clean_folders
        } else {
            overrides.clean_folders
        };

        Ok(Self {
            working_root,
            archive_name,
            cutoff_days: i64::from(
                overrides
                    .cutoff_days
                    .or(file.cutoff_days)
                    .unwrap_or(DEFAULT_CUTOFF_DAYS),
            ),
            date_format,
            today,
            today_name,
            create_link: overrides.create_link.or(file.create_link).unwrap_or(true),
            link_name,
            desktop: overrides.desktop.or(file.desktop).map(|p| expand_home(&p)),
            clean_folders: clean_folders.iter().map(|p| expand_home(p)).collect(),
            exceptions,
            include_hidden: overrides.include_hidden || file.include_hidden.unwrap_or(false),
            dry_run: overrides.dry_run,
        })
    }

    pub fn working_root(&self) -> &Path {
        &self.working_root
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.working_root.join(&self.archive_name)
    }

    pub fn today_dir(&self) -> PathBuf {
        self.working_root.join(&self.today_name)
    }

    pub fn today_name(&self) -> &str {
        &self.today_name
    }

    pub fn link_path(&self) -> PathBuf {
        self.working_root.join(&self.link_name)
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn cutoff_days(&self) -> i64 {
        self.cutoff_days
    }

    pub fn date_format(&self) -> &str {
        &self.date_format
    }

    pub fn create_link(&self) -> bool {
        self.create_link
    }

    /// The desktop (if any) followed by the clean folders, in sweep order.
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        self.desktop
            .iter()
            .chain(self.clean_folders.iter())
            .map(PathBuf::as_path)
    }

    pub fn exceptions(&self) -> &ExceptionSet {
        &self.exceptions
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }
}

/// Formats `date` with `format` and checks the result is usable as the name
/// of a dated directory that later runs will recognise.
pub fn dated_name(date: NaiveDate, format: &str) -> Result<String, ConfigError> {
    let invalid = |reason: &str| ConfigError::InvalidDateFormat {
        format: format.to_string(),
        reason: reason.to_string(),
    };

    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(invalid("unknown format specifier"));
    }
    if !StrftimeItems::new(format).any(|item| matches!(item, Item::Numeric(..) | Item::Fixed(_))) {
        return Err(invalid("contains no date fields"));
    }

    let mut name = String::new();
    write!(name, "{}", date.format(format))
        .map_err(|_| invalid("uses fields a calendar date cannot supply"))?;

    if name.is_empty() || name == "." || name == ".." {
        return Err(invalid("produces an empty directory name"));
    }
    if name.chars().any(std::path::is_separator) {
        return Err(invalid("produces a path separator"));
    }
    if !is_dated_name(&name, format) {
        return Err(invalid("formatted names cannot be parsed back into dates"));
    }
    Ok(name)
}

/// Expands a leading `~` to the home directory.
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
