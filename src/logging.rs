//! Logging bootstrap.
//!
//! Operational events go through the `log` facade as one line each:
//! `<timestamp> <LEVEL> event=<name> key=value ...`. `env_logger` writes them
//! to stderr; `RUST_LOG` overrides the level chosen on the command line.

use chrono::{Local, SecondsFormat};
use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Maps `-v`/`-q` counts to a level. Info is the default.
pub fn level_for(verbose: u8, quiet: u8) -> LevelFilter {
    match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => LevelFilter::Error,
        -1 => LevelFilter::Warn,
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Installs the global logger.
///
/// Calling it more than once is harmless; later calls are ignored.
pub fn init_logging(level: LevelFilter) {
    let default_filter = format!("{}={}", env!("CARGO_CRATE_NAME"), level);
    let _ = Builder::from_env(Env::default().default_filter_or(default_filter))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<5} {}",
                Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
                record.level(),
                record.args()
            )
        })
        .try_init();
}

/// Suffix appended to event lines emitted during a dry run.
pub(crate) fn dry_run_tag(dry_run: bool) -> &'static str {
    if dry_run { " dry_run=true" } else { "" }
}
