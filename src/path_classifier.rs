//! Path and name predicates shared by the archiver, the reaper and the sweep.
//!
//! Everything here is read-only. Metadata failures are handed back to the
//! caller, which decides whether to skip the entry or abort.

use chrono::format::{Item, Numeric, Pad, ParseErrorKind, Parsed, StrftimeItems, parse};
use chrono::{DateTime, Local, NaiveDate};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Characters allowed in directory names besides letters and digits.
const SAFE_PUNCTUATION: [char; 6] = ['.', ',', '+', '-', '_', ' '];

/// Returns true if `path` is itself a symbolic link.
///
/// The link is not followed, so dangling links count too. A path that
/// does not exist is not a symlink.
pub fn is_symlink(path: &Path) -> bool {
    fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
}

/// Returns true if `name` parses against the strftime-style `format`.
///
/// A format without day fields (e.g. `%Y-%m`) still recognises names that
/// match every field it does contain; impossible dates such as
/// `2023-02-30` are rejected. Fields must be written plainly: a leading
/// sign or stray whitespace (`+2023-01-01`, `2023- 01-01`) does not count.
pub fn is_dated_name(name: &str, format: &str) -> bool {
    let parses = match NaiveDate::parse_from_str(name, format) {
        Ok(_) => true,
        Err(e) if e.kind() == ParseErrorKind::NotEnough => {
            let mut parsed = Parsed::new();
            parse(&mut parsed, name, StrftimeItems::new(format)).is_ok()
        }
        Err(_) => false,
    };
    parses && fields_are_plain(name, format)
}

/// Walks `name` alongside the items of `format`. Numeric fields must start
/// with an ASCII digit and fit their width, text fields must be letters,
/// and whitespace is only allowed where the format has it.
fn fields_are_plain(name: &str, format: &str) -> bool {
    let mut rest = name;
    for item in StrftimeItems::new(format) {
        let next = match &item {
            Item::Literal(lit) => rest.strip_prefix(*lit),
            Item::OwnedLiteral(lit) => rest.strip_prefix(&**lit),
            Item::Space(_) | Item::OwnedSpace(_) => Some(rest.trim_start()),
            Item::Numeric(numeric, pad) => {
                let field = if *pad == Pad::Space {
                    rest.trim_start_matches(' ')
                } else {
                    rest
                };
                let (min, max) = digit_width(numeric);
                take_digits(field, min, max)
            }
            Item::Fixed(_) => {
                let len = rest.chars().take_while(char::is_ascii_alphabetic).count();
                if len > 0 { Some(&rest[len..]) } else { None }
            }
            Item::Error => None,
        };
        match next {
            Some(remaining) => rest = remaining,
            None => return false,
        }
    }
    rest.is_empty()
}

/// Minimum and maximum number of digits a numeric field may span.
fn digit_width(numeric: &Numeric) -> (usize, usize) {
    match numeric {
        Numeric::Year | Numeric::IsoYear => (4, 4),
        Numeric::Quarter | Numeric::NumDaysFromSun | Numeric::WeekdayFromMon => (1, 1),
        Numeric::Ordinal => (1, 3),
        Numeric::Nanosecond => (1, 9),
        Numeric::Timestamp => (1, usize::MAX),
        _ => (1, 2),
    }
}

fn take_digits(s: &str, min: usize, max: usize) -> Option<&str> {
    let len = s.bytes().take(max).take_while(u8::is_ascii_digit).count();
    if len >= min { Some(&s[len..]) } else { None }
}

/// Whole calendar days between `today` and the local date of the last
/// modification of `path`.
///
/// Time of day plays no part: anything modified yesterday is one day old,
/// whether that was one hour or twenty-three hours ago.
pub fn age_in_days(path: &Path, today: NaiveDate) -> io::Result<i64> {
    let modified = fs::metadata(path)?.modified()?;
    let modified_on = DateTime::<Local>::from(modified).date_naive();
    Ok((today - modified_on).num_days())
}

/// Returns true if `path` is strictly older than `cutoff_days`.
pub fn is_older_than(path: &Path, cutoff_days: i64, today: NaiveDate) -> io::Result<bool> {
    Ok(age_in_days(path, today)? > cutoff_days)
}

/// Checks whether a string can be used as a directory name.
///
/// Only alphanumerics and `. , + - _ space` are allowed, and the name must
/// not be empty or consist solely of dots.
pub fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && !name.chars().all(|c| c == '.')
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || SAFE_PUNCTUATION.contains(&c))
}

/// Resolves a directory entry to a stable identity without following the
/// entry itself: the parent is canonicalized and the final component kept.
///
/// Returns `None` when the parent cannot be resolved.
fn entry_identity(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let parent = fs::canonicalize(parent).ok()?;
    Some(parent.join(name))
}

/// Returns true if `a` and `b` name the same directory entry.
///
/// Relative and absolute spellings of the same location compare equal, and
/// a symlink is identified by where it lives, not by what it points at.
pub fn same_entry(a: &Path, b: &Path) -> bool {
    match (entry_identity(a), entry_identity(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}
