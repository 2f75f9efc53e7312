//! End-to-end tests of the `workclean` binary: exit codes, config file
//! handling and output modes.

use assert_cmd::Command;
use chrono::{Duration, Local};
use filetime::FileTime;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::{TempDir, tempdir};

fn workclean(config: &Path) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("workclean");
    cmd.env_remove("RUST_LOG").arg("--config").arg(config);
    cmd
}

/// A temp dir with a `work` root, a `Desktop` and an empty config file.
fn setup() -> (TempDir, std::path::PathBuf) {
    let tmp = tempdir().expect("tempdir");
    fs::create_dir(tmp.path().join("work")).expect("mkdir work");
    fs::create_dir(tmp.path().join("Desktop")).expect("mkdir Desktop");
    let config = tmp.path().join("config.toml");
    fs::write(&config, "").expect("write config");
    (tmp, config)
}

fn age_dir(path: &Path, days: i64) {
    let when = (Local::now().date_naive() - Duration::days(days))
        .and_hms_opt(12, 0, 0)
        .unwrap()
        .and_local_timezone(Local)
        .earliest()
        .unwrap();
    filetime::set_file_mtime(path, FileTime::from_unix_time(when.timestamp(), 0)).unwrap();
}

fn today_name() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[test]
fn missing_working_root_exits_with_failure() {
    let (tmp, config) = setup();

    workclean(&config)
        .current_dir(tmp.path())
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("no working root given"));
}

#[test]
fn nonexistent_working_root_exits_with_failure() {
    let (tmp, config) = setup();

    workclean(&config)
        .arg("-w")
        .arg(tmp.path().join("nowhere"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn unsafe_archive_name_aborts_without_touching_the_tree() {
    let (tmp, config) = setup();
    let work = tmp.path().join("work");
    fs::write(tmp.path().join("Desktop").join("report.txt"), "r").unwrap();

    workclean(&config)
        .arg("-w")
        .arg(&work)
        .arg("-d")
        .arg(tmp.path().join("Desktop"))
        .args(["--archive-name", "../evil"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("archive directory cannot be named"));

    assert!(fs::read_dir(&work).unwrap().next().is_none());
    assert!(!tmp.path().join("evil").exists());
    assert!(tmp.path().join("Desktop").join("report.txt").is_file());
}

#[test]
fn invalid_date_format_exits_with_failure() {
    let (tmp, config) = setup();

    workclean(&config)
        .arg("-w")
        .arg(tmp.path().join("work"))
        .args(["--date-format", "%Y/%m/%d"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid date format"));
}

#[test]
fn explicit_config_file_must_exist() {
    let (tmp, _config) = setup();

    workclean(&tmp.path().join("absent.toml"))
        .arg("-w")
        .arg(tmp.path().join("work"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn config_file_settings_apply_and_command_line_wins() {
    let (tmp, config) = setup();
    let work = tmp.path().join("work");
    let desktop = tmp.path().join("Desktop");
    fs::write(desktop.join("desktop.ini"), "ini").unwrap();
    fs::write(desktop.join("notes.txt"), "n").unwrap();
    let stale = work.join("2024-01-01");
    fs::create_dir(&stale).unwrap();
    fs::write(stale.join("a.txt"), "a").unwrap();
    age_dir(&stale, 10);

    fs::write(
        &config,
        format!(
            "working_root = {:?}\ndesktop = {:?}\ncutoff_days = 60\narchive_name = \"OLD\"\n\n[exceptions]\nnames = [\"desktop.ini\"]\n",
            work.to_string_lossy(),
            desktop.to_string_lossy()
        ),
    )
    .unwrap();

    workclean(&config)
        .args(["--cutoff-days", "7", "-q"])
        .assert()
        .success();

    assert!(work.join("OLD").join("2024-01-01").join("a.txt").is_file());
    assert!(work.join(today_name()).join("notes.txt").is_file());
    assert!(desktop.join("desktop.ini").is_file());
}

#[test]
fn json_report_describes_the_run() {
    let (tmp, config) = setup();
    let work = tmp.path().join("work");
    fs::write(tmp.path().join("Desktop").join("report.txt"), "r").unwrap();

    let output = workclean(&config)
        .arg("-w")
        .arg(&work)
        .arg("-d")
        .arg(tmp.path().join("Desktop"))
        .args(["--json", "--create-link", "false"])
        .output()
        .expect("run workclean");

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json stdout");
    assert_eq!(report["dry_run"], false);
    assert_eq!(report["created_today"], true);
    assert_eq!(report["link"]["status"], "disabled");
    assert_eq!(report["sweeps"][1]["moved"].as_array().unwrap().len(), 1);
    assert!(work.join(today_name()).join("report.txt").is_file());
}

#[test]
fn dry_run_prints_summary_and_changes_nothing() {
    let (tmp, config) = setup();
    let work = tmp.path().join("work");
    fs::write(tmp.path().join("Desktop").join("report.txt"), "r").unwrap();

    workclean(&config)
        .arg("-w")
        .arg(&work)
        .arg("-d")
        .arg(tmp.path().join("Desktop"))
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"))
        .stdout(predicate::str::contains("Moved"));

    assert!(fs::read_dir(&work).unwrap().next().is_none());
    assert!(tmp.path().join("Desktop").join("report.txt").is_file());
}
