//! Output formatting and styling module.
//!
//! The end-of-run summary goes to stdout, either as a colored table or as
//! JSON. Operational events are not printed here; they go through the
//! logger.

use crate::report::{LinkOutcome, RunReport};
use colored::*;

/// Manages end-of-run output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Prints the summary table for a finished run.
    ///
    /// # Example
    ///
    /// ```text
    /// SUMMARY 2024-03-10
    /// Step       | Count
    /// ------------------
    /// Archived   | 2
    /// Removed    | 1
    /// Moved      | 14
    /// Warnings   | 0
    /// ```
    pub fn summary_table(report: &RunReport) {
        Self::header(&format!("SUMMARY {}", report.date));
        if report.dry_run {
            Self::dry_run_notice("No files were modified.");
        }

        let rows = summary_rows(report);
        let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0).max(8);

        println!("{:<width$} | {}", "Step".bold(), "Count".bold(), width = width);
        println!("{}", "-".repeat(width + 10));
        for (label, count) in &rows {
            let count = if *label == "Warnings" && *count > 0 {
                count.to_string().yellow()
            } else {
                count.to_string().green()
            };
            println!("{:<width$} | {}", label, count, width = width);
        }
        println!("{}", "-".repeat(width + 10));

        println!("Today: {}", report.today_dir.display().to_string().cyan());
        if let LinkOutcome::Failed(reason) = &report.link {
            Self::warning(&format!("Could not create link: {}", reason));
        }
    }

    /// Prints the report as pretty JSON.
    pub fn json(report: &RunReport) -> serde_json::Result<()> {
        println!("{}", serde_json::to_string_pretty(report)?);
        Ok(())
    }
}

/// The rows of the summary table, in display order.
fn summary_rows(report: &RunReport) -> Vec<(&'static str, usize)> {
    vec![
        ("Archived", report.archive.archived.len()),
        ("Removed", report.reap.removed.len()),
        ("Moved", report.moved_count()),
        ("Warnings", report.warning_count()),
    ]
}
