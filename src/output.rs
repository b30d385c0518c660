//! Console output formatting.
//!
//! All user-facing output goes through this module: styled status lines,
//! the per-extension summary table, and progress bars for large batches.

use crate::organizer::OrganizeReport;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::Path;

/// Manages all CLI output with consistent styling.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a regular message without styling.
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Formats the standard per-move line.
    ///
    /// Destination folders are shown relative to the organized folder when
    /// possible, so the line reads `Moved a.txt to organized/txt` rather
    /// than spelling out the full path.
    pub fn move_line(name: &str, destination_folder: &Path, base: &Path) -> String {
        let shown = destination_folder
            .strip_prefix(base)
            .unwrap_or(destination_folder);
        format!("Moved {} to {}", name, shown.display())
    }

    /// Creates a progress bar for a batch of file moves.
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("█▓░"),
        );
        pb
    }

    /// Prints a summary of an organize run: files per extension folder,
    /// skipped files, and failures.
    pub fn report_summary(report: &OrganizeReport) {
        Self::header("SUMMARY");

        let mut extension_counts: HashMap<&str, usize> = HashMap::new();
        for record in &report.moves {
            *extension_counts.entry(record.extension.as_str()).or_insert(0) += 1;
        }

        let mut extensions: Vec<_> = extension_counts.iter().collect();
        extensions.sort_by_key(|&(name, _)| name);

        let width = extensions
            .iter()
            .map(|(name, _)| name.len())
            .max()
            .unwrap_or(0)
            .max("Extension".len());

        println!(
            "{:<width$} | {}",
            "Extension".bold(),
            "Files".bold(),
            width = width
        );
        println!("{}", "-".repeat(width + 10));
        for (extension, count) in &extensions {
            println!(
                "{:<width$} | {} {}",
                extension,
                count.to_string().green(),
                if **count == 1 { "file" } else { "files" },
                width = width
            );
        }
        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {} moved, {} skipped (no extension)",
            "Total".bold(),
            report.moves.len().to_string().green().bold(),
            report.skipped,
            width = width
        );

        if !report.failures.is_empty() {
            Self::header("FAILURES");
            for (path, reason) in &report.failures {
                Self::error(&format!("{}: {}", path.display(), reason));
            }
        }
    }
}
