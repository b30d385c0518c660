//! Command-line interface module.
//!
//! This module handles all CLI-related functionality including:
//! - Command dispatch (organize, dry-run, undo)
//! - Configuration loading and command-line overrides
//! - Console reporting of moves, failures, and summaries
//! - Operation history recording for undo

use crate::config::Config;
use crate::organizer::{OperationLog, OrganizeOptions, OrganizeReport, Organizer};
use crate::output::OutputFormatter;
use crate::undo::UndoManager;
use std::path::Path;

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy)]
pub enum OrganizeCommand {
    /// Organize files in a directory.
    Organize {
        /// If true, simulate the operation without making changes.
        dry_run: bool,
    },
    /// Undo the previous organization.
    Undo,
}

/// Command-line overrides applied on top of the configuration file.
#[derive(Debug, Clone, Default)]
pub struct OrganizeOverrides {
    /// Force flatten mode regardless of the configured value.
    pub flatten: bool,
    /// Destination root name, replacing the configured value.
    pub destination: Option<String>,
}

/// Runs the CLI application with the given command and directory path,
/// using the default configuration lookup and no overrides.
///
/// # Examples
///
/// ```no_run
/// use extidy::cli::{OrganizeCommand, run_cli};
/// use std::path::Path;
///
/// let result = run_cli(
///     OrganizeCommand::Organize { dry_run: false },
///     Path::new("/path/to/directory"),
/// );
/// match result {
///     Ok(()) => println!("Operation completed successfully"),
///     Err(e) => eprintln!("Error: {}", e),
/// }
/// ```
pub fn run_cli(command: OrganizeCommand, dir_path: &Path) -> Result<(), String> {
    run_cli_with_config(command, dir_path, OrganizeOverrides::default(), None)
}

/// Runs the CLI application with explicit overrides and an optional
/// configuration file path.
pub fn run_cli_with_config(
    command: OrganizeCommand,
    dir_path: &Path,
    overrides: OrganizeOverrides,
    config_path: Option<&Path>,
) -> Result<(), String> {
    match command {
        OrganizeCommand::Organize { dry_run } => {
            organize_directory(dir_path, overrides, config_path, dry_run)
        }
        OrganizeCommand::Undo => undo_organization(dir_path),
    }
}

/// Builds an organizer from the configuration file and CLI overrides.
///
/// A `--flatten` flag forces flatten mode; a `--dest` value replaces the
/// configured destination root name. The destination root lives inside the
/// source folder.
fn build_organizer(
    dir_path: &Path,
    overrides: OrganizeOverrides,
    config_path: Option<&Path>,
) -> Result<Organizer, String> {
    let config = Config::load(config_path)
        .map_err(|e| format!("Error loading configuration: {}", e))?;
    let settings = config.organize.clone();
    let filters = config
        .compile()
        .map_err(|e| format!("Error compiling filters: {}", e))?;

    let destination = overrides.destination.unwrap_or(settings.destination);
    let options = OrganizeOptions {
        flatten: overrides.flatten || settings.flatten,
    };

    Ok(Organizer::new(&dir_path.join(destination), options, filters))
}

/// Organizes files under `dir_path` into per-extension folders.
///
/// The run is planned first, then each move is applied individually so that
/// a single failed move never aborts the batch. Successful moves are
/// recorded and saved as history for a later undo.
fn organize_directory(
    dir_path: &Path,
    overrides: OrganizeOverrides,
    config_path: Option<&Path>,
    dry_run: bool,
) -> Result<(), String> {
    if dry_run {
        OutputFormatter::info(&format!(
            "DRY RUN: Analyzing contents of: {}",
            dir_path.display()
        ));
    } else {
        OutputFormatter::info(&format!("Organizing contents of: {}", dir_path.display()));
    }

    let organizer = build_organizer(dir_path, overrides, config_path)?;
    let plan = organizer.plan(dir_path).map_err(|e| e.to_string())?;

    if plan.moves.is_empty() {
        for (path, reason) in &plan.failures {
            OutputFormatter::error(&format!("{}: {}", path.display(), reason));
        }
        if plan.skipped > 0 {
            OutputFormatter::plain(&format!(
                "No files to move ({} without an extension left in place).",
                plan.skipped
            ));
        } else {
            OutputFormatter::plain("No files to move.");
        }
        return Ok(());
    }

    if dry_run {
        for record in &plan.moves {
            let name = display_name(&record.original_path);
            let folder = record.new_path.parent().unwrap_or(Path::new(""));
            OutputFormatter::dry_run_notice(&OutputFormatter::move_line(&name, folder, dir_path));
        }
        OutputFormatter::report_summary(&plan);
        OutputFormatter::success("Dry run complete. No files were modified.");
        return Ok(());
    }

    let mut report = OrganizeReport {
        moves: Vec::with_capacity(plan.moves.len()),
        skipped: plan.skipped,
        failures: plan.failures,
    };
    let mut operation_log = OperationLog::new(dir_path.to_path_buf());

    let pb = OutputFormatter::create_progress_bar(plan.moves.len() as u64);
    for record in plan.moves {
        match organizer.apply(&record) {
            Ok(()) => {
                let name = display_name(&record.original_path);
                let folder = record.new_path.parent().unwrap_or(Path::new(""));
                let line = OutputFormatter::move_line(&name, folder, dir_path);
                pb.suspend(|| OutputFormatter::success(&line));
                operation_log.add_operation(record.clone());
                report.moves.push(record);
            }
            Err(e) => {
                pb.suspend(|| OutputFormatter::error(&e.to_string()));
                report
                    .failures
                    .push((record.original_path.clone(), e.to_string()));
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    if !report.moves.is_empty() {
        match operation_log.save(dir_path) {
            Ok(()) => {
                OutputFormatter::report_summary(&report);
                OutputFormatter::success("Organization complete!");
                OutputFormatter::plain(&format!(
                    "History saved. Use 'extidy {} --undo' to revert changes.",
                    dir_path.display()
                ));
            }
            Err(e) => {
                OutputFormatter::warning(&format!("Could not save history: {}", e));
                OutputFormatter::report_summary(&report);
            }
        }
    } else {
        OutputFormatter::report_summary(&report);
    }

    if !report.is_clean() {
        OutputFormatter::warning("Some files could not be organized. Please review errors above.");
    }

    Ok(())
}

/// Undoes the previous file organization operation.
fn undo_organization(dir_path: &Path) -> Result<(), String> {
    OutputFormatter::info("Undoing previous organization...");

    match UndoManager::undo(dir_path) {
        Ok(report) => {
            OutputFormatter::success("Undo complete!");
            OutputFormatter::plain(&format!("  Restored: {}", report.restored_files));

            if !report.skipped_files.is_empty() {
                OutputFormatter::plain(&format!("  Skipped: {}", report.skipped_files.len()));
                for (path, reason) in &report.skipped_files {
                    OutputFormatter::plain(&format!("    - {}: {}", path.display(), reason));
                }
            }

            if !report.failed_restores.is_empty() {
                OutputFormatter::plain(&format!("  Failed: {}", report.failed_restores.len()));
                for (path, reason) in &report.failed_restores {
                    OutputFormatter::error(&format!("    - {}: {}", path.display(), reason));
                }
                OutputFormatter::warning("History file was NOT deleted due to failures.");
                OutputFormatter::warning("Please fix the issues and try again.");
            }

            Ok(())
        }
        Err(e) => Err(format!("Error: {}", e)),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
