//! Undo support for reverting an organize run.
//!
//! Moves files back to their original locations based on the recorded
//! operation history. Restoration runs in reverse order, and a file that
//! meanwhile reappeared at the original location is backed up rather than
//! overwritten.

use crate::organizer::{MoveRecord, OperationLog, OrganizeError, OrganizeResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Represents the result of an undo operation.
#[derive(Debug)]
pub struct UndoReport {
    /// Number of files successfully restored.
    pub restored_files: usize,
    /// Files that failed to restore, with the reason.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files that were skipped (e.g., no longer at the organized location).
    pub skipped_files: Vec<(PathBuf, String)>,
}

impl UndoReport {
    fn new() -> Self {
        Self {
            restored_files: 0,
            failed_restores: Vec::new(),
            skipped_files: Vec::new(),
        }
    }

    /// Returns true if every recorded move was reverted.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

/// Reverts the moves recorded by a previous organize run.
pub struct UndoManager;

impl UndoManager {
    /// Undoes the most recent organize run under `base_path`.
    ///
    /// Loads the operation history, restores each move in reverse order,
    /// and deletes the history file only if every restore succeeded.
    ///
    /// # Edge Cases Handled
    ///
    /// * **File not found**: skipped with a note that the file is missing
    /// * **Occupied original location**: the occupying file is backed up
    ///   with a timestamp suffix before the restore
    /// * **Permission denied**: recorded as a failure with the error reason
    /// * **Missing history**: returns an error indicating no undo is
    ///   available
    ///
    /// # Errors
    ///
    /// Returns an error if `base_path` does not exist, or if the history
    /// file is missing or corrupted. Per-file problems are reported in the
    /// `UndoReport` instead.
    pub fn undo(base_path: &Path) -> OrganizeResult<UndoReport> {
        if !base_path.exists() {
            return Err(OrganizeError::InvalidSourcePath {
                path: base_path.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "source folder does not exist",
                ),
            });
        }

        let log = OperationLog::load(base_path)?;
        let log = log.ok_or_else(|| OrganizeError::InvalidHistoryFormat {
            reason: "No previous organization found to undo".to_string(),
        })?;

        // Undo is LIFO: reverse the recorded order.
        let mut report = UndoReport::new();
        for record in log.operations.iter().rev() {
            match Self::restore_file(record) {
                Ok(()) => {
                    report.restored_files += 1;
                }
                Err((path, reason)) => {
                    if reason.contains("not found") {
                        report.skipped_files.push((path, reason));
                    } else {
                        report.failed_restores.push((path, reason));
                    }
                }
            }
        }

        if report.is_complete_success()
            && let Err(e) = OperationLog::delete(base_path)
        {
            eprintln!("Warning: Could not delete history file: {}", e);
        }

        Ok(report)
    }

    /// Restores a single file to its original location.
    fn restore_file(record: &MoveRecord) -> Result<(), (PathBuf, String)> {
        if !record.new_path.exists() {
            return Err((
                record.new_path.clone(),
                "File not found at organized location".to_string(),
            ));
        }

        if record.original_path.exists() {
            let backup_path = Self::generate_backup_path(&record.original_path);
            fs::rename(&record.original_path, &backup_path).map_err(|e| {
                (
                    record.original_path.clone(),
                    format!("Could not backup conflicting file: {}", e),
                )
            })?;
        }

        fs::rename(&record.new_path, &record.original_path).map_err(|e| {
            (
                record.new_path.clone(),
                format!("Failed to restore file: {}", e),
            )
        })?;

        Ok(())
    }

    /// Generates a backup path for a file by appending a timestamp.
    ///
    /// Example: `file.txt` becomes `file.txt.bak.20260807-143052`
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let filename = original_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("file");

        let backup_name = format!("{}.bak.{}", filename, timestamp);

        if let Some(parent) = original_path.parent() {
            parent.join(backup_name)
        } else {
            PathBuf::from(backup_name)
        }
    }
}
