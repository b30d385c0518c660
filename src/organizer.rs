//! Recursive extension-based file placement.
//!
//! This module walks a source directory tree, determines a destination
//! subfolder for each file from its extension, and moves files there. It
//! handles lazy destination-folder creation, exclusion of the destination
//! root from traversal, and operation history logging for undo support.

use crate::config::CompiledFilters;
use crate::extension::extension_of;
use serde_json::{Value, json};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the per-run history file written into the source root.
pub const HISTORY_FILE_NAME: &str = ".extidy_history.json";

/// A single file relocation, either planned or already performed.
///
/// Records the original and new paths of a file so that a run can be
/// reported and later undone.
#[derive(Debug, Clone)]
pub struct MoveRecord {
    /// Where the file was before the move.
    pub original_path: PathBuf,
    /// Where the file was moved to.
    pub new_path: PathBuf,
    /// The lower-cased extension that determined the destination folder.
    pub extension: String,
}

/// Outcome of an organize run (or of a dry-run plan).
///
/// Move records appear in the order the files were visited, which is
/// lexicographic by name within each directory.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Files moved (or, for a plan, files that would be moved).
    pub moves: Vec<MoveRecord>,
    /// Files left in place because they have no extension.
    pub skipped: usize,
    /// Entries that could not be processed, with the reason. These do not
    /// abort the run.
    pub failures: Vec<(PathBuf, String)>,
}

impl OrganizeReport {
    /// Returns true if every visited entry was handled without error.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Placement strategy options for an [`Organizer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizeOptions {
    /// When true, all extension folders are created directly under the
    /// destination root regardless of where in the source tree a file was
    /// found. When false, nested source directories get a mirrored subfolder
    /// under the destination root before their files are grouped by
    /// extension.
    pub flatten: bool,
}

/// Errors that can occur during organize, undo, and history operations.
#[derive(Debug)]
pub enum OrganizeError {
    /// The source path is missing or is not a directory.
    InvalidSourcePath {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to create a destination folder.
    DirectoryCreationFailed {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Failed to move a file to its destination folder.
    FileMoveFailure {
        source: PathBuf,
        destination: PathBuf,
        source_error: std::io::Error,
    },
    /// Failed to write the history file.
    HistoryWriteFailed { source: std::io::Error },
    /// Failed to read the history file.
    HistoryReadFailed { source: std::io::Error },
    /// The history file has an invalid format.
    InvalidHistoryFormat { reason: String },
}

impl std::fmt::Display for OrganizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSourcePath { path, source } => {
                write!(f, "Invalid source folder {}: {}", path.display(), source)
            }
            Self::DirectoryCreationFailed { path, source } => {
                write!(
                    f,
                    "Failed to create directory {}: {}",
                    path.display(),
                    source
                )
            }
            Self::FileMoveFailure {
                source,
                destination,
                source_error,
            } => {
                write!(
                    f,
                    "Failed to move {} to {}: {}",
                    source.display(),
                    destination.display(),
                    source_error
                )
            }
            Self::HistoryWriteFailed { source } => {
                write!(f, "Failed to write history file: {}", source)
            }
            Self::HistoryReadFailed { source } => {
                write!(f, "Failed to read history file: {}", source)
            }
            Self::InvalidHistoryFormat { reason } => {
                write!(f, "Invalid history file format: {}", reason)
            }
        }
    }
}

impl std::error::Error for OrganizeError {}

/// Result type for organize operations.
pub type OrganizeResult<T> = Result<T, OrganizeError>;

/// Walks a source tree and places files into per-extension folders.
///
/// The destination root and every extension folder under it are created
/// lazily, on the first file that needs them; re-running over an already
/// organized tree performs no moves. The destination root itself is never
/// traversed as a source, so a destination nested inside the source folder
/// cannot cause the organizer to re-process its own output.
///
/// # Examples
///
/// ```no_run
/// use extidy::config::Config;
/// use extidy::organizer::{OrganizeOptions, Organizer};
/// use std::path::Path;
///
/// let filters = Config::default().compile().expect("default filters compile");
/// let organizer = Organizer::new(
///     Path::new("downloads/organized"),
///     OrganizeOptions::default(),
///     filters,
/// );
/// let report = organizer.organize(Path::new("downloads")).expect("organize failed");
/// println!("moved {} files", report.moves.len());
/// ```
pub struct Organizer {
    dest_root: PathBuf,
    dest_root_abs: PathBuf,
    flatten: bool,
    filters: CompiledFilters,
}

impl Organizer {
    /// Creates an organizer that places files under `dest_root`.
    pub fn new(dest_root: &Path, options: OrganizeOptions, filters: CompiledFilters) -> Self {
        Self {
            dest_root: dest_root.to_path_buf(),
            dest_root_abs: lexical_absolute(dest_root),
            flatten: options.flatten,
            filters,
        }
    }

    /// Computes the moves a run would perform without touching the filesystem.
    ///
    /// The returned report contains the planned relocations in visit order,
    /// the count of extensionless files that would be left in place, and any
    /// entries that already cannot be processed (unreadable directories,
    /// destinations that are already occupied).
    ///
    /// # Errors
    ///
    /// Returns `OrganizeError::InvalidSourcePath` if `source_root` does not
    /// exist or is not a directory. Per-entry problems are reported in the
    /// `failures` field instead of failing the call.
    pub fn plan(&self, source_root: &Path) -> OrganizeResult<OrganizeReport> {
        let meta = fs::metadata(source_root).map_err(|e| OrganizeError::InvalidSourcePath {
            path: source_root.to_path_buf(),
            source: e,
        })?;
        if !meta.is_dir() {
            return Err(OrganizeError::InvalidSourcePath {
                path: source_root.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            });
        }

        let mut report = OrganizeReport::default();
        self.walk(source_root, &self.dest_root, &mut report);
        Ok(report)
    }

    /// Organizes the tree rooted at `source_root` in one call.
    ///
    /// Equivalent to [`plan`](Self::plan) followed by [`apply`](Self::apply)
    /// for each planned move. A failed move is recorded in the report and
    /// processing continues with the remaining files.
    pub fn organize(&self, source_root: &Path) -> OrganizeResult<OrganizeReport> {
        let plan = self.plan(source_root)?;
        let mut report = OrganizeReport {
            moves: Vec::with_capacity(plan.moves.len()),
            skipped: plan.skipped,
            failures: plan.failures,
        };

        for record in plan.moves {
            match self.apply(&record) {
                Ok(()) => report.moves.push(record),
                Err(e) => report
                    .failures
                    .push((record.original_path.clone(), e.to_string())),
            }
        }

        Ok(report)
    }

    /// Performs a single planned move.
    ///
    /// Creates the destination folder if it does not exist yet (a folder
    /// that is already present is not an error) and renames the file into
    /// it, preserving the base name. A file already occupying the
    /// destination path is reported as a `FileMoveFailure`; neither file is
    /// modified in that case.
    pub fn apply(&self, record: &MoveRecord) -> OrganizeResult<()> {
        if record.new_path.exists() {
            return Err(OrganizeError::FileMoveFailure {
                source: record.original_path.clone(),
                destination: record.new_path.clone(),
                source_error: io::Error::new(
                    io::ErrorKind::AlreadyExists,
                    "destination already occupied",
                ),
            });
        }

        if let Some(folder) = record.new_path.parent() {
            fs::create_dir_all(folder).map_err(|e| OrganizeError::DirectoryCreationFailed {
                path: folder.to_path_buf(),
                source: e,
            })?;
        }

        fs::rename(&record.original_path, &record.new_path).map_err(|e| {
            OrganizeError::FileMoveFailure {
                source: record.original_path.clone(),
                destination: record.new_path.clone(),
                source_error: e,
            }
        })
    }

    /// Visits one directory level, planning moves for its files and
    /// recursing into its subdirectories.
    fn walk(&self, dir: &Path, dest: &Path, report: &mut OrganizeReport) {
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                report
                    .failures
                    .push((dir.to_path_buf(), format!("could not read directory: {}", e)));
                return;
            }
        };

        let mut entries: Vec<fs::DirEntry> = entries.flatten().collect();
        entries.sort_by_key(|entry| entry.file_name());

        for entry in entries {
            let path = entry.path();
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(e) => {
                    report
                        .failures
                        .push((path, format!("could not read entry type: {}", e)));
                    continue;
                }
            };

            if file_type.is_dir() {
                // Never descend into already-organized output.
                if self.is_organized_output(&path) {
                    continue;
                }
                if !self.filters.should_include(&path) {
                    continue;
                }
                let child_dest = if self.flatten {
                    dest.to_path_buf()
                } else {
                    dest.join(entry.file_name())
                };
                self.walk(&path, &child_dest, report);
            } else if file_type.is_file() {
                let name = entry.file_name().to_string_lossy().to_string();
                if name == HISTORY_FILE_NAME {
                    continue;
                }
                if !self.filters.should_include(&path) {
                    continue;
                }
                match extension_of(&name) {
                    None => report.skipped += 1,
                    Some(extension) => {
                        let destination = dest.join(&extension).join(&name);
                        if destination.exists() {
                            report.failures.push((
                                path,
                                format!(
                                    "destination already occupied: {}",
                                    destination.display()
                                ),
                            ));
                        } else {
                            report.moves.push(MoveRecord {
                                original_path: path,
                                new_path: destination,
                                extension,
                            });
                        }
                    }
                }
            }
            // Symlinks and other entry kinds are left in place.
        }
    }

    /// Returns true if `candidate` is the destination root or nested in it.
    fn is_organized_output(&self, candidate: &Path) -> bool {
        lexical_absolute(candidate).starts_with(&self.dest_root_abs)
    }
}

/// Absolutizes a path lexically, without touching the filesystem.
///
/// The destination root may not exist yet when the exclusion check runs, so
/// canonicalization is not an option.
fn lexical_absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

/// A persisted record of the moves performed by one organize run.
///
/// Saved to disk in JSON format so a run can be reverted later.
#[derive(Debug, Clone)]
pub struct OperationLog {
    /// ISO 8601 timestamp of when the run occurred.
    pub timestamp: String,
    /// The source folder that was organized.
    pub base_path: PathBuf,
    /// All moves performed in the run, in execution order.
    pub operations: Vec<MoveRecord>,
}

impl OperationLog {
    /// Creates an empty log for a run over `base_path`.
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            base_path,
            operations: Vec::new(),
        }
    }

    /// Appends a performed move to this log.
    pub fn add_operation(&mut self, record: MoveRecord) {
        self.operations.push(record);
    }

    fn history_file_path(base_path: &Path) -> PathBuf {
        base_path.join(HISTORY_FILE_NAME)
    }

    /// Saves this log to the history file under `base_path`.
    pub fn save(&self, base_path: &Path) -> OrganizeResult<()> {
        let json = json!({
            "timestamp": self.timestamp,
            "base_path": self.base_path.to_string_lossy().to_string(),
            "operations": self.operations.iter().map(|record| {
                json!({
                    "original_path": record.original_path.to_string_lossy().to_string(),
                    "new_path": record.new_path.to_string_lossy().to_string(),
                    "extension": record.extension,
                })
            }).collect::<Vec<_>>(),
        });

        let json_string =
            serde_json::to_string_pretty(&json).map_err(|e| OrganizeError::HistoryWriteFailed {
                source: io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("JSON serialization failed: {}", e),
                ),
            })?;

        fs::write(Self::history_file_path(base_path), json_string)
            .map_err(|e| OrganizeError::HistoryWriteFailed { source: e })?;

        Ok(())
    }

    /// Loads the history file under `base_path`, if one exists.
    pub fn load(base_path: &Path) -> OrganizeResult<Option<Self>> {
        let history_path = Self::history_file_path(base_path);

        if !history_path.exists() {
            return Ok(None);
        }

        let json_string = fs::read_to_string(&history_path)
            .map_err(|e| OrganizeError::HistoryReadFailed { source: e })?;

        let json: Value = serde_json::from_str(&json_string).map_err(|e| {
            OrganizeError::InvalidHistoryFormat {
                reason: format!("JSON parse error: {}", e),
            }
        })?;

        let timestamp = required_str(&json, "timestamp")?.to_string();
        let base_path_str = required_str(&json, "base_path")?;

        let ops_array =
            json["operations"]
                .as_array()
                .ok_or_else(|| OrganizeError::InvalidHistoryFormat {
                    reason: "Missing or invalid 'operations' field".to_string(),
                })?;

        let operations: Result<Vec<_>, _> = ops_array
            .iter()
            .map(|op| {
                Ok(MoveRecord {
                    original_path: PathBuf::from(required_str(op, "original_path")?),
                    new_path: PathBuf::from(required_str(op, "new_path")?),
                    extension: required_str(op, "extension")?.to_string(),
                })
            })
            .collect();

        Ok(Some(OperationLog {
            timestamp,
            base_path: PathBuf::from(base_path_str),
            operations: operations?,
        }))
    }

    /// Deletes the history file under `base_path`, if present.
    pub fn delete(base_path: &Path) -> OrganizeResult<()> {
        let history_path = Self::history_file_path(base_path);
        if history_path.exists() {
            fs::remove_file(&history_path)
                .map_err(|e| OrganizeError::HistoryWriteFailed { source: e })?;
        }
        Ok(())
    }
}

fn required_str<'a>(value: &'a Value, field: &str) -> OrganizeResult<&'a str> {
    value[field]
        .as_str()
        .ok_or_else(|| OrganizeError::InvalidHistoryFormat {
            reason: format!("Missing or invalid '{}' field", field),
        })
}
