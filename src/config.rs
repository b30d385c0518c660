//! Configuration: organize settings and file filtering rules.
//!
//! Configuration is stored in TOML format. The `[organize]` table controls
//! placement (destination root name, flatten mode) and the `[filters]` table
//! controls which files are considered at all:
//!
//! ```toml
//! [organize]
//! flatten = false
//! destination = "organized"
//!
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = [".DS_Store", "Thumbs.db"]
//! patterns = ["*.tmp", "node_modules/**"]
//! extensions = ["bak", "tmp"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! Exclude rules support exact filenames, glob patterns, extensions, and
//! regex; include patterns form a whitelist that overrides every exclude
//! rule.

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Errors that can occur during configuration loading and filtering.
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    IoError(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ConfigNotFound(path) => {
                write!(f, "Configuration file not found: {}", path.display())
            }
            ConfigError::ConfigInvalid(msg) => write!(f, "Invalid configuration: {}", msg),
            ConfigError::InvalidGlobPattern(pattern) => {
                write!(
                    f,
                    "Invalid glob pattern '{}': expected *.ext or dir/**",
                    pattern
                )
            }
            ConfigError::InvalidRegexPattern { pattern, reason } => {
                write!(f, "Invalid regex pattern '{}': {}", pattern, reason)
            }
            ConfigError::IoError(msg) => write!(f, "IO error reading configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Top-level configuration, deserialized from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Placement settings.
    #[serde(default)]
    pub organize: OrganizeSettings,

    /// File filtering rules.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Settings that control where files are placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizeSettings {
    /// If true, all extension folders share the destination root directly
    /// instead of mirroring the source directory structure.
    #[serde(default)]
    pub flatten: bool,

    /// Name of the destination root created inside the source folder.
    #[serde(default = "default_destination")]
    pub destination: String,
}

impl Default for OrganizeSettings {
    fn default() -> Self {
        Self {
            flatten: false,
            destination: default_destination(),
        }
    }
}

fn default_destination() -> String {
    "organized".to_string()
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to include hidden files (starting with "."). Defaults to false.
    #[serde(default)]
    pub enable_hidden_files: bool,

    /// Rules for excluding files.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including files (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

/// Rules for excluding files from organization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact filenames to exclude (e.g., ".DS_Store", "Thumbs.db").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns to exclude (e.g., "*.tmp", "node_modules/**").
    #[serde(default)]
    pub patterns: Vec<String>,

    /// File extensions to exclude (e.g., "bak", "tmp", "log").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns to exclude (for advanced users).
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including files, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl Config {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.extidyrc.toml` in the current directory
    /// 3. Look for `~/.config/extidy/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(".extidyrc.toml");
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("extidy")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compile the filter rules into optimized structures for matching.
    ///
    /// # Errors
    ///
    /// Returns an error if any regex or glob patterns are invalid.
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.filters)
    }
}

/// Compiled, optimized filter structures for efficient file matching.
///
/// All glob and regex patterns are parsed once at configuration time so that
/// matching during the directory walk never reparses a pattern.
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = compile_globs(&rules.exclude.patterns)?;
        let include_patterns = compile_globs(&rules.include.patterns)?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            enable_hidden_files: rules.enable_hidden_files,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.to_lowercase())
                .collect(),
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check if an entry should be considered for organization.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden entry filter - if hidden and disabled, exclude
    /// 3. Exact filename match - if matched, exclude
    /// 4. File extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: include
    pub fn should_include(&self, file_path: &Path) -> bool {
        let file_name = file_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.matches_any(&self.include_patterns, file_path) {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = file_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.matches_any(&self.exclude_patterns, file_path) {
            return false;
        }

        if self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
        {
            return false;
        }

        true
    }

    fn matches_any(&self, patterns: &[Pattern], file_path: &Path) -> bool {
        patterns
            .iter()
            .any(|pattern| pattern.matches_path(file_path))
    }
}

fn compile_globs(patterns: &[String]) -> Result<Vec<Pattern>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters_with(rules: FilterRules) -> CompiledFilters {
        Config {
            organize: OrganizeSettings::default(),
            filters: rules,
        }
        .compile()
        .expect("filters should compile")
    }

    #[test]
    fn test_default_organize_settings() {
        let config = Config::default();
        assert!(!config.organize.flatten);
        assert_eq!(config.organize.destination, "organized");
    }

    #[test]
    fn test_default_config_hides_hidden_files() {
        let config = Config::default();
        assert!(!config.filters.enable_hidden_files);
    }

    #[test]
    fn test_parse_organize_section() {
        let config: Config = toml::from_str(
            r#"
            [organize]
            flatten = true
            destination = "sorted"
            "#,
        )
        .expect("valid TOML");

        assert!(config.organize.flatten);
        assert_eq!(config.organize.destination, "sorted");
    }

    #[test]
    fn test_missing_sections_fall_back_to_defaults() {
        let config: Config = toml::from_str("").expect("empty TOML is valid");
        assert_eq!(config.organize.destination, "organized");
        assert!(!config.filters.enable_hidden_files);
    }

    #[test]
    fn test_hidden_file_excluded_by_default() {
        let filters = filters_with(FilterRules::default());
        assert!(!filters.should_include(Path::new(".DS_Store")));
        assert!(!filters.should_include(Path::new(".gitignore")));
        assert!(filters.should_include(Path::new("image.jpg")));
    }

    #[test]
    fn test_hidden_file_included_when_enabled() {
        let filters = filters_with(FilterRules {
            enable_hidden_files: true,
            ..Default::default()
        });
        assert!(filters.should_include(Path::new(".DS_Store")));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let filters = filters_with(FilterRules {
            enable_hidden_files: true,
            exclude: ExcludeRules {
                filenames: vec!["Thumbs.db".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!filters.should_include(Path::new("Thumbs.db")));
        assert!(filters.should_include(Path::new("image.jpg")));
    }

    #[test]
    fn test_exclude_extensions_case_insensitive() {
        let filters = filters_with(FilterRules {
            enable_hidden_files: true,
            exclude: ExcludeRules {
                extensions: vec!["bak".to_string(), "tmp".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!filters.should_include(Path::new("file.bak")));
        assert!(!filters.should_include(Path::new("file.BAK")));
        assert!(!filters.should_include(Path::new("file.tmp")));
        assert!(filters.should_include(Path::new("file.txt")));
    }

    #[test]
    fn test_exclude_glob_respects_directory_boundaries() {
        let filters = filters_with(FilterRules {
            enable_hidden_files: true,
            exclude: ExcludeRules {
                patterns: vec!["**/logs/**".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!filters.should_include(Path::new("logs/file.txt")));
        assert!(!filters.should_include(Path::new("app/logs/file.txt")));
        assert!(filters.should_include(Path::new("my_logs/file.txt")));
    }

    #[test]
    fn test_exclude_regex() {
        let filters = filters_with(FilterRules {
            enable_hidden_files: true,
            exclude: ExcludeRules {
                regex: vec![r"^draft_.*\.txt$".to_string()],
                ..Default::default()
            },
            ..Default::default()
        });

        assert!(!filters.should_include(Path::new("draft_notes.txt")));
        assert!(filters.should_include(Path::new("notes.txt")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let filters = filters_with(FilterRules {
            enable_hidden_files: false,
            include: IncludeRules {
                patterns: vec![".important".to_string()],
            },
            ..Default::default()
        });

        assert!(filters.should_include(Path::new(".important")));
        assert!(!filters.should_include(Path::new(".other")));
    }

    #[test]
    fn test_invalid_regex_returns_error() {
        let config = Config {
            organize: OrganizeSettings::default(),
            filters: FilterRules {
                exclude: ExcludeRules {
                    regex: vec!["[invalid(".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        assert!(config.compile().is_err());
    }

    #[test]
    fn test_invalid_glob_returns_error() {
        let config = Config {
            organize: OrganizeSettings::default(),
            filters: FilterRules {
                exclude: ExcludeRules {
                    patterns: vec!["[invalid".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        assert!(config.compile().is_err());
    }
}
