//! Launcher configuration.
//!
//! Configuration is optional: every field has a default that reproduces the
//! stock launch policy. A TOML file can retune strategy weights, rename the
//! external programs, change dispatch behavior, and exclude entries from
//! consideration.
//!
//! # Configuration File Format
//!
//! ```toml
//! [weights]
//! native = 40
//! windows = 25
//!
//! [programs]
//! wine = "wine64"
//! love = "love-11"
//!
//! [dispatch]
//! max_depth = 16
//! fallthrough = false
//! shell_scripts = "framework"   # or "shell"
//! sniffer = "file"              # or "content"
//!
//! [filters]
//! enable_hidden_files = true
//!
//! [filters.exclude]
//! filenames = ["uninstall.exe"]
//! patterns = ["**/redist/**"]
//! extensions = ["dll"]
//! regex = ["^setup.*"]
//!
//! [filters.include]
//! patterns = []
//! ```
//!
//! Excluded entries are still scanned; they just classify as "nothing".

use crate::mime_sniffer::SnifferKind;
use crate::strategy::Strategy;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".runanyrc.toml";

/// Errors that can occur during configuration loading and compiling.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// A `[weights]` key that names no strategy.
    #[error("Unknown strategy '{0}' in [weights]")]
    UnknownStrategy(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}': expected *.ext or dir/**")]
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(String),
}

/// Top-level launcher configuration, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LaunchConfig {
    /// Base weight overrides keyed by strategy name (`native`, `unzip`, ...).
    #[serde(default)]
    pub weights: HashMap<String, i64>,

    /// External program names.
    #[serde(default)]
    pub programs: Programs,

    /// Dispatch behavior.
    #[serde(default)]
    pub dispatch: DispatchSettings,

    /// Entry filtering rules.
    #[serde(default)]
    pub filters: FilterRules,
}

/// Names of the external programs each strategy shells out to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Programs {
    pub unzip: String,
    pub unrar: String,
    pub java: String,
    pub wine: String,
    pub love: String,
    pub shell: String,
    pub file: String,
}

impl Default for Programs {
    fn default() -> Self {
        Self {
            unzip: "unzip".to_string(),
            unrar: "unrar".to_string(),
            java: "java".to_string(),
            wine: "wine".to_string(),
            love: "love".to_string(),
            shell: "sh".to_string(),
            file: "file".to_string(),
        }
    }
}

/// Where `.sh` files are sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShellScriptMode {
    /// Hand the script to the LÖVE runner, as the launcher always has.
    #[default]
    Framework,
    /// Run the script with the configured shell.
    Shell,
}

/// Knobs for the dispatch loop.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchSettings {
    /// Maximum number of re-dispatches after extraction.
    pub max_depth: usize,
    /// Try the next-ranked candidate when the chosen one fails.
    pub fallthrough: bool,
    /// Where `.sh` files go.
    pub shell_scripts: ShellScriptMode,
    /// How extension-less files are sniffed.
    pub sniffer: SnifferKind,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            max_depth: 16,
            fallthrough: false,
            shell_scripts: ShellScriptMode::default(),
            sniffer: SnifferKind::default(),
        }
    }
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether hidden entries (starting with ".") may be launched. Defaults to true.
    #[serde(default = "default_enable_hidden_files")]
    pub enable_hidden_files: bool,

    /// Rules for excluding entries.
    #[serde(default)]
    pub exclude: ExcludeRules,

    /// Rules for including entries (whitelist, overrides exclude rules).
    #[serde(default)]
    pub include: IncludeRules,
}

impl Default for FilterRules {
    fn default() -> Self {
        Self {
            enable_hidden_files: default_enable_hidden_files(),
            exclude: ExcludeRules::default(),
            include: IncludeRules::default(),
        }
    }
}

fn default_enable_hidden_files() -> bool {
    true
}

/// Rules for excluding entries from launch selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names to exclude (e.g., "uninstall.exe").
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the scan root.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Extensions to exclude (e.g., "dll").
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

/// Rules for including entries, overriding exclude rules (whitelist).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IncludeRules {
    /// Glob patterns that override exclude rules.
    #[serde(default)]
    pub patterns: Vec<String>,
}

impl LaunchConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.runanyrc.toml` in the current directory
    /// 3. Look for `~/.config/runany/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any discovered file fails to parse.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_FILE);
        if local_config.exists() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("runany")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        tracing::debug!(path = %path.display(), "loaded configuration");

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Resolve `[weights]` into a complete strategy → weight table.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownStrategy` for keys that name no strategy.
    pub fn weight_table(&self) -> Result<HashMap<Strategy, i64>, ConfigError> {
        let mut table: HashMap<Strategy, i64> = Strategy::ALL
            .iter()
            .map(|strategy| (*strategy, strategy.default_weight()))
            .collect();

        for (name, weight) in &self.weights {
            let strategy = Strategy::from_name(name)
                .ok_or_else(|| ConfigError::UnknownStrategy(name.clone()))?;
            table.insert(strategy, *weight);
        }

        Ok(table)
    }

    /// Compile the filter rules for matching.
    pub fn compile_filters(&self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(&self.filters)
    }
}

/// Compiled filter structures for matching scanned entries.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
    include_patterns: Vec<Pattern>,
}

impl CompiledFilters {
    /// Create compiled filters from filter rules.
    ///
    /// # Errors
    ///
    /// Returns an error if any glob or regex patterns are invalid.
    fn new(rules: &FilterRules) -> Result<Self, ConfigError> {
        let compile_globs = |patterns: &[String]| {
            patterns
                .iter()
                .map(|pattern| {
                    Pattern::new(pattern)
                        .map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
                })
                .collect::<Result<Vec<_>, _>>()
        };

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
            exclude_filenames: rules.exclude.filenames.iter().cloned().collect(),
            exclude_extensions: rules
                .exclude
                .extensions
                .iter()
                .map(|ext| ext.trim_start_matches('.').to_lowercase())
                .collect(),
            exclude_patterns: compile_globs(rules.exclude.patterns.as_slice())?,
            exclude_regexes,
            include_patterns: compile_globs(rules.include.patterns.as_slice())?,
        })
    }

    /// Check whether an entry may be launched.
    ///
    /// `relative_path` is the entry's path relative to the scan root.
    ///
    /// Checks are performed in this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always allow
    /// 2. Hidden file filter - if hidden and disabled, exclude
    /// 3. Exact filename match - if matched, exclude
    /// 4. File extension match - if matched, exclude
    /// 5. Glob pattern match - if matched, exclude
    /// 6. Regex pattern match - if matched, exclude
    /// 7. Default: allow
    pub fn allows(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.matches_any(&self.include_patterns, relative_path) {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if let Some(ext) = relative_path.extension() {
            let ext_lower = ext.to_string_lossy().to_lowercase();
            if self.exclude_extensions.contains(&ext_lower) {
                return false;
            }
        }

        if self.matches_any(&self.exclude_patterns, relative_path) {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }

    fn matches_any(&self, patterns: &[Pattern], path: &Path) -> bool {
        patterns.iter().any(|pattern| pattern.matches_path(path))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: true,
            exclude_filenames: HashSet::new(),
            exclude_extensions: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters_with(exclude: ExcludeRules) -> CompiledFilters {
        let rules = FilterRules {
            exclude,
            ..Default::default()
        };
        CompiledFilters::new(&rules).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = LaunchConfig::default();
        assert!(config.filters.enable_hidden_files);
        assert_eq!(config.dispatch.max_depth, 16);
        assert!(!config.dispatch.fallthrough);
        assert_eq!(config.dispatch.shell_scripts, ShellScriptMode::Framework);
        assert_eq!(config.dispatch.sniffer, SnifferKind::File);
        assert_eq!(config.programs.wine, "wine");
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = LaunchConfig::from_toml("").unwrap();
        assert_eq!(config.programs.unzip, "unzip");
        assert!(config.weights.is_empty());
    }

    #[test]
    fn test_parse_full_toml() {
        let config = LaunchConfig::from_toml(
            r#"
            [weights]
            windows = 25

            [programs]
            wine = "wine64"

            [dispatch]
            max_depth = 4
            fallthrough = true
            shell_scripts = "shell"
            sniffer = "content"

            [filters.exclude]
            filenames = ["uninstall.exe"]
            "#,
        )
        .unwrap();

        assert_eq!(config.weights.get("windows"), Some(&25));
        assert_eq!(config.programs.wine, "wine64");
        assert_eq!(config.programs.java, "java");
        assert_eq!(config.dispatch.max_depth, 4);
        assert!(config.dispatch.fallthrough);
        assert_eq!(config.dispatch.shell_scripts, ShellScriptMode::Shell);
        assert_eq!(config.dispatch.sniffer, SnifferKind::Content);
        assert_eq!(config.filters.exclude.filenames, vec!["uninstall.exe"]);
        assert!(config.filters.enable_hidden_files);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let result = LaunchConfig::from_toml("[dispatch]\nmax_depth = \"deep\"");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = LaunchConfig::load(Some(Path::new("/non/existent/runany.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }

    #[test]
    fn test_weight_table_defaults_and_overrides() {
        let mut config = LaunchConfig::default();
        config.weights.insert("windows".to_string(), 50);

        let table = config.weight_table().unwrap();
        assert_eq!(table[&Strategy::Windows], 50);
        assert_eq!(table[&Strategy::Native], 40);
        assert_eq!(table[&Strategy::Nothing], 0);
        assert_eq!(table.len(), Strategy::ALL.len());
    }

    #[test]
    fn test_weight_table_rejects_unknown_strategy() {
        let mut config = LaunchConfig::default();
        config.weights.insert("steam".to_string(), 99);

        assert!(matches!(
            config.weight_table(),
            Err(ConfigError::UnknownStrategy(name)) if name == "steam"
        ));
    }

    #[test]
    fn test_hidden_files_allowed_by_default() {
        let compiled = LaunchConfig::default().compile_filters().unwrap();
        assert!(compiled.allows(Path::new(".game")));
    }

    #[test]
    fn test_hidden_files_excluded_when_disabled() {
        let rules = FilterRules {
            enable_hidden_files: false,
            ..Default::default()
        };
        let compiled = CompiledFilters::new(&rules).unwrap();
        assert!(!compiled.allows(Path::new(".game")));
        assert!(compiled.allows(Path::new("game")));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = filters_with(ExcludeRules {
            filenames: vec!["uninstall.exe".to_string()],
            ..Default::default()
        });

        assert!(!compiled.allows(Path::new("uninstall.exe")));
        assert!(!compiled.allows(Path::new("bin/uninstall.exe")));
        assert!(compiled.allows(Path::new("game.exe")));
    }

    #[test]
    fn test_exclude_extensions_case_insensitive() {
        let compiled = filters_with(ExcludeRules {
            extensions: vec!["dll".to_string(), ".BAT".to_string()],
            ..Default::default()
        });

        assert!(!compiled.allows(Path::new("steam_api.dll")));
        assert!(!compiled.allows(Path::new("STEAM_API.DLL")));
        assert!(!compiled.allows(Path::new("run.bat")));
        assert!(compiled.allows(Path::new("game.exe")));
    }

    #[test]
    fn test_exclude_glob_patterns() {
        let compiled = filters_with(ExcludeRules {
            patterns: vec!["**/redist/**".to_string()],
            ..Default::default()
        });

        assert!(!compiled.allows(Path::new("redist/vcredist.exe")));
        assert!(!compiled.allows(Path::new("game/redist/dx/setup.exe")));
        assert!(compiled.allows(Path::new("game/my_redist/setup.exe")));
    }

    #[test]
    fn test_exclude_regex() {
        let compiled = filters_with(ExcludeRules {
            regex: vec![r"(?i)^setup.*\.exe$".to_string()],
            ..Default::default()
        });

        assert!(!compiled.allows(Path::new("Setup.exe")));
        assert!(!compiled.allows(Path::new("dir/setup_x64.exe")));
        assert!(compiled.allows(Path::new("game.exe")));
    }

    #[test]
    fn test_include_overrides_exclude() {
        let rules = FilterRules {
            enable_hidden_files: true,
            exclude: ExcludeRules {
                extensions: vec!["exe".to_string()],
                ..Default::default()
            },
            include: IncludeRules {
                patterns: vec!["launcher.exe".to_string()],
            },
        };
        let compiled = CompiledFilters::new(&rules).unwrap();

        assert!(compiled.allows(Path::new("launcher.exe")));
        assert!(!compiled.allows(Path::new("other.exe")));
    }

    #[test]
    fn test_invalid_patterns_return_error() {
        let bad_regex = FilterRules {
            exclude: ExcludeRules {
                regex: vec!["[invalid(".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            CompiledFilters::new(&bad_regex),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));

        let bad_glob = FilterRules {
            exclude: ExcludeRules {
                patterns: vec!["[invalid".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            CompiledFilters::new(&bad_glob),
            Err(ConfigError::InvalidGlobPattern(_))
        ));
    }
}
