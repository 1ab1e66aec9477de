//! Run configuration: roots, vocabularies, naming rules and file filters.
//!
//! Configuration is read from a TOML file and compiled into [`Settings`],
//! the validated structure the organizer runs on. Every section is optional
//! and falls back to the built-in icon vocabulary.
//!
//! # Configuration File Format
//!
//! ```toml
//! [paths]
//! source = "output_svgs"
//! destination = "systemui_svgs_ultimate"
//!
//! [naming]
//! prefixes = ["ic_", "abc_", "btn_", "icn_"]
//! extensions = ["svg"]
//!
//! [classification]
//! catch_all = "misc"
//! default_color = "default"
//! colors = ["black", "white"]
//!
//! [[classification.categories]]
//! name = "status_bar"
//! keywords = ["battery", "wifi"]
//!
//! [placement]
//! max_collision_attempts = 10000
//!
//! [filters]
//! enable_hidden_files = false
//!
//! [filters.exclude]
//! filenames = ["thumbs.svg"]
//! patterns = ["drafts/**"]
//! regex = []
//!
//! [filters.include]
//! patterns = []
//! ```

use crate::classifier::{
    CategoryTable, Classifier, ColorTable, DEFAULT_CATCH_ALL, DEFAULT_COLOR_TAG, DEFAULT_COLORS,
};
use crate::normalizer::{DEFAULT_PREFIXES, NameNormalizer, canonicalize};
use crate::placer::DEFAULT_MAX_COLLISION_ATTEMPTS;
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Source root used when neither the command line nor a config file sets one.
pub const DEFAULT_SOURCE_ROOT: &str = "output_svgs";

/// Destination root used when neither the command line nor a config file sets one.
pub const DEFAULT_DESTINATION_ROOT: &str = "systemui_svgs_ultimate";

/// Name of the per-directory configuration file.
pub const LOCAL_CONFIG_FILE: &str = ".iconsortrc.toml";

/// Errors that can occur during configuration loading and compilation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{0}': expected *.svg or dir/**")]
    InvalidGlobPattern(String),
    /// Invalid regex pattern provided with the actual error reason.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern {
        /// The regex pattern that failed to compile.
        pattern: String,
        /// The reason why the pattern is invalid.
        reason: String,
    },
    /// Category, color or tag names that cannot be used as directories.
    #[error("Invalid vocabulary: {0}")]
    InvalidVocabulary(String),
    /// IO error while reading configuration.
    #[error("IO error reading configuration: {0}")]
    IoError(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Raw configuration as deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IconConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub naming: NamingConfig,

    #[serde(default)]
    pub classification: ClassificationConfig,

    #[serde(default)]
    pub placement: PlacementConfig,

    #[serde(default)]
    pub filters: FilterRules,
}

/// Source and destination roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    #[serde(default = "default_source")]
    pub source: PathBuf,

    #[serde(default = "default_destination")]
    pub destination: PathBuf,
}

fn default_source() -> PathBuf {
    PathBuf::from(DEFAULT_SOURCE_ROOT)
}

fn default_destination() -> PathBuf {
    PathBuf::from(DEFAULT_DESTINATION_ROOT)
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            destination: default_destination(),
        }
    }
}

/// Filename prefixes to strip and extensions to accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    #[serde(default = "default_prefixes")]
    pub prefixes: Vec<String>,

    /// Accepted extensions without the dot, compared case-insensitively.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_prefixes() -> Vec<String> {
    DEFAULT_PREFIXES.iter().map(|p| p.to_string()).collect()
}

fn default_extensions() -> Vec<String> {
    vec!["svg".to_string()]
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            prefixes: default_prefixes(),
            extensions: default_extensions(),
        }
    }
}

/// Category and color vocabularies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationConfig {
    #[serde(default = "default_catch_all")]
    pub catch_all: String,

    #[serde(default = "default_color_tag")]
    pub default_color: String,

    #[serde(default = "default_colors")]
    pub colors: Vec<String>,

    /// Categories in priority order. The standard vocabulary is used when
    /// the key is absent.
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryEntry>,
}

/// One `[[classification.categories]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEntry {
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

fn default_catch_all() -> String {
    DEFAULT_CATCH_ALL.to_string()
}

fn default_color_tag() -> String {
    DEFAULT_COLOR_TAG.to_string()
}

fn default_colors() -> Vec<String> {
    DEFAULT_COLORS.iter().map(|c| c.to_string()).collect()
}

fn default_categories() -> Vec<CategoryEntry> {
    CategoryTable::standard()
        .rules()
        .iter()
        .map(|rule| CategoryEntry {
            name: rule.name.clone(),
            keywords: rule.keywords.clone(),
        })
        .collect()
}

impl Default for ClassificationConfig {
    fn default() -> Self {
        Self {
            catch_all: default_catch_all(),
            default_color: default_color_tag(),
            colors: default_colors(),
            categories: default_categories(),
        }
    }
}

/// Collision handling limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementConfig {
    #[serde(default = "default_max_collision_attempts")]
    pub max_collision_attempts: u32,
}

fn default_max_collision_attempts() -> u32 {
    DEFAULT_MAX_COLLISION_ATTEMPTS
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            max_collision_attempts: default_max_collision_attempts(),
        }
    }
}

/// Root-level filter rules configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Whether to include hidden files and directories (starting with ".").
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
    /// Exact filenames to exclude.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the path relative to the source root.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Regex patterns matched against the file name.
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

impl IconConfig {
    /// Load configuration from a file, with fallback to defaults.
    ///
    /// Attempts to load configuration in the following order:
    /// 1. If `config_path` is provided, load from that file
    /// 2. Look for `.iconsortrc.toml` in the current directory
    /// 3. Look for `~/.config/iconsort/config.toml` in home directory
    /// 4. Fall back to default configuration
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is explicitly provided but
    /// cannot be read, or if any discovered file is invalid.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
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
                .join("iconsort")
                .join("config.toml");
            if home_config.exists() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> ConfigResult<Self> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Validate the configuration and build the runtime structures.
    ///
    /// # Errors
    ///
    /// Returns an error for invalid glob or regex patterns and for
    /// vocabularies that cannot be mapped onto directories.
    pub fn compile(self) -> ConfigResult<Settings> {
        let classifier = compile_classifier(&self.classification)?;

        let normalizer = NameNormalizer::new(&self.naming.prefixes).map_err(|e| {
            ConfigError::InvalidRegexPattern {
                pattern: self.naming.prefixes.join("|"),
                reason: e.to_string(),
            }
        })?;

        let extensions: HashSet<String> = self
            .naming
            .extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();
        if extensions.is_empty() {
            return Err(ConfigError::ConfigInvalid(
                "naming.extensions must name at least one extension".to_string(),
            ));
        }

        Ok(Settings {
            source_root: self.paths.source,
            destination_root: self.paths.destination,
            normalizer,
            classifier,
            extensions,
            filters: CompiledFilters::new(self.filters)?,
            max_collision_attempts: self.placement.max_collision_attempts,
        })
    }
}

fn compile_classifier(config: &ClassificationConfig) -> ConfigResult<Classifier> {
    let mut seen = HashSet::new();
    let mut categories = CategoryTable::new(&config.catch_all);

    for entry in &config.categories {
        check_dir_name("category", &entry.name)?;
        if entry.name == config.catch_all {
            return Err(ConfigError::InvalidVocabulary(format!(
                "category '{}' is the catch-all and cannot declare keywords",
                entry.name
            )));
        }
        if !seen.insert(entry.name.as_str()) {
            return Err(ConfigError::InvalidVocabulary(format!(
                "category '{}' is declared twice",
                entry.name
            )));
        }
        if entry.keywords.is_empty() || entry.keywords.iter().any(|k| k.is_empty()) {
            return Err(ConfigError::InvalidVocabulary(format!(
                "category '{}' needs at least one non-empty keyword",
                entry.name
            )));
        }
        categories.add_category(&entry.name, &entry.keywords);
    }
    check_dir_name("catch-all", &config.catch_all)?;

    check_dir_name("default color", &config.default_color)?;
    for color in &config.colors {
        check_dir_name("color", color)?;
        if canonicalize(color) == canonicalize(&config.default_color) {
            return Err(ConfigError::InvalidVocabulary(format!(
                "color '{}' collides with the default color tag",
                color
            )));
        }
    }

    Ok(Classifier::new(
        categories,
        ColorTable::new(&config.colors, &config.default_color),
    ))
}

/// Names become directories, so each must be exactly one normal path component.
fn check_dir_name(kind: &str, name: &str) -> ConfigResult<()> {
    let mut components = Path::new(name).components();
    let single_normal = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if name.is_empty() || !single_normal || name.contains(['/', '\\']) {
        return Err(ConfigError::InvalidVocabulary(format!(
            "{} name '{}' is not a plain directory name",
            kind, name
        )));
    }
    Ok(())
}

/// Validated configuration the organizer runs on.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source_root: PathBuf,
    pub destination_root: PathBuf,
    pub normalizer: NameNormalizer,
    pub classifier: Classifier,
    /// Lowercased accepted extensions.
    pub extensions: HashSet<String>,
    pub filters: CompiledFilters,
    pub max_collision_attempts: u32,
}

impl Settings {
    /// Settings with the built-in vocabulary for the given roots.
    pub fn with_roots(source_root: impl Into<PathBuf>, destination_root: impl Into<PathBuf>) -> Self {
        let mut config = IconConfig::default();
        config.paths.source = source_root.into();
        config.paths.destination = destination_root.into();
        config
            .compile()
            .expect("built-in configuration is valid")
    }
}

/// Compiled filter structures for efficient file matching.
///
/// Patterns are compiled once so that matching does not reparse them for
/// every file.
#[derive(Debug, Clone)]
pub struct CompiledFilters {
    enable_hidden_files: bool,
    exclude_filenames: HashSet<String>,
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
    pub fn new(rules: FilterRules) -> ConfigResult<Self> {
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
            exclude_patterns,
            exclude_regexes,
            include_patterns,
        })
    }

    /// Check if a file should be organized.
    ///
    /// `relative_path` is the path below the source root. Checks run in
    /// this order, with early termination:
    /// 1. Include patterns (whitelist) - if matched, always include
    /// 2. Hidden file filter - if hidden and disabled, exclude
    /// 3. Exact filename match - if matched, exclude
    /// 4. Glob pattern match - if matched, exclude
    /// 5. Regex pattern match - if matched, exclude
    /// 6. Default: include
    pub fn should_include(&self, relative_path: &Path) -> bool {
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default();

        if self.matches_include_patterns(relative_path) {
            return true;
        }

        if !self.enable_hidden_files && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        if self.matches_exclude_patterns(relative_path) {
            return false;
        }

        !self.matches_exclude_regex(&file_name)
    }

    /// Check if the walker may descend into a directory below the root.
    pub fn should_descend(&self, relative_path: &Path) -> bool {
        if self.enable_hidden_files {
            return true;
        }
        !relative_path
            .file_name()
            .map(|n| n.to_string_lossy().starts_with('.'))
            .unwrap_or(false)
    }

    fn matches_include_patterns(&self, path: &Path) -> bool {
        self.include_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    fn matches_exclude_patterns(&self, path: &Path) -> bool {
        self.exclude_patterns
            .iter()
            .any(|pattern| pattern.matches_path(path))
    }

    fn matches_exclude_regex(&self, file_name: &str) -> bool {
        self.exclude_regexes
            .iter()
            .any(|regex| regex.is_match(file_name))
    }
}

impl Default for CompiledFilters {
    fn default() -> Self {
        Self {
            enable_hidden_files: false,
            exclude_filenames: HashSet::new(),
            exclude_patterns: Vec::new(),
            exclude_regexes: Vec::new(),
            include_patterns: Vec::new(),
        }
    }
}

fn compile_globs(patterns: &[String]) -> ConfigResult<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
        })
        .collect()
}
