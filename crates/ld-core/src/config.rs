//! Configuration structures for the locale detector.
//!
//! This module provides configuration types for all components:
//!
//! - [`DetectorConfig`] - Project root, locale globs, path pattern, parsers
//! - [`WatchConfig`] - File watcher settings (debouncing, recursion)
//! - [`Config`] - Root configuration combining all settings
//!
//! All configuration types implement [`Default`] and deserialize with
//! `#[serde(default)]`, so a config file only needs the fields it overrides.
//! A loaded config must be passed through [`Config::resolve`] before use,
//! which makes the root absolute and validates the path pattern.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default locale-root glob, relative to the project root.
pub const DEFAULT_LOCALES_PATH: &str = "./src/locales";

/// Default path pattern: `<locale>/<namespace path>.<ext>`.
pub const DEFAULT_PATH_MATCHER: &str = "{locale}/{namespaces}.{ext}";

/// How files that land on the same (locale, namespace) slot are combined.
///
/// # Examples
///
/// ```
/// use ld_core::MergePolicy;
///
/// assert_eq!(MergePolicy::default(), MergePolicy::Shallow);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Later files replace earlier keys at the slot level.
    #[default]
    Shallow,
    /// Nested mappings are merged key by key; leaves from later files win.
    Deep,
}

/// A built-in file format that extra extensions can be routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserFormat {
    /// JSON documents.
    Json,
    /// YAML documents.
    Yaml,
}

/// An extra parser definition: extensions handled by one of the built-in formats.
///
/// `extensions` is an alternation without leading dots, e.g. `"jsonc|json5"`.
///
/// # Examples
///
/// ```
/// use ld_core::{ParserAlias, ParserFormat};
///
/// let alias: ParserAlias = serde_json::from_str(
///     r#"{"extensions": "arb", "format": "json"}"#,
/// ).unwrap();
/// assert_eq!(alias.format, ParserFormat::Json);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserAlias {
    /// Extension alternation claimed by this parser.
    pub extensions: String,
    /// Format used to decode matching files.
    pub format: ParserFormat,
}

/// Configuration for locale discovery and indexing.
///
/// # Examples
///
/// ```
/// use ld_core::DetectorConfig;
///
/// let config = DetectorConfig::default();
/// assert_eq!(config.locales_paths, vec!["./src/locales"]);
/// assert_eq!(config.path_matcher, "{locale}/{namespaces}.{ext}");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    /// Project root. Absolute and normalized once resolved.
    pub root: Utf8PathBuf,

    /// Ordered locale-root glob patterns, relative to `root` unless absolute.
    pub locales_paths: Vec<String>,

    /// Path pattern used to extract `locale` and `namespace` from file paths.
    pub path_matcher: String,

    /// Extra parsers, consulted after the built-in ones in this order.
    pub parsers: Vec<ParserAlias>,

    /// Merge policy for files sharing a (locale, namespace) slot.
    pub merge: MergePolicy,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            root: Utf8PathBuf::new(),
            locales_paths: vec![DEFAULT_LOCALES_PATH.to_owned()],
            path_matcher: DEFAULT_PATH_MATCHER.to_owned(),
            parsers: Vec::new(),
            merge: MergePolicy::Shallow,
        }
    }
}

impl DetectorConfig {
    /// Creates a detector configuration rooted at `root` with default settings.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }

    /// Replaces the locale-root glob patterns.
    #[must_use]
    pub fn with_locales_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.locales_paths = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the path pattern.
    #[must_use]
    pub fn with_path_matcher(mut self, pattern: impl Into<String>) -> Self {
        self.path_matcher = pattern.into();
        self
    }

    /// Appends an extra parser definition.
    #[must_use]
    pub fn with_parser(mut self, alias: ParserAlias) -> Self {
        self.parsers.push(alias);
        self
    }

    /// Sets the merge policy.
    #[must_use]
    pub const fn with_merge(mut self, merge: MergePolicy) -> Self {
        self.merge = merge;
        self
    }
}

/// Configuration for the file watcher.
///
/// # Examples
///
/// ```
/// use ld_core::WatchConfig;
///
/// let config = WatchConfig::default();
/// assert_eq!(config.debounce_ms, 100);
/// assert!(config.recursive);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// Whether change notifications are consumed at all.
    pub enabled: bool,

    /// Debounce window in milliseconds.
    pub debounce_ms: u64,

    /// Whether to watch subdirectories recursively.
    pub recursive: bool,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            debounce_ms: 100,
            recursive: true,
        }
    }
}

/// Root configuration for the locale detector.
///
/// # Examples
///
/// ```
/// use ld_core::Config;
/// use camino::Utf8Path;
///
/// let config = Config::default().resolve(Utf8Path::new("/work/app")).unwrap();
/// assert_eq!(config.detector.root, "/work/app");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Detector configuration.
    pub detector: DetectorConfig,

    /// File watcher configuration.
    pub watch: WatchConfig,
}

impl Config {
    /// Loads a configuration from a JSON file.
    ///
    /// The result still has to be [`resolve`](Self::resolve)d.
    pub fn from_file(path: &Utf8Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_owned(),
            source,
        })?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Resolves the root against `cwd` and validates the configuration.
    ///
    /// An empty root becomes `cwd`; a relative root is joined onto it. The
    /// result is lexically normalized.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::InvalidPath`] if `cwd` is not absolute
    /// - [`ConfigError::InvalidOption`] if the path pattern has no `{locale}`
    ///   placeholder or no locale paths are configured
    pub fn resolve(mut self, cwd: &Utf8Path) -> Result<Self, ConfigError> {
        if !cwd.is_absolute() {
            return Err(ConfigError::invalid_path(cwd, "working directory must be absolute"));
        }

        let root = if self.detector.root.as_str().is_empty() {
            cwd.to_owned()
        } else if self.detector.root.is_absolute() {
            self.detector.root.clone()
        } else {
            cwd.join(&self.detector.root)
        };
        self.detector.root = normalize_path(&root);

        if !self.detector.path_matcher.contains("{locale") {
            return Err(ConfigError::invalid_option(
                "path_matcher",
                format!("'{}' has no {{locale}} placeholder", self.detector.path_matcher),
            ));
        }

        if self.detector.locales_paths.iter().all(|p| p.trim().is_empty()) {
            return Err(ConfigError::invalid_option(
                "locales_paths",
                "at least one locale path is required",
            ));
        }

        Ok(self)
    }

    /// Returns an error unless the resolved root is an existing directory.
    pub fn ensure_root_exists(&self) -> Result<(), ConfigError> {
        if self.detector.root.is_dir() {
            Ok(())
        } else {
            Err(ConfigError::MissingDirectory(self.detector.root.clone()))
        }
    }
}

/// Lexically normalizes a path: drops `.` components and folds `..`.
///
/// `..` at the root is discarded. The filesystem is not consulted.
///
/// # Examples
///
/// ```
/// use ld_core::normalize_path;
/// use camino::Utf8Path;
///
/// assert_eq!(normalize_path(Utf8Path::new("/a/./b/../c/")), "/a/c");
/// ```
#[must_use]
pub fn normalize_path(path: &Utf8Path) -> Utf8PathBuf {
    let mut out = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Utf8Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detector_config_defaults() {
        let config = DetectorConfig::default();
        assert!(config.root.as_str().is_empty());
        assert_eq!(config.locales_paths, vec![DEFAULT_LOCALES_PATH]);
        assert_eq!(config.path_matcher, DEFAULT_PATH_MATCHER);
        assert!(config.parsers.is_empty());
        assert_eq!(config.merge, MergePolicy::Shallow);
    }

    #[test]
    fn test_watch_config_defaults() {
        let config = WatchConfig::default();
        assert!(config.enabled);
        assert_eq!(config.debounce_ms, 100);
        assert!(config.recursive);
    }

    #[test]
    fn test_config_deserialize_with_missing_fields() {
        let json = r#"{"detector": {"locales_paths": ["locales", "packages/*/locales"]}}"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.detector.locales_paths.len(), 2);
        assert_eq!(config.detector.path_matcher, DEFAULT_PATH_MATCHER);
        assert_eq!(config.watch.debounce_ms, 100);
    }

    #[test]
    fn test_config_deserialize_parsers_and_merge() {
        let json = r#"{
            "detector": {
                "parsers": [{"extensions": "jsonc|json5", "format": "json"}],
                "merge": "deep"
            }
        }"#;
        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.detector.merge, MergePolicy::Deep);
        assert_eq!(
            config.detector.parsers,
            vec![ParserAlias {
                extensions: "jsonc|json5".to_owned(),
                format: ParserFormat::Json,
            }]
        );
    }

    #[test]
    fn test_resolve_relative_root() {
        let config = Config {
            detector: DetectorConfig::new("app/../web/./client"),
            ..Config::default()
        };
        let resolved = config.resolve(Utf8Path::new("/repo")).unwrap();
        assert_eq!(resolved.detector.root, "/repo/web/client");
    }

    #[test]
    fn test_resolve_empty_root_uses_cwd() {
        let resolved = Config::default().resolve(Utf8Path::new("/repo")).unwrap();
        assert_eq!(resolved.detector.root, "/repo");
    }

    #[test]
    fn test_resolve_rejects_relative_cwd() {
        let err = Config::default().resolve(Utf8Path::new("repo")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath { .. }));
    }

    #[test]
    fn test_resolve_rejects_pattern_without_locale() {
        let config = Config {
            detector: DetectorConfig::new("/repo").with_path_matcher("{namespaces}.{ext}"),
            ..Config::default()
        };
        let err = config.resolve(Utf8Path::new("/repo")).unwrap_err();
        assert!(err.to_string().contains("path_matcher"));
    }

    #[test]
    fn test_resolve_rejects_empty_locales_paths() {
        let config = Config {
            detector: DetectorConfig::new("/repo").with_locales_paths([" "]),
            ..Config::default()
        };
        assert!(config.resolve(Utf8Path::new("/repo")).is_err());
    }

    #[test]
    fn test_ensure_root_exists() {
        let config = Config::default()
            .resolve(Utf8Path::new("/nonexistent/locale/detector/root"))
            .unwrap();
        assert!(matches!(
            config.ensure_root_exists(),
            Err(ConfigError::MissingDirectory(_))
        ));
    }

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Utf8Path::new("/a/b/../../..")), "/");
        assert_eq!(normalize_path(Utf8Path::new("/a/./b/")), "/a/b");
        assert_eq!(normalize_path(Utf8Path::new("../x/./y")), "../x/y");
    }
}
