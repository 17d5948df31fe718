//! File filtering for watch events.
//!
//! Filtering happens in the blocking watcher thread, before an event is
//! sent to the channel, so unrelated churn (editor swap files, package
//! installs) never reaches the detector.
//!
//! # Examples
//!
//! ```
//! use ld_watcher::{FileFilter, LocaleFileFilter};
//! use camino::Utf8Path;
//!
//! let filter = LocaleFileFilter::new("json|ya?ml")?;
//!
//! assert!(filter.should_process(Utf8Path::new("/app/locales/en/common.json")));
//! assert!(filter.should_process(Utf8Path::new("/app/locales/zh.yaml")));
//! assert!(!filter.should_process(Utf8Path::new("/app/locales/en/.common.json.swp")));
//! assert!(!filter.should_process(Utf8Path::new("/app/node_modules/x/en.json")));
//! # Ok::<(), ld_watcher::WatchError>(())
//! ```

use camino::{Utf8Path, Utf8PathBuf};
use regex::Regex;
use smallvec::SmallVec;

use crate::error::WatchError;

/// Directory names whose contents never hold project locale files.
pub const SKIP_DIRECTORIES: &[&str] = &["node_modules", "bower_components", "jspm_packages"];

/// A predicate deciding which file events are forwarded.
///
/// Filters run on the blocking watcher thread, hence `Send + Sync + 'static`.
pub trait FileFilter: Send + Sync + 'static {
    /// Returns `true` if the event for `path` should be sent to the channel.
    fn should_process(&self, path: &Utf8Path) -> bool;
}

/// A filter that accepts all files.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllFilter;

impl FileFilter for AcceptAllFilter {
    #[inline]
    fn should_process(&self, _path: &Utf8Path) -> bool {
        true
    }
}

/// Accepts files whose extension matches the parser registry's alternation,
/// outside dependency directories and not hidden.
#[derive(Debug, Clone)]
pub struct LocaleFileFilter {
    extensions: Regex,
    skip_dirs: SmallVec<[String; 4]>,
    roots: Vec<Utf8PathBuf>,
}

impl LocaleFileFilter {
    /// Creates a filter for the extension alternation `extensions`
    /// (e.g. `json|ya?ml`).
    ///
    /// # Errors
    ///
    /// Returns [`WatchError::InvalidExtensions`] if the alternation does not
    /// compile.
    pub fn new(extensions: &str) -> Result<Self, WatchError> {
        let pattern = format!("^(?:{extensions})$");
        let extensions =
            Regex::new(&pattern).map_err(|e| WatchError::invalid_extensions(pattern.clone(), e))?;
        Ok(Self {
            extensions,
            skip_dirs: SKIP_DIRECTORIES.iter().map(|d| (*d).to_owned()).collect(),
            roots: Vec::new(),
        })
    }

    /// Adds a directory name whose contents are ignored.
    #[must_use]
    pub fn with_skip_dir(mut self, dir: impl Into<String>) -> Self {
        let dir = dir.into();
        if !self.skip_dirs.contains(&dir) {
            self.skip_dirs.push(dir);
        }
        self
    }

    /// Sets the watched roots. Skipped directory names are only checked
    /// below the root containing a path, so a root that itself lives under
    /// `node_modules` still reports its files.
    #[must_use]
    pub fn with_roots(mut self, roots: &[Utf8PathBuf]) -> Self {
        self.roots = roots.to_vec();
        self
    }

    fn has_locale_extension(&self, path: &Utf8Path) -> bool {
        path.extension().is_some_and(|ext| self.extensions.is_match(ext))
    }

    fn is_hidden(path: &Utf8Path) -> bool {
        path.file_name().is_some_and(|name| name.starts_with('.'))
    }

    fn in_skipped_dir(&self, path: &Utf8Path) -> bool {
        let below_root = self
            .roots
            .iter()
            .find_map(|root| path.strip_prefix(root).ok())
            .unwrap_or(path);
        below_root
            .components()
            .any(|c| self.skip_dirs.iter().any(|d| d == c.as_str()))
    }
}

impl FileFilter for LocaleFileFilter {
    fn should_process(&self, path: &Utf8Path) -> bool {
        self.has_locale_extension(path) && !Self::is_hidden(path) && !self.in_skipped_dir(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_all_filter() {
        assert!(AcceptAllFilter.should_process(Utf8Path::new("anything.txt")));
        assert!(AcceptAllFilter.should_process(Utf8Path::new("")));
    }

    #[test]
    fn test_locale_filter_extensions() {
        let filter = LocaleFileFilter::new("json|ya?ml").unwrap();

        assert!(filter.should_process(Utf8Path::new("/l/en/common.json")));
        assert!(filter.should_process(Utf8Path::new("/l/en/common.yml")));
        assert!(filter.should_process(Utf8Path::new("/l/en/common.yaml")));
        assert!(!filter.should_process(Utf8Path::new("/l/en/common.jsonc")));
        assert!(!filter.should_process(Utf8Path::new("/l/en/common.ts")));
        assert!(!filter.should_process(Utf8Path::new("/l/en/README")));
    }

    #[test]
    fn test_locale_filter_skips_dependency_dirs() {
        let filter = LocaleFileFilter::new("json").unwrap();

        assert!(!filter.should_process(Utf8Path::new("/p/node_modules/pkg/en.json")));
        assert!(!filter.should_process(Utf8Path::new("/p/bower_components/en.json")));
        assert!(!filter.should_process(Utf8Path::new("/p/jspm_packages/a/en.json")));
    }

    #[test]
    fn test_locale_filter_custom_skip_dir() {
        let filter = LocaleFileFilter::new("json").unwrap().with_skip_dir("dist");

        assert!(!filter.should_process(Utf8Path::new("/p/dist/en.json")));
        assert!(filter.should_process(Utf8Path::new("/p/src/en.json")));
    }

    #[test]
    fn test_locale_filter_root_inside_dependency_dir() {
        let root = Utf8PathBuf::from("/p/node_modules/ui-kit/locales");
        let filter = LocaleFileFilter::new("json")
            .unwrap()
            .with_roots(std::slice::from_ref(&root));

        assert!(filter.should_process(&root.join("en/common.json")));
        assert!(!filter.should_process(&root.join("en/node_modules/x/en.json")));
        assert!(!filter.should_process(Utf8Path::new("/p/node_modules/other/en.json")));
    }

    #[test]
    fn test_locale_filter_hidden_files() {
        let filter = LocaleFileFilter::new("json").unwrap();
        assert!(!filter.should_process(Utf8Path::new("/p/locales/.en.json")));
    }

    #[test]
    fn test_locale_filter_invalid_pattern() {
        assert!(LocaleFileFilter::new("json|(").is_err());
    }
}
