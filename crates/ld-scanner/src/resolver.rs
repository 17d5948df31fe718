//! Expansion of locale-path globs into locale root directories.
//!
//! Each configured pattern is interpreted relative to the project root
//! unless it is absolute:
//!
//! - `.` always names the project root itself
//! - a pattern without glob metacharacters names one directory, included if
//!   it exists
//! - a glob is expanded by walking from its static prefix and matching every
//!   directory against it (`*` never crosses a `/`; use `**` for that)
//!
//! The result is deduplicated and keeps discovery order.

use camino::{Utf8Path, Utf8PathBuf};
use globset::{GlobBuilder, GlobMatcher};
use ignore::WalkBuilder;
use ld_core::normalize_path;
use ld_watcher::SKIP_DIRECTORIES;
use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use crate::error::ScanError;

/// Resolves locale-path patterns against a project root.
///
/// # Examples
///
/// ```
/// use ld_scanner::DirectoryResolver;
/// use camino::Utf8Path;
///
/// let resolver = DirectoryResolver::new(Utf8Path::new("/nonexistent/project"));
/// // The project root is returned for "." even before it is checked.
/// assert_eq!(resolver.resolve(["."]), vec!["/nonexistent/project"]);
/// assert!(resolver.resolve(["src/locales"]).is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: Utf8PathBuf,
}

impl DirectoryResolver {
    /// Creates a resolver for the given absolute project root.
    #[must_use]
    pub fn new(root: &Utf8Path) -> Self {
        Self {
            root: normalize_path(root),
        }
    }

    /// Expands `patterns` into an ordered, deduplicated list of directories.
    ///
    /// Invalid globs are logged and skipped. An empty result is logged as a
    /// warning and is not an error.
    pub fn resolve<I, S>(&self, patterns: I) -> Vec<Utf8PathBuf>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = FxHashSet::default();
        let mut dirs = Vec::new();

        for pattern in patterns {
            let pattern = pattern.as_ref();
            let found = match self.expand(pattern) {
                Ok(found) => found,
                Err(e) => {
                    warn!(pattern, error = %e, "Skipping locale path");
                    continue;
                }
            };
            debug!(pattern, matches = found.len(), "Expanded locale path");

            for dir in found {
                let dir = canonical_or_lexical(dir);
                if seen.insert(dir.clone()) {
                    dirs.push(dir);
                }
            }
        }

        if dirs.is_empty() {
            warn!(root = %self.root, "No locale directories found");
        }
        dirs
    }

    /// Expands a single pattern.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidGlob`] if the pattern is not a valid glob.
    pub fn expand(&self, pattern: &str) -> Result<Vec<Utf8PathBuf>, ScanError> {
        let pattern = pattern.trim().replace('\\', "/");
        let pattern = pattern.trim_end_matches('/');

        if pattern.is_empty() {
            return Ok(Vec::new());
        }

        if pattern == "." {
            return Ok(vec![self.root.clone()]);
        }

        let absolute = self.absolutize(pattern);

        if !has_glob_meta(absolute.as_str()) {
            return Ok(if absolute.is_dir() { vec![absolute] } else { Vec::new() });
        }

        let matcher = compile_glob(absolute.as_str())?;
        let base = static_prefix(&absolute);
        if !base.is_dir() {
            return Ok(Vec::new());
        }

        Ok(walk_matching_dirs(&base, &matcher))
    }

    fn absolutize(&self, pattern: &str) -> Utf8PathBuf {
        let path = Utf8Path::new(pattern);
        if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.root.join(path))
        }
    }

    /// Returns the project root.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

fn has_glob_meta(s: &str) -> bool {
    s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
}

fn compile_glob(pattern: &str) -> Result<GlobMatcher, ScanError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|e| ScanError::invalid_glob(pattern, e))
}

/// Returns the longest leading run of components free of glob metacharacters.
fn static_prefix(pattern: &Utf8Path) -> Utf8PathBuf {
    let mut prefix = Utf8PathBuf::new();
    for component in pattern.components() {
        if has_glob_meta(component.as_str()) {
            break;
        }
        prefix.push(component.as_str());
    }
    prefix
}

fn walk_matching_dirs(base: &Utf8Path, matcher: &GlobMatcher) -> Vec<Utf8PathBuf> {
    let walker = WalkBuilder::new(base)
        .standard_filters(false)
        .hidden(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            let name: &str = &name;
            !SKIP_DIRECTORIES.contains(&name)
        })
        .build();

    let mut dirs = Vec::new();
    for result in walker {
        let Ok(entry) = result else {
            continue;
        };
        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }
        let Some(path) = Utf8Path::from_path(entry.path()) else {
            continue;
        };
        if matcher.is_match(path.as_str()) {
            dirs.push(path.to_owned());
        }
    }
    dirs
}

fn canonical_or_lexical(dir: Utf8PathBuf) -> Utf8PathBuf {
    dir.canonicalize_utf8().unwrap_or(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn project(dirs: &[&str]) -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().canonicalize().unwrap()).unwrap();
        for dir in dirs {
            fs::create_dir_all(root.join(dir)).unwrap();
        }
        (temp, root)
    }

    #[test]
    fn test_literal_pattern() {
        let (_temp, root) = project(&["src/locales"]);
        let resolver = DirectoryResolver::new(&root);

        assert_eq!(resolver.resolve(["./src/locales"]), vec![root.join("src/locales")]);
        assert_eq!(resolver.resolve(["src/locales/"]), vec![root.join("src/locales")]);
        assert!(resolver.resolve(["src/missing"]).is_empty());
    }

    #[test]
    fn test_dot_is_root() {
        let (_temp, root) = project(&[]);
        assert_eq!(DirectoryResolver::new(&root).resolve(["."]), vec![root.clone()]);
    }

    #[test]
    fn test_absolute_pattern() {
        let (_temp, root) = project(&["i18n"]);
        let resolver = DirectoryResolver::new(Utf8Path::new("/somewhere/else"));
        let absolute = root.join("i18n");
        assert_eq!(resolver.resolve([absolute.as_str()]), vec![absolute.clone()]);
    }

    #[test]
    fn test_glob_single_level() {
        let (_temp, root) = project(&[
            "packages/app/locales",
            "packages/admin/locales",
            "packages/admin/nested/locales",
            "packages/node_modules/locales",
        ]);
        let resolver = DirectoryResolver::new(&root);

        assert_eq!(
            resolver.resolve(["packages/*/locales"]),
            vec![
                root.join("packages/admin/locales"),
                root.join("packages/app/locales"),
            ]
        );
    }

    #[test]
    fn test_glob_recursive() {
        let (_temp, root) = project(&["a/locales", "a/b/c/locales", "a/b/other"]);
        let resolver = DirectoryResolver::new(&root);

        assert_eq!(
            resolver.resolve(["**/locales"]),
            vec![root.join("a/b/c/locales"), root.join("a/locales")]
        );
    }

    #[test]
    fn test_dedup_preserves_order() {
        let (_temp, root) = project(&["x/locales", "y/locales"]);
        let resolver = DirectoryResolver::new(&root);

        assert_eq!(
            resolver.resolve(["y/locales", "*/locales", "./y/locales"]),
            vec![root.join("y/locales"), root.join("x/locales")]
        );
    }

    #[test]
    fn test_invalid_glob_is_skipped() {
        let (_temp, root) = project(&["locales"]);
        let resolver = DirectoryResolver::new(&root);

        assert!(resolver.expand("[locales").is_err());
        assert_eq!(resolver.resolve(["[locales", "locales"]), vec![root.join("locales")]);
    }

    #[test]
    fn test_blank_patterns_ignored() {
        let (_temp, root) = project(&[]);
        assert!(DirectoryResolver::new(&root).resolve(["", "  "]).is_empty());
    }

    #[test]
    fn test_static_prefix() {
        assert_eq!(static_prefix(Utf8Path::new("/p/packages/*/locales")), "/p/packages");
        assert_eq!(static_prefix(Utf8Path::new("/p/**/i18n")), "/p");
    }
}
