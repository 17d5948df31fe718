//! Directory traversal for locale files.
//!
//! This module provides [`FileWalker`], which uses the `ignore` crate to
//! enumerate candidate locale files under one locale root.
//!
//! # Features
//!
//! - Deterministic order: entries are sorted by file name at every level
//! - Skips hidden entries and dependency directories (`node_modules`, ...)
//! - Only yields file names that contain an extension
//! - Yields `/`-separated paths relative to the root
//!
//! `.gitignore` rules are deliberately not applied: generated locale
//! bundles are commonly git-ignored yet still meant to be served.

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use ld_watcher::SKIP_DIRECTORIES;
use tracing::{trace, warn};

use crate::error::ScanError;

/// A walker that discovers candidate locale files under one locale root.
///
/// # Examples
///
/// ```no_run
/// use ld_scanner::FileWalker;
/// use camino::Utf8Path;
///
/// let walker = FileWalker::new(Utf8Path::new("./src/locales"))?;
/// for relative in walker.collect_relative() {
///     println!("{relative}");
/// }
/// # Ok::<(), ld_scanner::ScanError>(())
/// ```
#[derive(Debug)]
pub struct FileWalker {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// Additional directory names to skip.
    skip_dirs: Vec<String>,
    /// Whether to follow symbolic links.
    follow_links: bool,
}

impl FileWalker {
    /// Creates a new walker for the given locale root.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::MissingDirectory`] if `root` is not a directory.
    pub fn new(root: &Utf8Path) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::MissingDirectory(root.to_owned()));
        }

        Ok(Self {
            root: root.to_owned(),
            skip_dirs: Vec::new(),
            follow_links: false,
        })
    }

    /// Adds directory names to skip, on top of [`SKIP_DIRECTORIES`].
    #[must_use]
    pub fn with_skip_dirs(mut self, dirs: &[&str]) -> Self {
        self.skip_dirs.extend(dirs.iter().map(ToString::to_string));
        self
    }

    /// Configures whether to follow symbolic links. Off by default.
    #[must_use]
    pub const fn with_follow_links(mut self, follow: bool) -> Self {
        self.follow_links = follow;
        self
    }

    /// Collects the relative paths of all candidate files, in walk order.
    ///
    /// Entries that cannot be read are logged and skipped; one unreadable
    /// subdirectory does not hide the rest of the tree.
    #[must_use]
    pub fn collect_relative(&self) -> Vec<String> {
        let mut paths = Vec::new();

        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %self.root, error = %ScanError::from(e), "Skipping unreadable entry");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                warn!(path = %entry.path().display(), "Skipping non-UTF-8 path");
                continue;
            };

            let Ok(relative) = path.strip_prefix(&self.root) else {
                continue;
            };

            if !has_extension(relative) {
                trace!(path = %relative, "Skipping file without extension");
                continue;
            }

            paths.push(to_slash(relative));
        }

        paths
    }

    /// Builds the ignore walker with configured settings.
    fn build_walker(&self) -> ignore::Walk {
        let skip_dirs = self.skip_dirs.clone();
        WalkBuilder::new(&self.root)
            .standard_filters(false)
            .hidden(true)
            .follow_links(self.follow_links)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                    return true;
                }
                let name = entry.file_name().to_string_lossy();
                let name: &str = &name;
                !SKIP_DIRECTORIES.contains(&name) && !skip_dirs.iter().any(|d| d == name)
            })
            .build()
    }

    /// Returns the root directory being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }
}

/// Returns `true` if the file name has a non-empty stem and extension.
fn has_extension(path: &Utf8Path) -> bool {
    path.file_name()
        .and_then(|name| name.rsplit_once('.'))
        .is_some_and(|(stem, ext)| !stem.is_empty() && !ext.is_empty())
}

/// Joins path components with `/` regardless of platform.
pub(crate) fn to_slash(path: &Utf8Path) -> String {
    path.components()
        .map(|c| c.as_str())
        .collect::<Vec<_>>()
        .join("/")
}
