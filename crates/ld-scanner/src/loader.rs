//! Loading locale files into the [`FileIndex`].
//!
//! [`FileLoader`] pairs the compiled path pattern with the parser registry.
//! A single-file load either upserts a record, removes a stale one after a
//! failure, or leaves the index alone for files that are not locale files.
//! Per-file problems are logged and never returned.

use std::io::ErrorKind;

use camino::Utf8Path;
use ld_core::FileRecord;
use ld_parser::{ParseError, ParserRegistry, PathMatchers};
use tracing::{debug, info, trace, warn};

use crate::error::ScanError;
use crate::index::{FileIndex, LoadOutcome};
use crate::stats::LoadStats;
use crate::walker::FileWalker;

/// Loads locale files into an index.
#[derive(Debug)]
pub struct FileLoader {
    matchers: PathMatchers,
    registry: ParserRegistry,
}

impl FileLoader {
    /// Creates a loader from compiled matchers and a parser registry.
    #[must_use]
    pub const fn new(matchers: PathMatchers, registry: ParserRegistry) -> Self {
        Self { matchers, registry }
    }

    /// Loads one file, given its locale root and `/`-separated relative path.
    pub async fn load_file(&self, index: &mut FileIndex, dir: &Utf8Path, relative: &str) -> LoadOutcome {
        let relative = relative.replace('\\', "/");
        let path = dir.join(&relative);

        let Some((matcher, found)) = self.matchers.find(&relative) else {
            trace!(path = %path, "Not a locale file");
            return LoadOutcome::Skipped;
        };

        let Some(ext) = found.ext.as_deref().or_else(|| path.extension()) else {
            trace!(path = %path, "No extension");
            return LoadOutcome::Skipped;
        };

        let Some(parser) = self.registry.find(ext) else {
            trace!(path = %path, ext, "No parser for extension");
            return LoadOutcome::Skipped;
        };

        match parser.load(&path).await {
            Ok(value) => {
                debug!(
                    path = %path,
                    locale = %found.locale,
                    namespace = ?found.namespace,
                    parser = parser.name(),
                    "Loaded locale file"
                );
                index.upsert(FileRecord {
                    dir: path.parent().unwrap_or(dir).to_owned(),
                    root: dir.to_owned(),
                    path,
                    locale: found.locale,
                    namespace: found.namespace,
                    matcher: matcher.pattern().to_owned(),
                    value,
                });
                LoadOutcome::Loaded
            }
            Err(e) => {
                if is_missing(&e) {
                    debug!(path = %path, "Locale file removed");
                } else {
                    warn!(path = %path, error = %e, "Failed to load locale file");
                }
                LoadOutcome::Failed {
                    removed: index.remove(&path).is_some(),
                }
            }
        }
    }

    /// Walks one locale root and loads every candidate file in walk order.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::MissingDirectory`] if `dir` is not a directory.
    pub async fn load_dir(&self, index: &mut FileIndex, dir: &Utf8Path) -> Result<LoadStats, ScanError> {
        let walker = FileWalker::new(dir)?;
        let mut stats = LoadStats {
            dirs: 1,
            ..LoadStats::default()
        };

        for relative in walker.collect_relative() {
            stats.record(self.load_file(index, dir, &relative).await);
        }

        info!(
            dir = %dir,
            candidates = stats.candidates,
            loaded = stats.loaded,
            failed = stats.failed,
            "Loaded locale directory"
        );
        Ok(stats)
    }

    /// Returns the compiled path matchers.
    #[inline]
    #[must_use]
    pub const fn matchers(&self) -> &PathMatchers {
        &self.matchers
    }

    /// Returns the parser registry.
    #[inline]
    #[must_use]
    pub const fn registry(&self) -> &ParserRegistry {
        &self.registry
    }
}

fn is_missing(err: &ParseError) -> bool {
    matches!(err, ParseError::Read { source, .. } if source.kind() == ErrorKind::NotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use camino::Utf8PathBuf;
    use ld_core::{DEFAULT_PATH_MATCHER, Value};
    use std::fs;
    use tempfile::TempDir;

    fn loader(pattern: &str) -> FileLoader {
        let registry = ParserRegistry::builtin();
        let matchers = PathMatchers::compile([pattern], &registry.extensions()).unwrap();
        FileLoader::new(matchers, registry)
    }

    fn locales(files: &[(&str, &str)]) -> (TempDir, Utf8PathBuf) {
        let temp = TempDir::new().unwrap();
        let root = Utf8PathBuf::from_path_buf(temp.path().canonicalize().unwrap()).unwrap();
        for (path, body) in files {
            let full = root.join(path);
            fs::create_dir_all(full.parent().unwrap()).unwrap();
            fs::write(full, body).unwrap();
        }
        (temp, root)
    }

    #[tokio::test]
    async fn test_load_file_indexes_record() {
        let (_temp, root) = locales(&[("en/more/extra.json", r#"{"k": "v"}"#)]);
        let loader = loader(DEFAULT_PATH_MATCHER);
        let mut index = FileIndex::new();

        let outcome = loader.load_file(&mut index, &root, "en/more/extra.json").await;
        assert_eq!(outcome, LoadOutcome::Loaded);

        let record = index.get(&root.join("en/more/extra.json")).unwrap();
        assert_eq!(record.locale, "en");
        assert_eq!(record.namespace.as_deref(), Some("more.extra"));
        assert_eq!(record.dir, root.join("en/more"));
        assert_eq!(record.root, root);
        assert_eq!(record.matcher, DEFAULT_PATH_MATCHER);
        assert_eq!(record.value["k"], Value::from("v"));
    }

    #[tokio::test]
    async fn test_locale_less_path_is_skipped() {
        let (_temp, root) = locales(&[("common.json", "{}")]);
        let loader = loader(DEFAULT_PATH_MATCHER);
        let mut index = FileIndex::new();

        assert_eq!(
            loader.load_file(&mut index, &root, "common.json").await,
            LoadOutcome::Skipped
        );
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_unsupported_extension_is_skipped() {
        let (_temp, root) = locales(&[("en/notes.txt", "hello")]);
        let loader = loader(DEFAULT_PATH_MATCHER);
        let mut index = FileIndex::new();

        assert_eq!(
            loader.load_file(&mut index, &root, "en/notes.txt").await,
            LoadOutcome::Skipped
        );
    }

    #[tokio::test]
    async fn test_parse_failure_removes_record() {
        let (_temp, root) = locales(&[("en/common.json", r#"{"k": "v"}"#)]);
        let loader = loader(DEFAULT_PATH_MATCHER);
        let mut index = FileIndex::new();

        loader.load_file(&mut index, &root, "en/common.json").await;
        fs::write(root.join("en/common.json"), "{ not json").unwrap();

        assert_eq!(
            loader.load_file(&mut index, &root, "en/common.json").await,
            LoadOutcome::Failed { removed: true }
        );
        assert!(index.is_empty());

        assert_eq!(
            loader.load_file(&mut index, &root, "en/common.json").await,
            LoadOutcome::Failed { removed: false }
        );
    }

    #[tokio::test]
    async fn test_deleted_file_removes_record() {
        let (_temp, root) = locales(&[("en/common.json", "{}")]);
        let loader = loader(DEFAULT_PATH_MATCHER);
        let mut index = FileIndex::new();

        loader.load_file(&mut index, &root, "en/common.json").await;
        fs::remove_file(root.join("en/common.json")).unwrap();

        assert!(loader.load_file(&mut index, &root, "en/common.json").await.changed());
        assert!(index.is_empty());
    }

    #[tokio::test]
    async fn test_load_dir_counts_outcomes() {
        let (_temp, root) = locales(&[
            ("en/common.json", r#"{"a": 1}"#),
            ("en/broken.json", "["),
            ("zh/common.yml", "a: 1"),
            ("README.md", "docs"),
        ]);
        let loader = loader(DEFAULT_PATH_MATCHER);
        let mut index = FileIndex::new();

        let stats = loader.load_dir(&mut index, &root).await.unwrap();

        assert_eq!(stats.dirs, 1);
        assert_eq!(stats.candidates, 4);
        assert_eq!(stats.loaded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(index.len(), 2);
    }

    #[tokio::test]
    async fn test_load_dir_missing() {
        let loader = loader(DEFAULT_PATH_MATCHER);
        let mut index = FileIndex::new();
        let err = loader
            .load_dir(&mut index, Utf8Path::new("/nonexistent/locales"))
            .await
            .unwrap_err();
        assert!(err.is_fatal());
    }
}
