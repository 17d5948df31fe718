//! The incremental update coordinator.
//!
//! [`LocaleDetector`] owns the locale directories, the file index and the
//! current resource tree. It is driven in two phases:
//!
//! 1. [`init`](LocaleDetector::init) resolves the locale directories, bulk
//!    loads every file and publishes the first tree
//! 2. change notifications are queued with
//!    [`notify`](LocaleDetector::notify) and applied with
//!    [`drain`](LocaleDetector::drain), which reloads each queued file once
//!    and rebuilds the tree only if the index actually changed
//!
//! Notifications that arrive while a drain is awaiting file I/O stay in the
//! event channel and form the next pending list, so a burst of saves costs
//! one reload per file and at most one rebuild per drain.
//!
//! # Example
//!
//! ```no_run
//! use ld_scanner::LocaleDetector;
//! use ld_core::Config;
//! use camino::Utf8Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default().resolve(Utf8Path::new("/work/app"))?;
//! let mut detector = LocaleDetector::new(&config)?;
//! detector.init().await?;
//!
//! let mut snapshots = detector.subscribe();
//! let modules = snapshots.borrow_and_update().clone();
//! println!("{} locales", modules.modules.len());
//! # Ok(())
//! # }
//! ```

use std::mem;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};
use ld_core::{Config, DetectorConfig, Value, normalize_path};
use ld_parser::{ParserRegistry, PathMatchers};
use ld_watcher::{FileEvent, FileEventBatch};
use rustc_hash::FxHashSet;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

use crate::error::DetectorError;
use crate::index::FileIndex;
use crate::loader::FileLoader;
use crate::resolver::DirectoryResolver;
use crate::stats::LoadStats;
use crate::tree::{LocaleModules, ResourceTree};
use crate::walker::to_slash;

/// A queued change: the locale root and the `/`-separated relative path.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingFile {
    dir: Utf8PathBuf,
    relative: String,
}

/// Discovers, indexes and incrementally re-indexes locale files.
///
/// All state is owned by this value and mutated through `&mut self`.
/// Readers observe published builds through [`subscribe`](Self::subscribe).
#[derive(Debug)]
pub struct LocaleDetector {
    config: DetectorConfig,
    loader: FileLoader,
    tree: ResourceTree,
    locale_dirs: Vec<Utf8PathBuf>,
    index: FileIndex,
    pending: Vec<PendingFile>,
    current: Arc<LocaleModules>,
    publisher: watch::Sender<Arc<LocaleModules>>,
    generation: u64,
}

impl LocaleDetector {
    /// Creates a detector with the built-in parsers plus the configured aliases.
    ///
    /// `config` must already be [`resolve`](Config::resolve)d.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::Pattern`] if a parser alias or the path
    /// pattern does not compile.
    pub fn new(config: &Config) -> Result<Self, DetectorError> {
        let registry = ParserRegistry::from_config(&config.detector.parsers)?;
        Self::with_registry(config, registry)
    }

    /// Creates a detector over a caller-assembled parser registry.
    ///
    /// Configured parser aliases are ignored; register them on `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::Pattern`] if the path pattern does not compile.
    pub fn with_registry(config: &Config, registry: ParserRegistry) -> Result<Self, DetectorError> {
        let detector = config.detector.clone();
        let matchers = PathMatchers::compile([&detector.path_matcher], &registry.extensions())?;
        let tree = ResourceTree::new(&detector.root, detector.merge);

        let current = Arc::new(LocaleModules::default());
        let (publisher, _) = watch::channel(Arc::clone(&current));

        debug!(
            root = %detector.root,
            path_matcher = %detector.path_matcher,
            extensions = %registry.extensions(),
            merge = ?detector.merge,
            "Creating locale detector"
        );

        Ok(Self {
            config: detector,
            loader: FileLoader::new(matchers, registry),
            tree,
            locale_dirs: Vec::new(),
            index: FileIndex::new(),
            pending: Vec::new(),
            current,
            publisher,
            generation: 0,
        })
    }

    /// Resolves the locale directories, loads every file and publishes the
    /// first build.
    ///
    /// Finding no locale directory is not an error: the detector stays idle
    /// with an empty index.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::NoLocaleFiles`] if directories were found but
    /// no file could be indexed.
    pub async fn init(&mut self) -> Result<LoadStats, DetectorError> {
        let resolver = DirectoryResolver::new(&self.config.root);
        self.locale_dirs = resolver.resolve(&self.config.locales_paths);
        self.index.clear();
        self.pending.clear();

        let mut stats = LoadStats::default();
        if self.locale_dirs.is_empty() {
            return Ok(stats);
        }

        for dir in &self.locale_dirs {
            match self.loader.load_dir(&mut self.index, dir).await {
                Ok(dir_stats) => stats.absorb(dir_stats),
                Err(e) => warn!(dir = %dir, error = %e, "Skipping locale directory"),
            }
        }

        if self.index.is_empty() {
            return Err(DetectorError::NoLocaleFiles {
                dirs: self.locale_dirs.len(),
            });
        }

        self.rebuild();
        info!(
            dirs = self.locale_dirs.len(),
            files = self.index.len(),
            locales = self.current.modules.len(),
            "Locale files detected"
        );
        Ok(stats)
    }

    /// Queues a change notification.
    ///
    /// Returns `true` if the path maps into a locale directory and was not
    /// already queued.
    pub fn notify(&mut self, event: &FileEvent) -> bool {
        self.enqueue(&event.path)
    }

    /// Queues a changed path. Relative paths are taken against the project
    /// root.
    pub fn enqueue(&mut self, path: &Utf8Path) -> bool {
        let Some(pending) = self.locate(path) else {
            trace!(path = %path, "Change outside locale directories");
            return false;
        };

        if self.pending.contains(&pending) {
            return false;
        }
        self.pending.push(pending);
        true
    }

    /// Reloads every queued file once and rebuilds if anything changed.
    ///
    /// Returns `true` if a new build was published.
    pub async fn drain(&mut self) -> bool {
        let pending = mem::take(&mut self.pending);
        if pending.is_empty() {
            return false;
        }

        let mut stats = LoadStats::default();
        for PendingFile { dir, relative } in &pending {
            stats.record(self.loader.load_file(&mut self.index, dir, relative).await);
        }

        let changed = stats.changed();
        if changed {
            self.rebuild();
        }

        debug!(
            files = pending.len(),
            loaded = stats.loaded,
            removed = stats.removed,
            changed,
            generation = self.generation,
            "Drained pending changes"
        );
        changed
    }

    /// Queues one notification and drains immediately.
    pub async fn on_file_changed(&mut self, event: &FileEvent) -> bool {
        self.notify(event);
        self.drain().await
    }

    /// Consumes events until the channel closes.
    ///
    /// Each pass waits for one event, takes every event already buffered
    /// behind it, and drains them together.
    pub async fn run(&mut self, events: &mut mpsc::Receiver<FileEvent>) {
        while let Some(first) = events.recv().await {
            let mut batch = FileEventBatch::new();
            batch.push(first);
            while let Ok(event) = events.try_recv() {
                batch.push(event);
            }

            for path in batch.unique_paths() {
                self.enqueue(path);
            }

            if self.drain().await {
                info!(
                    events = batch.len(),
                    files = self.index.len(),
                    generation = self.generation,
                    "Locale resources updated"
                );
            }
        }
        debug!("Event channel closed");
    }

    /// Returns a receiver that observes every published build.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<LocaleModules>> {
        self.publisher.subscribe()
    }

    /// Returns the number of builds published so far.
    #[inline]
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the file index.
    #[inline]
    #[must_use]
    pub const fn files(&self) -> &FileIndex {
        &self.index
    }

    /// Returns the current build.
    #[must_use]
    pub fn locale_modules(&self) -> Arc<LocaleModules> {
        Arc::clone(&self.current)
    }

    /// Returns the directories that directly contain an indexed file.
    #[must_use]
    pub fn all_locale_dirs(&self) -> FxHashSet<Utf8PathBuf> {
        self.index.dirs()
    }

    /// Returns the paths of all indexed files.
    #[must_use]
    pub fn all_locale_files(&self) -> FxHashSet<Utf8PathBuf> {
        self.index.paths()
    }

    /// Returns the resolved locale root directories.
    #[inline]
    #[must_use]
    pub fn locale_dirs(&self) -> &[Utf8PathBuf] {
        &self.locale_dirs
    }

    /// Returns the compiled path matchers.
    #[inline]
    #[must_use]
    pub const fn path_matcher(&self) -> &PathMatchers {
        self.loader.matchers()
    }

    /// Returns the extension alternation of every registered parser.
    #[must_use]
    pub fn extensions(&self) -> String {
        self.loader.registry().extensions()
    }

    /// Answers a lazy-load query: a whole locale, or one namespace of it.
    #[must_use]
    pub fn bundle(&self, locale: &str, namespace: Option<&str>) -> Option<&Value> {
        self.current.bundle(locale, namespace)
    }

    /// Returns the detector configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn rebuild(&mut self) {
        self.current = Arc::new(self.tree.build(&self.index));
        self.generation += 1;
        self.publisher.send_replace(Arc::clone(&self.current));
    }

    /// Maps a path to the first locale directory containing it.
    fn locate(&self, path: &Utf8Path) -> Option<PendingFile> {
        let path = if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.config.root.join(path))
        };

        // Locale roots are stored canonicalized; a root reached through a
        // symlink only matches once the event path is resolved as well.
        self.locate_in_dirs(&path)
            .or_else(|| canonical_event_path(&path).and_then(|path| self.locate_in_dirs(&path)))
    }

    fn locate_in_dirs(&self, path: &Utf8Path) -> Option<PendingFile> {
        self.locale_dirs.iter().find_map(|dir| {
            let relative = path.strip_prefix(dir).ok()?;
            let relative = to_slash(relative);
            (!relative.is_empty()).then(|| PendingFile {
                dir: dir.clone(),
                relative,
            })
        })
    }
}

/// Resolves symlinks in an event path. A deleted file no longer resolves, so
/// its parent is resolved and the file name joined back on.
fn canonical_event_path(path: &Utf8Path) -> Option<Utf8PathBuf> {
    if let Ok(canonical) = path.canonicalize_utf8() {
        return Some(canonical);
    }
    let parent = path.parent()?.canonicalize_utf8().ok()?;
    Some(parent.join(path.file_name()?))
}
