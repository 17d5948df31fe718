//! The authoritative per-file state.
//!
//! [`FileIndex`] maps absolute file paths to [`FileRecord`]s and remembers
//! insertion order: the resource tree is folded in that order, so the order
//! decides which file wins when two files fill the same slot.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use ld_core::FileRecord;
use rustc_hash::FxHashSet;

/// What a single-file load did to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The file parsed and its record was inserted or replaced.
    Loaded,
    /// The file was not a locale file (no match, no locale, or no parser).
    Skipped,
    /// The file failed to read or parse. `removed` is `true` if a previous
    /// record for it was dropped.
    Failed {
        /// Whether an existing record was removed.
        removed: bool,
    },
}

impl LoadOutcome {
    /// Returns `true` if the index changed.
    #[inline]
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Loaded | Self::Failed { removed: true })
    }
}

/// Insertion-ordered map from absolute file path to record.
///
/// Replacing a record keeps its position; removing one leaves the relative
/// order of the others untouched.
///
/// # Examples
///
/// ```
/// use ld_scanner::FileIndex;
///
/// let index = FileIndex::new();
/// assert!(index.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FileIndex {
    records: IndexMap<Utf8PathBuf, FileRecord>,
}

impl FileIndex {
    /// Creates an empty index.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the record keyed by its path.
    ///
    /// Returns the record it replaced, if any.
    pub fn upsert(&mut self, record: FileRecord) -> Option<FileRecord> {
        self.records.insert(record.path.clone(), record)
    }

    /// Removes the record for `path`, returning it if present.
    pub fn remove(&mut self, path: &Utf8Path) -> Option<FileRecord> {
        self.records.shift_remove(path)
    }

    /// Returns the record for `path`.
    #[must_use]
    pub fn get(&self, path: &Utf8Path) -> Option<&FileRecord> {
        self.records.get(path)
    }

    /// Returns `true` if `path` is indexed.
    #[must_use]
    pub fn contains(&self, path: &Utf8Path) -> bool {
        self.records.contains_key(path)
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &FileRecord> {
        self.records.values()
    }

    /// Returns the number of indexed files.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if no file is indexed.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Returns the indexed file paths.
    #[must_use]
    pub fn paths(&self) -> FxHashSet<Utf8PathBuf> {
        self.records.keys().cloned().collect()
    }

    /// Returns the directories that directly contain an indexed file.
    #[must_use]
    pub fn dirs(&self) -> FxHashSet<Utf8PathBuf> {
        self.records.values().map(|r| r.dir.clone()).collect()
    }
}
