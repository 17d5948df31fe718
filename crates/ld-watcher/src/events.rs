//! Event types for file change notifications.
//!
//! # Event Flow
//!
//! ```text
//! File System Change
//!        │
//!        ▼
//! notify-debouncer-mini (debounce window)
//!        │
//!        ▼
//!   FileEvent created
//!        │
//!        ▼
//!   Sent via channel to the detector
//! ```

use std::time::Instant;

use camino::Utf8PathBuf;
use smallvec::SmallVec;

/// A file change event with a UTF-8 path guarantee.
///
/// The event does not distinguish between create, modify, or delete: the
/// consumer re-reads the file and a failed read removes it from the index.
///
/// # Examples
///
/// ```
/// use ld_watcher::FileEvent;
/// use camino::Utf8PathBuf;
///
/// let event = FileEvent::new(Utf8PathBuf::from("/app/locales/en/common.json"));
/// assert_eq!(event.extension(), Some("json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// The absolute path of the file that changed.
    pub path: Utf8PathBuf,

    /// When this event was received.
    pub timestamp: Instant,
}

impl FileEvent {
    /// Creates a new file event stamped with the current instant.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self {
            path: path.into(),
            timestamp: Instant::now(),
        }
    }

    /// Creates a new file event with a specific timestamp.
    #[inline]
    #[must_use]
    pub const fn with_timestamp(path: Utf8PathBuf, timestamp: Instant) -> Self {
        Self { path, timestamp }
    }

    /// Returns the file extension, if any.
    #[inline]
    #[must_use]
    pub fn extension(&self) -> Option<&str> {
        self.path.extension()
    }

    /// Returns the file name without the directory path.
    #[inline]
    #[must_use]
    pub fn file_name(&self) -> Option<&str> {
        self.path.file_name()
    }
}

/// A batch of file events received together.
///
/// Uses [`SmallVec`] with inline storage for up to 8 events, which covers a
/// typical editor save burst without allocating.
///
/// # Examples
///
/// ```
/// use ld_watcher::{FileEvent, FileEventBatch};
///
/// let mut batch = FileEventBatch::new();
/// batch.push(FileEvent::new("/l/en/a.json"));
/// batch.push(FileEvent::new("/l/en/a.json"));
/// batch.push(FileEvent::new("/l/zh/a.json"));
///
/// assert_eq!(batch.len(), 3);
/// assert_eq!(batch.unique_paths().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct FileEventBatch {
    /// The events in arrival order.
    pub events: SmallVec<[FileEvent; 8]>,

    /// When this batch was created.
    pub received_at: Instant,
}

impl FileEventBatch {
    /// Creates a new empty batch.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: SmallVec::new(),
            received_at: Instant::now(),
        }
    }

    /// Adds an event to the batch.
    #[inline]
    pub fn push(&mut self, event: FileEvent) {
        self.events.push(event);
    }

    /// Returns the number of events in this batch.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if the batch contains no events.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Returns an iterator over the events.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &FileEvent> {
        self.events.iter()
    }

    /// Returns the distinct paths in first-arrival order.
    #[must_use]
    pub fn unique_paths(&self) -> Vec<&Utf8PathBuf> {
        let mut paths: Vec<&Utf8PathBuf> = Vec::with_capacity(self.events.len());
        for event in &self.events {
            if !paths.contains(&&event.path) {
                paths.push(&event.path);
            }
        }
        paths
    }
}

impl Default for FileEventBatch {
    fn default() -> Self {
        Self::new()
    }
}

impl IntoIterator for FileEventBatch {
    type Item = FileEvent;
    type IntoIter = smallvec::IntoIter<[FileEvent; 8]>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.into_iter()
    }
}

impl<'a> IntoIterator for &'a FileEventBatch {
    type Item = &'a FileEvent;
    type IntoIter = std::slice::Iter<'a, FileEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl FromIterator<FileEvent> for FileEventBatch {
    fn from_iter<T: IntoIterator<Item = FileEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
            received_at: Instant::now(),
        }
    }
}
