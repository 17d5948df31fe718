//! Error types for the ld-watcher crate.
//!
//! This module provides the [`WatchError`] type for errors that can occur
//! while setting up or running the locale-file watcher.

use camino::Utf8PathBuf;

/// Errors that can occur during file watching operations.
///
/// # Error Recovery Strategy
///
/// - **Notify errors** ([`WatchError::Notify`]): Fatal - the watcher cannot run
/// - **No paths** ([`WatchError::NoPaths`]): Fatal - nothing to watch
/// - **Path not found** ([`WatchError::PathNotFound`]): Fatal - roots must exist
/// - **Channel closed** ([`WatchError::ChannelClosed`]): Fatal - consumer is gone
/// - **Invalid extensions** ([`WatchError::InvalidExtensions`]): Fatal - the
///   filter cannot be built
/// - **Non-UTF-8 path** ([`WatchError::NonUtf8Path`]): Recoverable - the event
///   is skipped
///
/// # Examples
///
/// ```
/// use ld_watcher::WatchError;
///
/// fn handle_error(err: WatchError) {
///     if err.is_fatal() {
///         eprintln!("watcher stopped: {err}");
///     }
/// }
/// ```
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Failed to initialize or operate the notify watcher.
    #[error("notify watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// The watcher was asked to watch an empty set of directories.
    #[error("no directories to watch")]
    NoPaths,

    /// A directory to watch does not exist.
    #[error("path does not exist: {0}")]
    PathNotFound(Utf8PathBuf),

    /// The event channel was closed unexpectedly.
    #[error("event channel closed unexpectedly")]
    ChannelClosed,

    /// The extension alternation for the filter did not compile.
    #[error("invalid extension pattern '{pattern}': {source}")]
    InvalidExtensions {
        /// The offending alternation.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: Box<regex::Error>,
    },

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),

    /// An I/O error occurred while canonicalizing a watched directory.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl WatchError {
    /// Creates a new [`WatchError::PathNotFound`] error.
    #[inline]
    pub fn path_not_found(path: impl Into<Utf8PathBuf>) -> Self {
        Self::PathNotFound(path.into())
    }

    /// Creates a new [`WatchError::NonUtf8Path`] error.
    #[inline]
    pub fn non_utf8_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self::NonUtf8Path(path.into())
    }

    /// Creates a new [`WatchError::InvalidExtensions`] error.
    #[inline]
    pub fn invalid_extensions(pattern: impl Into<String>, source: regex::Error) -> Self {
        Self::InvalidExtensions {
            pattern: pattern.into(),
            source: Box::new(source),
        }
    }

    /// Returns `true` if this error is recoverable (watching can continue).
    ///
    /// Only non-UTF-8 event paths are recoverable; the event is skipped.
    #[inline]
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::NonUtf8Path(_))
    }

    /// Returns `true` if this error is fatal (watching should stop).
    #[inline]
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Returns the file path associated with this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&Utf8PathBuf> {
        match self {
            Self::PathNotFound(path) => Some(path),
            Self::Notify(_)
            | Self::NoPaths
            | Self::ChannelClosed
            | Self::InvalidExtensions { .. }
            | Self::NonUtf8Path(_)
            | Self::Io(_) => None,
        }
    }
}
