//! File watcher with async event streaming.
//!
//! This module provides the [`FileWatcher`] type that bridges the synchronous
//! `notify` debouncer to the tokio runtime. One debouncer watches every
//! locale root; events from all of them share one channel.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Blocking Thread (spawn_blocking)             │
//! │  ┌──────────────────┐    ┌────────────────┐    ┌────────────┐  │
//! │  │ RecommendedWatcher│ -> │ Debouncer      │ -> │ Callback   │  │
//! │  │ (N locale roots) │    │ (debounce_ms)  │    │ (filtering)│  │
//! │  └──────────────────┘    └────────────────┘    └─────┬──────┘  │
//! └──────────────────────────────────────────────────────│─────────┘
//!                                                        │
//!                                          blocking_send │
//!                                                        ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                    Async Runtime (tokio)                        │
//! │  ┌──────────────────┐    ┌────────────────┐                     │
//! │  │ FileWatcher      │    │ mpsc::Receiver │ -> LocaleDetector   │
//! │  │ (shutdown ctrl)  │    │ (events)       │                     │
//! │  └──────────────────┘    └────────────────┘                     │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Events that pile up in the channel while the consumer is busy are what
//! the detector coalesces into its next drain.

use std::time::Duration;

use camino::Utf8PathBuf;
use ld_core::WatchConfig;
use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebounceEventResult, Debouncer};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::error::WatchError;
use crate::events::FileEvent;
use crate::filter::FileFilter;

/// Default channel capacity for file events.
const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// A file watcher over a set of directories that streams events to an
/// async context.
///
/// # Lifecycle
///
/// 1. **Creation**: [`FileWatcher::new`] validates the directories, creates
///    the channel, and spawns a blocking task running the debouncer.
/// 2. **Event Reception**: [`recv`](Self::recv), [`try_recv`](Self::try_recv),
///    or [`events`](Self::events) for handing the receiver to a consumer.
/// 3. **Shutdown**: [`shutdown`](Self::shutdown), or drop the watcher.
///
/// # Examples
///
/// ```no_run
/// use ld_watcher::{FileWatcher, LocaleFileFilter};
/// use ld_core::WatchConfig;
/// use camino::Utf8PathBuf;
///
/// # async fn example() -> Result<(), ld_watcher::WatchError> {
/// let dirs = vec![Utf8PathBuf::from("./src/locales")];
/// let mut watcher = FileWatcher::new(
///     &dirs,
///     &WatchConfig::default(),
///     LocaleFileFilter::new("json|ya?ml")?,
/// ).await?;
///
/// while let Some(event) = watcher.recv().await {
///     println!("Changed: {}", event.path);
/// }
/// # Ok(())
/// # }
/// ```
pub struct FileWatcher {
    /// Shutdown signal sender. `None` once shutdown has started.
    shutdown_tx: Option<oneshot::Sender<()>>,

    /// Handle to the blocking watcher task.
    task_handle: Option<JoinHandle<Result<(), WatchError>>>,

    /// Event receiver for async consumption.
    event_rx: mpsc::Receiver<FileEvent>,

    /// Canonicalized directories being watched.
    watch_paths: Vec<Utf8PathBuf>,
}

impl std::fmt::Debug for FileWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileWatcher")
            .field("watch_paths", &self.watch_paths)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl FileWatcher {
    /// Creates a watcher over `paths` with the default channel capacity.
    ///
    /// # Errors
    ///
    /// - [`WatchError::NoPaths`] if `paths` is empty
    /// - [`WatchError::PathNotFound`] if a path doesn't exist
    /// - [`WatchError::Io`] if a path can't be canonicalized
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn new<F: FileFilter>(
        paths: &[Utf8PathBuf],
        config: &WatchConfig,
        filter: F,
    ) -> Result<Self, WatchError> {
        Self::spawn(paths, config, filter, DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a watcher with a custom channel capacity.
    ///
    /// A larger capacity absorbs bigger bursts (e.g. a branch checkout)
    /// without applying backpressure to the watcher thread.
    #[allow(clippy::unused_async)] // Async for API consistency with shutdown()
    pub async fn with_capacity<F: FileFilter>(
        paths: &[Utf8PathBuf],
        config: &WatchConfig,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        Self::spawn(paths, config, filter, channel_capacity)
    }

    fn spawn<F: FileFilter>(
        paths: &[Utf8PathBuf],
        config: &WatchConfig,
        filter: F,
        channel_capacity: usize,
    ) -> Result<Self, WatchError> {
        if paths.is_empty() {
            return Err(WatchError::NoPaths);
        }

        let mut watch_paths = Vec::with_capacity(paths.len());
        for path in paths {
            if !path.exists() {
                return Err(WatchError::path_not_found(path.as_path()));
            }
            let canonical = path.canonicalize_utf8()?;
            if !watch_paths.contains(&canonical) {
                watch_paths.push(canonical);
            }
        }

        let (event_tx, event_rx) = mpsc::channel(channel_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task_paths = watch_paths.clone();
        let debounce = Duration::from_millis(config.debounce_ms);
        let mode = if config.recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        let task_handle = tokio::task::spawn_blocking(move || {
            run_watcher_loop(&task_paths, debounce, mode, event_tx, shutdown_rx, filter)
        });

        Ok(Self {
            shutdown_tx: Some(shutdown_tx),
            task_handle: Some(task_handle),
            event_rx,
            watch_paths,
        })
    }

    /// Receives the next file event.
    ///
    /// Returns `None` once the watcher has shut down.
    pub async fn recv(&mut self) -> Option<FileEvent> {
        self.event_rx.recv().await
    }

    /// Receives an event if one is already buffered.
    pub fn try_recv(&mut self) -> Result<FileEvent, mpsc::error::TryRecvError> {
        self.event_rx.try_recv()
    }

    /// Returns the event receiver, e.g. for `LocaleDetector::run`.
    pub fn events(&mut self) -> &mut mpsc::Receiver<FileEvent> {
        &mut self.event_rx
    }

    /// Returns the canonicalized directories being watched.
    #[must_use]
    pub fn watch_paths(&self) -> &[Utf8PathBuf] {
        &self.watch_paths
    }

    /// Returns `true` if the watcher task is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some() && self.task_handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Stops the watcher and waits for the blocking task to finish.
    ///
    /// # Errors
    ///
    /// Returns the error the watcher task ended with, or
    /// [`WatchError::ChannelClosed`] if the task panicked.
    pub async fn shutdown(mut self) -> Result<(), WatchError> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        if let Some(handle) = self.task_handle.take() {
            match handle.await {
                Ok(result) => result?,
                Err(_join_error) => return Err(WatchError::ChannelClosed),
            }
        }

        Ok(())
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        // The task exits on its own once it sees the signal.
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

/// Runs the debouncer on the blocking pool until shutdown is signalled.
fn run_watcher_loop<F: FileFilter>(
    paths: &[Utf8PathBuf],
    debounce: Duration,
    mode: RecursiveMode,
    event_tx: mpsc::Sender<FileEvent>,
    shutdown_rx: oneshot::Receiver<()>,
    filter: F,
) -> Result<(), WatchError> {
    let mut debouncer: Debouncer<notify::RecommendedWatcher> =
        new_debouncer(debounce, move |res: DebounceEventResult| match res {
            Ok(events) => {
                for event in events {
                    let path = match Utf8PathBuf::try_from(event.path) {
                        Ok(p) => p,
                        Err(e) => {
                            warn!(
                                path = %e.into_path_buf().display(),
                                "Skipping non-UTF-8 path in file event"
                            );
                            continue;
                        }
                    };

                    if !filter.should_process(&path) {
                        trace!(path = %path, "Filtered out file event");
                        continue;
                    }

                    if event_tx.blocking_send(FileEvent::new(path)).is_err() {
                        debug!("Event channel closed, stopping watcher");
                        break;
                    }
                }
            }
            Err(error) => warn!(error = %error, "Debouncer error"),
        })?;

    for path in paths {
        debouncer.watcher().watch(path.as_std_path(), mode)?;
        info!(path = %path, recursive = matches!(mode, RecursiveMode::Recursive), "Watching locale directory");
    }

    let _ = shutdown_rx.blocking_recv();

    info!(dirs = paths.len(), "File watcher stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{AcceptAllFilter, LocaleFileFilter};
    use std::fs;
    use tempfile::TempDir;

    fn utf8_dir(temp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).unwrap()
    }

    #[tokio::test]
    async fn test_watcher_creation() {
        let temp = TempDir::new().unwrap();
        let watcher = FileWatcher::new(&[utf8_dir(&temp)], &WatchConfig::default(), AcceptAllFilter)
            .await
            .unwrap();

        assert!(watcher.is_running());
        assert_eq!(watcher.watch_paths().len(), 1);
    }

    #[tokio::test]
    async fn test_watcher_no_paths() {
        let result = FileWatcher::new(&[], &WatchConfig::default(), AcceptAllFilter).await;
        assert!(matches!(result, Err(WatchError::NoPaths)));
    }

    #[tokio::test]
    async fn test_watcher_path_not_found() {
        let missing = Utf8PathBuf::from("/nonexistent/path/that/does/not/exist");
        let result = FileWatcher::new(&[missing], &WatchConfig::default(), AcceptAllFilter).await;
        assert!(matches!(result, Err(WatchError::PathNotFound(_))));
    }

    #[tokio::test]
    async fn test_watcher_dedups_paths() {
        let temp = TempDir::new().unwrap();
        let dir = utf8_dir(&temp);
        let watcher = FileWatcher::with_capacity(
            &[dir.clone(), dir.join(".")],
            &WatchConfig::default(),
            AcceptAllFilter,
            10,
        )
        .await
        .unwrap();

        assert_eq!(watcher.watch_paths().len(), 1);
        watcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_watcher_receives_events_from_each_root() {
        let en = TempDir::new().unwrap();
        let zh = TempDir::new().unwrap();
        let config = WatchConfig {
            enabled: true,
            debounce_ms: 50,
            recursive: true,
        };

        let mut watcher = FileWatcher::new(
            &[utf8_dir(&en), utf8_dir(&zh)],
            &config,
            LocaleFileFilter::new("json").unwrap(),
        )
        .await
        .unwrap();

        fs::write(zh.path().join("common.json"), "{}").unwrap();
        fs::write(zh.path().join("notes.txt"), "ignored").unwrap();

        let event = tokio::time::timeout(Duration::from_secs(2), watcher.recv()).await;
        watcher.shutdown().await.unwrap();

        // Timing-dependent on some CI filesystems.
        if let Ok(Some(event)) = event {
            assert_eq!(event.file_name(), Some("common.json"));
        }
    }
}
